//! Pure failure classification.
//!
//! Maps a failed response onto the small set of categories the retry
//! interceptor acts on. Classification looks only at the status code, the
//! buffered body, and where the request was headed; it never touches shared
//! state, so identical inputs always produce the same category.

use reqwest::StatusCode;

/// Sentinel `message` value that marks a 500 as a deployment fault rather
/// than an ordinary server error.
pub const CONFIG_FAULT_MESSAGE: &str = "Service configuration error";

/// Where a failing request was headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// An ordinary API call.
    Api,
    /// The credential-refresh call itself.
    RefreshEndpoint,
}

/// Categories of failed responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 401 on an API call: the access credential expired and a refresh may
    /// recover the session.
    SessionExpired,
    /// 401 from the refresh endpoint itself: the refresh credential is no
    /// longer accepted. Unrecoverable without a new login.
    RefreshRejected,
    /// 403: authorization denied. Refreshing cannot help.
    Forbidden,
    /// 500 carrying the configuration-fault sentinel. Fatal, never retried.
    Misconfigured,
    /// Everything else; propagated to the caller unchanged.
    Other,
}

impl ErrorCategory {
    /// Stable machine-readable name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionExpired => "session_expired",
            Self::RefreshRejected => "refresh_rejected",
            Self::Forbidden => "forbidden",
            Self::Misconfigured => "misconfigured",
            Self::Other => "other",
        }
    }
}

/// Classify a failed response.
pub fn classify(status: StatusCode, body: &str, origin: RequestOrigin) -> ErrorCategory {
    match status {
        StatusCode::UNAUTHORIZED => match origin {
            RequestOrigin::RefreshEndpoint => ErrorCategory::RefreshRejected,
            RequestOrigin::Api => ErrorCategory::SessionExpired,
        },
        StatusCode::FORBIDDEN => ErrorCategory::Forbidden,
        StatusCode::INTERNAL_SERVER_ERROR if is_config_fault(body) => ErrorCategory::Misconfigured,
        _ => ErrorCategory::Other,
    }
}

/// The sentinel may arrive as a bare string or inside a JSON error envelope.
fn is_config_fault(body: &str) -> bool {
    if body.trim() == CONFIG_FAULT_MESSAGE {
        return true;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };
    value.get("message").and_then(serde_json::Value::as_str) == Some(CONFIG_FAULT_MESSAGE)
}
