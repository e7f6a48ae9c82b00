//! Error types for request dispatch and credential refresh.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Longest body excerpt carried inside a refresh rejection message.
const EXCERPT_LEN: usize = 200;

/// Errors produced by the credential-refresh call.
///
/// Cloneable because a single refresh outcome fans out to every request
/// queued behind it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The refresh endpoint answered with a non-success status.
    #[error("refresh endpoint rejected the session ({status}): {message}")]
    Rejected {
        /// Status returned by the refresh endpoint.
        status: StatusCode,
        /// Short excerpt of the response body.
        message: String,
    },

    /// The refresh request never produced an HTTP response.
    #[error("refresh transport failure: {0}")]
    Transport(String),

    /// The refresh task stopped without settling (panic or shutdown).
    #[error("refresh aborted: {0}")]
    Aborted(String),
}

impl RefreshError {
    /// Build a rejection from a response, keeping a short body excerpt.
    pub fn rejected(status: StatusCode, body: &str) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.len() > EXCERPT_LEN {
            let mut end = EXCERPT_LEN;
            while !trimmed.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &trimmed[..end])
        } else {
            trimmed.to_string()
        };
        Self::Rejected { status, message }
    }

    /// True when the refresh endpoint itself refused the credential (401).
    /// No further refresh can succeed until the user logs in again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

/// Errors surfaced to callers of the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        /// HTTP method of the failing request.
        method: Method,
        /// Full request URL.
        url: String,
        /// Response status.
        status: StatusCode,
        /// Buffered response body.
        body: String,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Local or server-reported configuration fault.
    #[error("configuration error: {0}")]
    Misconfigured(String),

    /// The credential refresh this request was waiting on failed.
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// The response body could not be deserialized.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Status code of the failing response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Refresh(RefreshError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
