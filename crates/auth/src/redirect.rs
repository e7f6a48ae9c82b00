//! Redirect orders handed to the application router.

use std::fmt;

/// Why the user is being sent to an authentication entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Authorization denied (403); refreshing cannot help.
    Forbidden,
    /// The session could not be refreshed; a new login is required.
    SessionExpired,
}

impl RedirectReason {
    /// Machine-readable reason code carried on the redirect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "403",
            Self::SessionExpired => "session_expired",
        }
    }
}

/// A redirect order: destination plus enough context for the login screen
/// to explain itself and to send the user back afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    destination: String,
    return_to: Option<String>,
    reason: Option<RedirectReason>,
}

impl AuthRedirect {
    /// Redirect to `destination` with no extra context.
    pub fn new(destination: impl Into<String>) -> Self {
        Self { destination: destination.into(), return_to: None, reason: None }
    }

    /// Record the path the user should land on after logging back in.
    #[must_use]
    pub fn with_return_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = Some(path.into());
        self
    }

    /// Attach a machine-readable reason code.
    #[must_use]
    pub fn with_reason(mut self, reason: RedirectReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Route destination, e.g. `/auth/login`.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Post-login return target, if one was recorded.
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Reason code, if one was attached.
    pub fn reason(&self) -> Option<RedirectReason> {
        self.reason
    }

    /// Query pairs for routers that take search params: `redirect` for the
    /// return target and `reason` for the reason code.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(path) = &self.return_to {
            params.push(("redirect", path.clone()));
        }
        if let Some(reason) = self.reason {
            params.push(("reason", reason.as_str().to_string()));
        }
        params
    }
}

impl fmt::Display for AuthRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination)?;
        for (i, (key, value)) in self.query_params().iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_redirect_has_no_params() {
        let redirect = AuthRedirect::new("/auth/login");
        assert_eq!(redirect.destination(), "/auth/login");
        assert!(redirect.query_params().is_empty());
        assert_eq!(redirect.to_string(), "/auth/login");
    }

    #[test]
    fn params_carry_return_target_and_reason() {
        let redirect = AuthRedirect::new("/auth/login")
            .with_return_to("/chat/42")
            .with_reason(RedirectReason::SessionExpired);

        assert_eq!(
            redirect.query_params(),
            vec![
                ("redirect", "/chat/42".to_string()),
                ("reason", "session_expired".to_string())
            ]
        );
        assert_eq!(redirect.to_string(), "/auth/login?redirect=/chat/42&reason=session_expired");
    }

    #[test]
    fn forbidden_reason_renders_as_status_code() {
        let redirect = AuthRedirect::new("/auth/login").with_reason(RedirectReason::Forbidden);
        assert_eq!(redirect.to_string(), "/auth/login?reason=403");
        assert_eq!(redirect.reason(), Some(RedirectReason::Forbidden));
    }
}
