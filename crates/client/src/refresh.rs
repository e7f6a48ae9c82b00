//! Session refresh over HTTP
//!
//! Calls the refresh endpoint to mint a new session cookie. The endpoint
//! reads the current session from the cookie store and answers with a
//! `Set-Cookie` on success, so there is no token to hand back to callers.

use async_trait::async_trait;
use colloquy_auth::{CredentialRefresher, RefreshError};
use tracing::{debug, instrument};

/// [`CredentialRefresher`] implementation that POSTs to the refresh
/// endpoint.
///
/// Shares the dispatcher's `reqwest::Client`: the cookie issued by the
/// refresh response lands in the same cookie store the replayed requests
/// read from.
#[derive(Debug, Clone)]
pub struct HttpRefresher {
    http: reqwest::Client,
    refresh_url: String,
}

impl HttpRefresher {
    pub fn new(http: reqwest::Client, refresh_url: impl Into<String>) -> Self {
        Self { http, refresh_url: refresh_url.into() }
    }
}

#[async_trait]
impl CredentialRefresher for HttpRefresher {
    #[instrument(skip(self), fields(url = %self.refresh_url))]
    async fn refresh(&self) -> Result<(), RefreshError> {
        let response = self
            .http
            .post(&self.refresh_url)
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "refresh endpoint accepted the session");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RefreshError::rejected(status, &body))
    }
}
