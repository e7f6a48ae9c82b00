//! HTTP transport
//!
//! Bridges [`RequestDescriptor`]s onto a shared [`reqwest::Client`] and
//! buffers responses so the interceptor can classify and replay them.

use async_trait::async_trait;
use colloquy_auth::{ClientError, Dispatch, RequestDescriptor, Response};
use tracing::debug;

/// [`Dispatch`] implementation backed by [`reqwest`].
///
/// The same `reqwest::Client` (and with it, the cookie store) is shared
/// with the session refresher, so cookies set by a refresh are attached
/// to replayed requests.
#[derive(Debug, Clone)]
pub struct ReqwestDispatcher {
    http: reqwest::Client,
}

impl ReqwestDispatcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Dispatch for ReqwestDispatcher {
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<Response, ClientError> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url())
            .headers(request.headers().clone());

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        // Buffer the body eagerly: classification reads it and a replayed
        // request rebuilds from the descriptor, not from this response.
        let body = response.text().await.unwrap_or_default();

        debug!(
            request_id = %request.id(),
            status = %status,
            bytes = body.len(),
            "response received"
        );

        Ok(Response::new(status, headers, body))
    }
}
