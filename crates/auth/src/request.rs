//! Request descriptors and buffered responses.
//!
//! A [`RequestDescriptor`] captures everything needed to send a request a
//! second time: method, URL, headers, body, and whether a replay already
//! happened. Descriptors are immutable values; the `retried` marker only
//! moves one way, through [`RequestDescriptor::into_retried`], so replay
//! logic can never retry a copy that lost the marker.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ClientError;

/// An HTTP request captured for dispatch and possible replay.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    id: Uuid,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl RequestDescriptor {
    /// Capture a new request. The id correlates dispatch, queueing, and
    /// replay log lines.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    /// Replace the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Insert a single header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body, kept owned so the request can be replayed.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Consume the descriptor into its replayed form.
    #[must_use]
    pub fn into_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    /// Correlation id for this logical request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers attached to the request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// JSON body, if any.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether this request already went through a refresh-and-replay pass.
    pub fn retried(&self) -> bool {
        self.retried
    }
}

/// A fully buffered response.
///
/// The body is read eagerly so it can be inspected for classification and
/// still handed to the caller afterwards.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// Build a response from buffered parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserialize the body as JSON.
    ///
    /// 204 and 205 never carry a body, so they deserialize from `null`;
    /// request `()` or an `Option` for those endpoints.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        if self.status == StatusCode::NO_CONTENT || self.status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                ClientError::Decode(format!(
                    "no-content response ({}) cannot populate the requested type",
                    self.status.as_u16()
                ))
            });
        }

        serde_json::from_str(&self.body)
            .map_err(|err| ClientError::Decode(format!("failed to parse response body: {err}")))
    }
}
