//! Colloquy API client
//!
//! High-level facade wiring the HTTP transport, session refresher, and
//! retry interceptor together behind typed request helpers.

use std::sync::Arc;
use std::time::Duration;

use colloquy_auth::{
    ClientError, InterceptorConfig, Navigator, RefreshCoordinator, RequestDescriptor, Response,
    RetryInterceptor,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::navigate::TracingNavigator;
use crate::refresh::HttpRefresher;
use crate::transport::ReqwestDispatcher;

/// Header carrying the application API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the Colloquy chat API.
///
/// Every request goes through the retry interceptor: expired sessions are
/// refreshed once (shared across concurrent requests) and replayed, and
/// unrecoverable auth failures redirect through the configured
/// [`Navigator`].
pub struct ColloquyClient {
    interceptor: RetryInterceptor,
    config: ClientConfig,
}

impl ColloquyClient {
    /// Build a client with the default in-memory navigator.
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if the base URL is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_navigator(config, Arc::new(TracingNavigator::new()))
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ColloquyClientBuilder {
        ColloquyClientBuilder::default()
    }

    /// Build a client with a host-provided navigator.
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if the base URL is invalid
    /// or the HTTP client cannot be constructed.
    pub fn with_navigator(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|e| {
            ClientError::Misconfigured(format!("invalid base URL {}: {}", config.base_url, e))
        })?;

        let mut default_headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key)
                .map_err(|e| ClientError::Misconfigured(format!("invalid API key: {}", e)))?;
            value.set_sensitive(true);
            default_headers.insert(API_KEY_HEADER, value);
        }

        // One client, one cookie store: the session cookie minted by the
        // refresh endpoint must be visible to replayed requests.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("colloquy-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                ClientError::Misconfigured(format!("failed to build HTTP client: {}", e))
            })?;

        let refresh_url = join_endpoint(&config.base_url, &config.refresh_path);
        let refresh_route = Url::parse(&refresh_url)
            .map_err(|e| {
                ClientError::Misconfigured(format!("invalid refresh URL {}: {}", refresh_url, e))
            })?
            .path()
            .to_string();

        let transport = Arc::new(ReqwestDispatcher::new(http.clone()));
        let refresher = Arc::new(HttpRefresher::new(http, refresh_url));
        let interceptor_config = InterceptorConfig {
            refresh_path: refresh_route,
            login_destination: config.login_destination.clone(),
        };
        let interceptor =
            RetryInterceptor::new(transport, refresher, navigator, interceptor_config);

        Ok(Self { interceptor, config })
    }

    /// Execute a GET request and deserialize the response.
    ///
    /// # Errors
    /// Returns an error if the request ultimately fails or the response
    /// cannot be deserialized.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let request = RequestDescriptor::new(Method::GET, self.endpoint(path));
        let response = self.interceptor.execute(request).await?;
        response.json()
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns an error if the body cannot be serialized, the request
    /// ultimately fails, or the response cannot be deserialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| {
            ClientError::InvalidRequest(format!("failed to serialize body: {}", e))
        })?;
        let request = RequestDescriptor::new(Method::POST, self.endpoint(path)).with_body(body);
        let response = self.interceptor.execute(request).await?;
        response.json()
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    /// Returns an error if the body cannot be serialized, the request
    /// ultimately fails, or the response cannot be deserialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| {
            ClientError::InvalidRequest(format!("failed to serialize body: {}", e))
        })?;
        let request = RequestDescriptor::new(Method::PUT, self.endpoint(path)).with_body(body);
        let response = self.interceptor.execute(request).await?;
        response.json()
    }

    /// Execute a DELETE request.
    ///
    /// # Errors
    /// Returns an error if the request ultimately fails or the response
    /// cannot be deserialized.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let request = RequestDescriptor::new(Method::DELETE, self.endpoint(path));
        let response = self.interceptor.execute(request).await?;
        response.json()
    }

    /// Execute a hand-built descriptor, returning the buffered response.
    ///
    /// # Errors
    /// Returns an error if the request ultimately fails.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Response, ClientError> {
        self.interceptor.execute(request).await
    }

    /// Whether a session refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.interceptor.coordinator().is_refreshing()
    }

    /// Park until the in-flight refresh (if any) settles. Never fails;
    /// route guards re-check session state afterwards.
    pub async fn wait_for_refresh(&self) {
        self.interceptor.coordinator().wait_for_completion().await;
    }

    /// Handle to the refresh coordinator, for guards that outlive a
    /// borrow of the client.
    pub fn coordinator(&self) -> Arc<RefreshCoordinator> {
        self.interceptor.coordinator()
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.config.base_url, path)
    }
}

/// Join a base URL and an absolute path without doubling the slash.
fn join_endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Builder for [`ColloquyClient`].
#[derive(Default)]
pub struct ColloquyClientBuilder {
    config: Option<ClientConfig>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ColloquyClientBuilder {
    /// Set the full configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set (or override) just the base URL, defaulting everything else.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        match self.config.as_mut() {
            Some(config) => config.base_url = base,
            None => self.config = Some(ClientConfig::new(base)),
        }
        self
    }

    /// Set the navigator redirects are routed through.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if no configuration was
    /// provided or client construction fails.
    pub fn build(self) -> Result<ColloquyClient, ClientError> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Misconfigured("base URL not configured".to_string()))?;

        match self.navigator {
            Some(navigator) => ColloquyClient::with_navigator(config, navigator),
            None => ColloquyClient::new(config),
        }
    }
}
