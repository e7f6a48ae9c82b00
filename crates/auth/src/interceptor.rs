//! Retry interceptor: turns expired-credential failures into one refresh
//! plus replays.
//!
//! Every response flows through [`RetryInterceptor::execute`]. Failures are
//! classified ([`classify`]) and handled per category:
//!
//! - `SessionExpired`: join or start the single-flight refresh, then replay
//!   the original request exactly once.
//! - `RefreshRejected`: the refresh credential itself is dead; reject
//!   anything queued and send the user to login.
//! - `Forbidden`: redirect with a reason code, no refresh.
//! - `Misconfigured`: fatal, propagated without retry or redirect.
//! - `Other`: propagated unchanged.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::classify::{classify, ErrorCategory, RequestOrigin};
use crate::coordinator::{Flight, RefreshCoordinator, RefreshFuture};
use crate::error::{ClientError, RefreshError};
use crate::queue::FailedRequestQueue;
use crate::redirect::{AuthRedirect, RedirectReason};
use crate::request::{RequestDescriptor, Response};
use crate::traits::{CredentialRefresher, Dispatch, Navigator};

/// Routes the interceptor recognizes and redirects to.
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Path of the credential-refresh endpoint. A 401 from this path is
    /// unrecoverable.
    pub refresh_path: String,
    /// Destination for login redirects on unrecoverable failures.
    pub login_destination: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            refresh_path: "/auth/refresh".to_string(),
            login_destination: "/auth/login".to_string(),
        }
    }
}

/// Orchestrates dispatch, failure classification, single-flight refresh,
/// queueing, and replay for one client instance.
pub struct RetryInterceptor {
    transport: Arc<dyn Dispatch>,
    refresher: Arc<dyn CredentialRefresher>,
    navigator: Arc<dyn Navigator>,
    coordinator: Arc<RefreshCoordinator>,
    queue: Arc<FailedRequestQueue>,
    config: InterceptorConfig,
}

impl RetryInterceptor {
    /// Wire an interceptor around its collaborators with a fresh
    /// coordinator and queue.
    pub fn new(
        transport: Arc<dyn Dispatch>,
        refresher: Arc<dyn CredentialRefresher>,
        navigator: Arc<dyn Navigator>,
        config: InterceptorConfig,
    ) -> Self {
        Self {
            transport,
            refresher,
            navigator,
            coordinator: Arc::new(RefreshCoordinator::new()),
            queue: Arc::new(FailedRequestQueue::new()),
            config,
        }
    }

    /// Share an externally owned coordinator, e.g. when several clients or
    /// route guards must observe the same refresh slot.
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Handle to the coordinator, for code that awaits refresh quiescence.
    pub fn coordinator(&self) -> Arc<RefreshCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Number of requests currently parked on the in-flight refresh.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch a request, recovering from an expired session where
    /// possible.
    ///
    /// On success the buffered response is returned as-is. At most one
    /// replay happens per original request, after the (single, shared)
    /// refresh settles.
    #[instrument(
        skip(self, request),
        fields(request_id = %request.id(), method = %request.method(), url = %request.url())
    )]
    pub async fn execute(&self, mut request: RequestDescriptor) -> Result<Response, ClientError> {
        loop {
            let response = self.transport.dispatch(&request).await?;
            if response.status().is_success() {
                return Ok(response);
            }

            // Err propagates the failure; Ok means the refresh settled in
            // this request's favor and it gets its one replay.
            self.handle_failure(&request, response).await?;
            debug!(request_id = %request.id(), "session refreshed; replaying request");
            request = request.into_retried();
        }
    }

    async fn handle_failure(
        &self,
        request: &RequestDescriptor,
        response: Response,
    ) -> Result<(), ClientError> {
        let origin = self.origin_of(request);
        let category = classify(response.status(), response.body(), origin);
        debug!(
            request_id = %request.id(),
            status = %response.status(),
            category = category.as_str(),
            "classified failed response"
        );

        match category {
            ErrorCategory::Misconfigured => {
                error!(url = %request.url(), "server reports a configuration fault");
                Err(ClientError::Misconfigured(response.body().to_string()))
            }
            ErrorCategory::Forbidden => {
                redirect_to_login(
                    self.navigator.as_ref(),
                    &self.config.login_destination,
                    RedirectReason::Forbidden,
                )
                .await;
                Err(status_error(request, &response))
            }
            ErrorCategory::RefreshRejected => {
                // When a refresh cycle is active its failure path performs
                // these effects exactly once; only an out-of-cycle rejection
                // settles the queue and redirects here.
                let rejection = RefreshError::rejected(response.status(), response.body());
                let settled_here =
                    self.coordinator.run_if_idle(|| self.queue.drain_failure(&rejection));
                if settled_here.is_some() {
                    warn!("refresh endpoint rejected the session");
                    redirect_to_login(
                        self.navigator.as_ref(),
                        &self.config.login_destination,
                        RedirectReason::SessionExpired,
                    )
                    .await;
                }
                Err(status_error(request, &response))
            }
            ErrorCategory::SessionExpired if request.retried() => {
                warn!(
                    request_id = %request.id(),
                    "replayed request failed authentication again"
                );
                Err(status_error(request, &response))
            }
            ErrorCategory::SessionExpired => self.refresh_and_release(request).await,
            ErrorCategory::Other => Err(status_error(request, &response)),
        }
    }

    /// Join the in-flight refresh or start a new one, and park until it
    /// settles. `Ok(())` means the caller should replay its request.
    async fn refresh_and_release(&self, request: &RequestDescriptor) -> Result<(), ClientError> {
        let flight = self
            .coordinator
            .join_or_start(|_| self.queue.enqueue(), || self.start_refresh_cycle());

        match flight {
            Flight::Joined(receiver) => {
                debug!(request_id = %request.id(), "refresh in flight; queueing request");
                match receiver.await {
                    Ok(Ok(token)) => {
                        debug!(
                            request_id = %request.id(),
                            explicit_token = token.is_some(),
                            "queued request released"
                        );
                        Ok(())
                    }
                    Ok(Err(refresh_err)) => Err(ClientError::Refresh(refresh_err)),
                    Err(_closed) => Err(ClientError::Refresh(RefreshError::Aborted(
                        "refresh settled without signalling queued requests".to_string(),
                    ))),
                }
            }
            Flight::Started(refresh) => {
                info!(request_id = %request.id(), "access credential expired; starting refresh");
                refresh.await.map_err(ClientError::Refresh)
            }
        }
    }

    /// Build and publish one refresh cycle.
    ///
    /// The cycle is spawned so it runs to completion even if every awaiter
    /// is dropped; the returned handle is the shared view of its outcome.
    /// Settlement clears the coordinator slot and drains the queue in one
    /// span, then performs the login redirect on failure.
    fn start_refresh_cycle(&self) -> RefreshFuture {
        let refresher = Arc::clone(&self.refresher);
        let coordinator = Arc::clone(&self.coordinator);
        let queue = Arc::clone(&self.queue);
        let navigator = Arc::clone(&self.navigator);
        let login_destination = self.config.login_destination.clone();

        let cycle = tokio::spawn(async move {
            match refresher.refresh().await {
                Ok(()) => {
                    info!("credential refresh succeeded; releasing queued requests");
                    coordinator.settle(|| queue.drain_success(None));
                    Ok(())
                }
                Err(err) => {
                    error!(error = %err, "credential refresh failed; rejecting queued requests");
                    coordinator.settle(|| queue.drain_failure(&err));
                    redirect_to_login(
                        navigator.as_ref(),
                        &login_destination,
                        RedirectReason::SessionExpired,
                    )
                    .await;
                    Err(err)
                }
            }
        });

        cycle
            .map(|joined| match joined {
                Ok(outcome) => outcome,
                Err(join_err) => Err(RefreshError::Aborted(join_err.to_string())),
            })
            .boxed()
            .shared()
    }

    fn origin_of(&self, request: &RequestDescriptor) -> RequestOrigin {
        let is_refresh_call = url::Url::parse(request.url())
            .map(|parsed| parsed.path() == self.config.refresh_path)
            .unwrap_or_else(|_| request.url().ends_with(&self.config.refresh_path));

        if is_refresh_call {
            RequestOrigin::RefreshEndpoint
        } else {
            RequestOrigin::Api
        }
    }
}

fn status_error(request: &RequestDescriptor, response: &Response) -> ClientError {
    ClientError::Status {
        method: request.method().clone(),
        url: request.url().to_string(),
        status: response.status(),
        body: response.body().to_string(),
    }
}

async fn redirect_to_login(navigator: &dyn Navigator, destination: &str, reason: RedirectReason) {
    let mut redirect = AuthRedirect::new(destination).with_reason(reason);
    if let Some(path) = navigator.current_path() {
        redirect = redirect.with_return_to(path);
    }
    warn!(redirect = %redirect, "redirecting to authentication entry point");
    navigator.navigate(redirect).await;
}
