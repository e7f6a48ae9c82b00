//! Session-refresh coordination for the Colloquy chat API.
//!
//! Colloquy authenticates with short-lived session cookies. When one
//! expires mid-flight, every in-flight request fails with 401 at once.
//! This crate recovers from that without hammering the refresh endpoint:
//! concurrent failures share a single refresh cycle, park on its outcome,
//! and replay exactly once after it settles.
//!
//! # Features
//!
//! - **Single-flight refresh**: concurrent 401s trigger one refresh call,
//!   never one per request
//! - **Queue and replay**: requests that hit an expired session wait for
//!   the shared refresh and are replayed exactly once
//! - **Failure classification**: 401/403/500 responses are routed to
//!   recovery, redirect, or fatal paths by status, body, and origin
//! - **Terminal handling**: a rejected refresh credential rejects all
//!   queued requests and redirects to login exactly once
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ RetryInterceptor │  Orchestrates dispatch, classification, replay
//! └────────┬─────────┘
//!          │
//!          ├──► Dispatch            (HTTP transport boundary)
//!          ├──► RefreshCoordinator  (single-flight refresh slot)
//!          │         │
//!          │         └──► CredentialRefresher  (refresh-endpoint call)
//!          ├──► FailedRequestQueue  (parked requests awaiting refresh)
//!          └──► Navigator           (login redirects)
//! ```
//!
//! # Example
//!
//! Classification is pure and usable on its own:
//!
//! ```
//! use colloquy_auth::{classify, ErrorCategory, RequestOrigin};
//! use reqwest::StatusCode;
//!
//! let category = classify(StatusCode::UNAUTHORIZED, "", RequestOrigin::Api);
//! assert_eq!(category, ErrorCategory::SessionExpired);
//!
//! // The refresh endpoint rejecting its own call is unrecoverable.
//! let category = classify(StatusCode::UNAUTHORIZED, "", RequestOrigin::RefreshEndpoint);
//! assert_eq!(category, ErrorCategory::RefreshRejected);
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod classify;
pub mod coordinator;
pub mod error;
pub mod interceptor;
pub mod queue;
pub mod redirect;
pub mod request;
pub mod traits;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use classify::{classify, ErrorCategory, RequestOrigin, CONFIG_FAULT_MESSAGE};
pub use coordinator::{Flight, RefreshCoordinator, RefreshFuture};
pub use error::{ClientError, RefreshError};
pub use interceptor::{InterceptorConfig, RetryInterceptor};
pub use queue::{FailedRequestQueue, RefreshSignal};
pub use redirect::{AuthRedirect, RedirectReason};
pub use request::{RequestDescriptor, Response};
pub use traits::{CredentialRefresher, Dispatch, Navigator};
