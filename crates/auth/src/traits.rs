//! Collaborator seams consumed by the retry interceptor.
//!
//! The interceptor itself never talks to the network or the router; it
//! drives these three traits. Production implementations live in the
//! `colloquy-client` crate, tests supply their own.

use async_trait::async_trait;

use crate::error::{ClientError, RefreshError};
use crate::redirect::AuthRedirect;
use crate::request::{RequestDescriptor, Response};

/// Underlying HTTP transport.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Send the described request and buffer whatever comes back.
    ///
    /// Implementations return `Ok` for any HTTP response, error status or
    /// not; `Err` is reserved for failures without a response.
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<Response, ClientError>;
}

/// Exchanges the long-lived refresh credential for a new access credential.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// Perform one refresh attempt.
    async fn refresh(&self) -> Result<(), RefreshError>;
}

/// Application-side routing collaborator.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Path the user is currently on; becomes the post-login return target.
    fn current_path(&self) -> Option<String>;

    /// Carry out a redirect.
    async fn navigate(&self, redirect: AuthRedirect);
}
