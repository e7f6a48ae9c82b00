//! Navigation sink
//!
//! Headless hosts have no router to push redirects into, so the default
//! navigator records the destination and emits a structured log line.
//! Embedders with a UI implement [`Navigator`] themselves and hand it to
//! the client builder.

use async_trait::async_trait;
use colloquy_auth::{AuthRedirect, Navigator};
use parking_lot::Mutex;
use tracing::warn;

/// Default [`Navigator`] that tracks the current path in memory and logs
/// redirects instead of performing them.
#[derive(Debug, Default)]
pub struct TracingNavigator {
    current: Mutex<Option<String>>,
}

impl TracingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the path the host application is currently showing, so
    /// redirects can carry a return target.
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current.lock() = Some(path.into());
    }
}

#[async_trait]
impl Navigator for TracingNavigator {
    fn current_path(&self) -> Option<String> {
        self.current.lock().clone()
    }

    async fn navigate(&self, redirect: AuthRedirect) {
        warn!(target = %redirect, "session requires interactive login");
        *self.current.lock() = Some(redirect.destination().to_string());
    }
}
