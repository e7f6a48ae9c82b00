//! # Colloquy Client
//!
//! HTTP client for the Colloquy chat API with transparent session
//! recovery.
//!
//! This crate contains:
//! - The [`ColloquyClient`] facade with typed request helpers
//! - A [`reqwest`]-backed transport and session refresher sharing one
//!   cookie store
//! - Configuration loading from `COLLOQUY_*` environment variables or
//!   JSON/TOML files
//! - A default navigator that logs login redirects for headless hosts
//!
//! ## Architecture
//! - Implements the traits defined in `colloquy-auth`
//! - Contains all I/O; the coordination logic stays in `colloquy-auth`
//!
//! # Usage Example
//!
//! ```no_run
//! use colloquy_client::{ClientConfig, ColloquyClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load()?;
//!     let client = ColloquyClient::new(config)?;
//!
//!     // An expired session is refreshed and the request replayed
//!     // before this returns.
//!     let rooms: serde_json::Value = client.get("/rooms").await?;
//!     println!("joined rooms: {}", rooms);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod client;
pub mod config;
pub mod navigate;
pub mod refresh;
pub mod transport;

// Re-export commonly used items
pub use client::{ColloquyClient, ColloquyClientBuilder, API_KEY_HEADER};
pub use colloquy_auth::{
    AuthRedirect, ClientError, CredentialRefresher, Dispatch, ErrorCategory, Navigator,
    RedirectReason, RefreshError, RequestDescriptor, Response,
};
pub use config::{probe_config_paths, ClientConfig};
pub use navigate::TracingNavigator;
pub use refresh::HttpRefresher;
pub use transport::ReqwestDispatcher;
