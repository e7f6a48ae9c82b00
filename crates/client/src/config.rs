//! Client configuration loader
//!
//! Loads client settings from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `COLLOQUY_BASE_URL`: Base URL of the chat API (required)
//! - `COLLOQUY_API_KEY`: API key sent with every request (optional)
//! - `COLLOQUY_REFRESH_PATH`: Path of the session-refresh endpoint
//! - `COLLOQUY_LOGIN_DESTINATION`: Path users are redirected to on
//!   unrecoverable auth failures
//! - `COLLOQUY_TIMEOUT_SECONDS`: Per-request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./colloquy.json` or `./colloquy.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use colloquy_auth::ClientError;
use serde::{Deserialize, Serialize};

/// Settings for one [`ColloquyClient`](crate::ColloquyClient) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the chat API (e.g. "https://chat.example.com/api").
    pub base_url: String,
    /// API key sent as `x-api-key` with every request.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Path of the session-refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Path users are sent to when the session cannot be recovered.
    #[serde(default = "default_login_destination")]
    pub login_destination: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_login_destination() -> String {
    "/auth/login".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl ClientConfig {
    /// Minimal configuration pointing at `base_url`, everything else
    /// defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            refresh_path: default_refresh_path(),
            login_destination: default_login_destination(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Load configuration with automatic fallback strategy.
    ///
    /// First attempts to load from environment variables. If the required
    /// variables are missing, falls back to loading from a config file.
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if configuration cannot be
    /// loaded from either source.
    pub fn load() -> Result<Self, ClientError> {
        match Self::load_from_env() {
            Ok(config) => {
                tracing::info!("configuration loaded from environment variables");
                Ok(config)
            }
            Err(e) => {
                tracing::debug!(error = %e, "environment incomplete, trying config file");
                Self::load_from_file(None)
            }
        }
    }

    /// Load configuration from `COLLOQUY_*` environment variables.
    ///
    /// `COLLOQUY_BASE_URL` must be present; all other settings fall back
    /// to their defaults.
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if the base URL is missing
    /// or a numeric variable does not parse.
    pub fn load_from_env() -> Result<Self, ClientError> {
        let base_url = env_var("COLLOQUY_BASE_URL")?;
        let api_key = std::env::var("COLLOQUY_API_KEY").ok();
        let refresh_path =
            std::env::var("COLLOQUY_REFRESH_PATH").unwrap_or_else(|_| default_refresh_path());
        let login_destination = std::env::var("COLLOQUY_LOGIN_DESTINATION")
            .unwrap_or_else(|_| default_login_destination());
        let timeout_seconds = match std::env::var("COLLOQUY_TIMEOUT_SECONDS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ClientError::Misconfigured(format!("invalid COLLOQUY_TIMEOUT_SECONDS: {}", e))
            })?,
            Err(_) => default_timeout_seconds(),
        };

        Ok(Self { base_url, api_key, refresh_path, login_destination, timeout_seconds })
    }

    /// Load configuration from a file.
    ///
    /// If `path` is `None`, probes multiple locations for config files.
    /// Supports both JSON and TOML formats (detected by file extension).
    ///
    /// # Errors
    /// Returns [`ClientError::Misconfigured`] if no file is found or the
    /// contents do not parse.
    pub fn load_from_file(path: Option<PathBuf>) -> Result<Self, ClientError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ClientError::Misconfigured(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p
            }
            None => probe_config_paths().ok_or_else(|| {
                ClientError::Misconfigured(
                    "no config file found in any of the standard locations".to_string(),
                )
            })?,
        };

        tracing::info!(path = %config_path.display(), "loading configuration from file");

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            ClientError::Misconfigured(format!("failed to read config file: {}", e))
        })?;

        parse_config(&contents, &config_path)
    }
}

/// Parse configuration from string content.
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig, ClientError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClientError::Misconfigured(format!("invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClientError::Misconfigured(format!("invalid JSON format: {}", e))),
        _ => Err(ClientError::Misconfigured(format!("unsupported config format: {}", extension))),
    }
}

/// Probe standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("colloquy.json"),
            cwd.join("colloquy.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("colloquy.json"),
                exe_dir.join("colloquy.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable.
fn env_var(key: &str) -> Result<String, ClientError> {
    std::env::var(key).map_err(|_| {
        ClientError::Misconfigured(format!("missing required environment variable: {}", key))
    })
}
