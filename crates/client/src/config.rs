//! # Client Configuration
//!
//! Connection settings for the external booking service, read from the
//! environment:
//!
//! - `PADELUP_API_URL`: Base URL of the booking service (default: "http://localhost:5176")
//! - `PADELUP_API_TIMEOUT_SECONDS`: Per-request timeout (default: 10)
//! - `PADELUP_SESSION_FILE`: Where to keep the logged-in session between runs (optional)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr};

pub const DEFAULT_API_URL: &str = "http://localhost:5176";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// File backing the session store; the session lives in memory when unset
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Loads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PADELUP_API_TIMEOUT_SECONDS` is not a whole number
    /// of seconds.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("PADELUP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_seconds = match env::var("PADELUP_API_TIMEOUT_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .wrap_err("Invalid PADELUP_API_TIMEOUT_SECONDS value")?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        let session_file = env::var("PADELUP_SESSION_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            timeout_seconds,
            session_file,
            ..Self::new(api_url)
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Joins a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
