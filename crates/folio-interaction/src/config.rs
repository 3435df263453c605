//! Client configuration for the portfolio backend.

use std::env;
use std::time::Duration;

/// Default backend endpoint for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout; matches the backend's own answer timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const BASE_URL_ENV: &str = "FOLIO_BACKEND_URL";
const TIMEOUT_ENV: &str = "FOLIO_BACKEND_TIMEOUT_SECS";

/// Connection settings shared by the answering and portfolio-data clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `FOLIO_BACKEND_URL` and
    /// `FOLIO_BACKEND_TIMEOUT_SECS`.
    ///
    /// Missing variables fall back to the defaults; a malformed timeout is
    /// ignored with a warning rather than failing startup.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = match env::var(TIMEOUT_ENV) {
            Ok(raw) => parse_timeout_secs(&raw),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Self { base_url, timeout }
    }

    /// Overrides the backend endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_timeout_secs(raw: &str) -> Duration {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                "[ClientConfig] Ignoring invalid {}={:?}, using default",
                TIMEOUT_ENV,
                raw
            );
            DEFAULT_TIMEOUT
        }
    }
}
