//! Read-only client for the portfolio-data service.
//!
//! The session core only consumes the section enumeration from this
//! boundary; the portfolio payload itself is rendered elsewhere.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use folio_core::PortfolioSection;

use crate::http_provider::map_http_error;
use crate::{ClientConfig, ProviderError};

/// Backend health report from `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub provider: String,
    #[serde(default)]
    pub portfolio_sections: Vec<String>,
}

/// Client for the portfolio-data service.
#[derive(Debug, Clone)]
pub struct PortfolioDataClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PortfolioDataClient {
    /// Creates a client from configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        }
    }

    /// Fetches the portfolio object and returns the section names it
    /// carries.
    pub async fn sections(&self) -> Result<Vec<String>, ProviderError> {
        let payload: Value = self.get_json("/api/sections").await?;
        match payload {
            Value::Object(map) => Ok(map.keys().cloned().collect()),
            _ => Err(ProviderError::malformed(
                "portfolio payload is not an object",
            )),
        }
    }

    /// Fetches the section names and keeps the ones that map onto the known
    /// enumeration, dropping anything this client does not understand.
    pub async fn known_sections(&self) -> Result<Vec<PortfolioSection>, ProviderError> {
        let sections = self.sections().await?;
        Ok(sections
            .iter()
            .filter_map(|name| PortfolioSection::from_str(name).ok())
            .collect())
    }

    /// Fetches the backend health report.
    pub async fn health(&self) -> Result<HealthStatus, ProviderError> {
        self.get_json("/api/health").await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                ProviderError::request(
                    format!("portfolio service unreachable: {err}"),
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ProviderError::malformed(format!("failed to decode payload: {err}")))
    }
}
