//! Direct REST client for the answering service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{AnswerProvider, AnswerRequest, AnswerResponse, ClientConfig, ProviderError};

/// HTTP implementation of [`AnswerProvider`] against the portfolio backend.
///
/// Posts to `{base_url}/api/chat` and maps transport failures, non-success
/// statuses, and undecodable bodies onto [`ProviderError`]. Performs exactly
/// one attempt per call.
#[derive(Debug, Clone)]
pub struct HttpAnswerProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAnswerProvider {
    /// Creates a provider from client configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        }
    }

    /// Creates a provider from environment configuration.
    pub fn from_env() -> Self {
        Self::new(&ClientConfig::from_env())
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    async fn send_request(&self, request: &AnswerRequest) -> Result<AnswerResponse, ProviderError> {
        let response = self
            .client
            .post(self.chat_url())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                ProviderError::request(
                    format!("answering service unreachable: {err}"),
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

        response.json::<AnswerResponse>().await.map_err(|err| {
            ProviderError::malformed(format!("failed to decode answer payload: {err}"))
        })
    }
}

#[async_trait]
impl AnswerProvider for HttpAnswerProvider {
    async fn answer(&self, request: AnswerRequest) -> Result<AnswerResponse, ProviderError> {
        tracing::debug!(
            "[HttpAnswerProvider] Sending question for conversation {}",
            request.conversation_id
        );
        self.send_request(&request).await
    }
}

/// FastAPI error payload: `{"detail": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Maps a non-success status onto [`ProviderError`], preferring the
/// backend's `detail` message when the body carries one.
pub(crate) fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);
    ProviderError::status(status.as_u16(), message)
}
