//! Boundary to the remote answering service and portfolio data.
//!
//! This crate defines the request/response contract of the answering
//! service, the [`AnswerProvider`] seam the use-case layer depends on, and
//! the HTTP implementations talking to the portfolio backend. The exchange
//! protocol itself lives in `folio-application`.

mod config;
mod http_provider;
mod portfolio;

pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use http_provider::HttpAnswerProvider;
pub use portfolio::{HealthStatus, PortfolioDataClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::section::PortfolioSection;
use folio_core::session::Link;

/// A question routed to the answering service.
///
/// Serialized with the backend's wire names (`conversationId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    /// Free-text question; non-empty, pre-trimmed by the coordinator.
    pub question: String,
    /// Section the answer should be scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<PortfolioSection>,
    /// Conversation the question originated from.
    pub conversation_id: String,
}

/// A successful answer from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default)]
    pub chips: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Failures crossing the answering-service boundary.
///
/// The exchange coordinator treats every variant uniformly; the split exists
/// so logs and callers can tell transport trouble from service rejections.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("request failed: {message}")]
    Request { message: String, is_retryable: bool },

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Creates a Request error.
    pub fn request(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Request {
            message: message.into(),
            is_retryable,
        }
    }

    /// Creates a Status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a Malformed error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// True when resending the same request might succeed. The coordinator
    /// never retries; this is advisory for callers that resend manually.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { is_retryable, .. } => *is_retryable,
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Malformed(_) => false,
        }
    }
}

/// Boundary to the remote answering service.
///
/// One call per submission: implementations perform exactly one attempt and
/// no retries, leaving failure handling to the caller.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, request: AnswerRequest) -> Result<AnswerResponse, ProviderError>;
}
