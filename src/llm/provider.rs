use async_trait::async_trait;
use thiserror::Error;

use super::types::ChatRequest;

/// Failure talking to an external model service. Callers classify these
/// as embedding-side or generation-side; a provider error is never folded
/// into a "no answer" result.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("malformed response from {0}")]
    MalformedResponse(&'static str),
}

impl ProviderError {
    /// Transport hiccups and server-side errors are worth one retry;
    /// anything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(err) => err.is_timeout() || err.is_connect(),
            ProviderError::Status { status, .. } => *status >= 500,
            ProviderError::MalformedResponse(_) => false,
        }
    }
}

/// Contract with the external embedding and generation services.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Chat completion (non-streaming). Returns the raw text output.
    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// Embed a batch of texts; one vector per input, same order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}
