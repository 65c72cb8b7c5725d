use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::rag::PipelineError;

/// Configuration problems detected at startup. All of these are fatal:
/// the process refuses to start rather than limp along and fail per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API credential: set {0}")]
    MissingCredential(&'static str),
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    InvalidChunking { size: usize, overlap: usize },
    #[error("relevance threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),
    #[error("retrieval top_k must be at least 1")]
    InvalidTopK,
    #[error("failed to read config file {}: {source}", path.display())]
    Unreadable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Malformed {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmbeddingBackend(_) | PipelineError::GenerationBackend(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            PipelineError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
