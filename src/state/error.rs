use thiserror::Error;

use crate::core::errors::ConfigError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build model provider client: {0}")]
    Provider(#[source] reqwest::Error),

    #[error("failed to open vector index: {0}")]
    Index(#[source] anyhow::Error),

    #[error("failed to open user store: {0}")]
    Users(#[source] anyhow::Error),
}
