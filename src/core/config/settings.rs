//! Typed service configuration.
//!
//! Settings come from an optional `askdocs.toml` in the data directory,
//! with the API credential taken from the environment. Everything is
//! validated once at startup; an invalid configuration is fatal.

use std::env;
use std::fs;

use serde::Deserialize;

use super::AppPaths;
use crate::core::errors::ConfigError;

const API_KEY_ENV: &str = "ASKDOCS_API_KEY";
const API_KEY_ENV_FALLBACK: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub provider: ProviderSettings,
    pub index: IndexSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of one document.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Minimum similarity score a retrieved chunk needs to reach the
    /// generation prompt. Fixed for the lifetime of the process.
    pub relevance_threshold: f32,
    /// Number of nearest neighbours fetched per query.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.15,
            top_k: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    /// Never read from the config file; populated from the environment.
    #[serde(skip)]
    pub api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: String::new(),
            chat_model: "openai/gpt-oss-120b".to_string(),
            embedding_model: "openai/text-embedding-ada-002".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Persistent on-disk index that accumulates across restarts.
    Sqlite,
    /// Ephemeral index rebuilt from the seed corpus on every startup.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub mode: IndexMode,
    /// Sources ingested at startup when running in memory mode.
    pub seed_urls: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            mode: IndexMode::Sqlite,
            seed_urls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        let mut settings = if paths.config_path.exists() {
            let raw = fs::read_to_string(&paths.config_path).map_err(|source| {
                ConfigError::Unreadable {
                    path: paths.config_path.clone(),
                    source,
                }
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Malformed {
                path: paths.config_path.clone(),
                source,
            })?
        } else {
            Settings::default()
        };

        settings.provider.api_key = env::var(API_KEY_ENV)
            .or_else(|_| env::var(API_KEY_ENV_FALLBACK))
            .unwrap_or_default();

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(API_KEY_ENV));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: self.chunking.chunk_size,
                overlap: self.chunking.chunk_overlap,
            });
        }
        if !(0.0..=1.0).contains(&self.retrieval.relevance_threshold) {
            return Err(ConfigError::InvalidThreshold(
                self.retrieval.relevance_threshold,
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        Ok(())
    }
}
