//! TOML configuration.
//!
//! See `config/knowmap.example.toml` for a complete file. Every section
//! except `[db]` and `[server]` has defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use knowmap_core::models::DEFAULT_TOP_K;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub entities: EntitiesConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "hash".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// Dimensionality used by the `hash` provider when `dims` is unset.
pub const DEFAULT_HASH_DIMS: usize = 384;

impl EmbeddingConfig {
    /// Dimensionality this configuration will produce, if it can be known
    /// without loading a model.
    pub fn resolved_dims(&self) -> Option<usize> {
        match self.provider.as_str() {
            "hash" => Some(self.dims.unwrap_or(DEFAULT_HASH_DIMS)),
            "local" => Some(self.dims.unwrap_or_else(|| {
                local_model_dims(self.model.as_deref().unwrap_or(DEFAULT_LOCAL_MODEL))
            })),
            _ => self.dims,
        }
    }
}

/// Model used by the `local` provider when `model` is unset.
pub const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";

/// Known output dimensionality of the supported local models.
pub fn local_model_dims(model: &str) -> usize {
    match model {
        "all-minilm-l6-v2" => 384,
        "bge-small-en-v1.5" => 384,
        "bge-base-en-v1.5" => 768,
        "bge-large-en-v1.5" => 1024,
        "nomic-embed-text-v1" | "nomic-embed-text-v1.5" => 768,
        _ => 384,
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntitiesConfig {
    #[serde(default = "default_entities_provider")]
    pub provider: String,
    /// Endpoint of the remote NER service.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_entity_retries")]
    pub max_retries: u32,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            provider: default_entities_provider(),
            url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_entity_retries(),
        }
    }
}

fn default_entities_provider() -> String {
    "heuristic".to_string()
}
fn default_entity_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Largest request body accepted by the upload endpoints, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.retrieval.top_k < 1 {
        bail!("retrieval.top_k must be >= 1");
    }

    if config.embedding.dims == Some(0) {
        bail!("embedding.dims must be > 0");
    }

    match config.embedding.provider.as_str() {
        "hash" | "local" => {}
        "openai" | "ollama" => {
            if config.embedding.dims.is_none() {
                bail!(
                    "embedding.dims must be set when provider is '{}'",
                    config.embedding.provider
                );
            }
            if config.embedding.model.is_none() {
                bail!(
                    "embedding.model must be specified when provider is '{}'",
                    config.embedding.provider
                );
            }
        }
        other => bail!(
            "Unknown embedding provider: '{}'. Must be hash, openai, ollama, or local.",
            other
        ),
    }

    match config.entities.provider.as_str() {
        "heuristic" => {}
        "remote" => {
            if config.entities.url.is_none() {
                bail!("entities.url must be set when provider is 'remote'");
            }
        }
        other => bail!(
            "Unknown entities provider: '{}'. Must be heuristic or remote.",
            other
        ),
    }

    Ok(())
}
