//! Embedding provider implementations.
//!
//! Concrete backends for the [`EmbeddingProvider`] trait defined in
//! `knowmap-core`:
//! - **`hash`**: [`HashEmbedder`] from the core crate; offline and deterministic.
//! - **[`OpenAIProvider`]**: calls the OpenAI embeddings API with batching, retry, and backoff.
//! - **[`OllamaProvider`]**: calls a local Ollama instance's `/api/embed` endpoint.
//! - **[`LocalProvider`]**: runs a sentence-transformer locally via fastembed; the model is
//!   loaded once when the provider is created and shared by every request.
//!
//! Providers are created once at startup by [`create_provider`] and handed
//! to the ingestion and search pipelines as `Arc<dyn EmbeddingProvider>`.
//!
//! # Retry Strategy
//!
//! The OpenAI and Ollama providers use exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use knowmap_core::embedding::{EmbeddingProvider, HashEmbedder};

use crate::config::{EmbeddingConfig, DEFAULT_HASH_DIMS};
#[cfg(feature = "local-embeddings-fastembed")]
use crate::config::{local_model_dims, DEFAULT_LOCAL_MODEL};

/// Create the configured [`EmbeddingProvider`].
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"hash"` | [`HashEmbedder`] |
/// | `"openai"` | [`OpenAIProvider`] |
/// | `"ollama"` | [`OllamaProvider`] |
/// | `"local"` | [`LocalProvider`] (feature `local-embeddings-fastembed`) |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(
            config.dims.unwrap_or(DEFAULT_HASH_DIMS),
        ))),
        "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Arc::new(LocalProvider::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// POST a JSON body with retry and exponential backoff, returning the
/// parsed JSON response.
pub(crate) async fn post_json_with_retry(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
    max_retries: u32,
    service: &str,
) -> Result<serde_json::Value> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, 8s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tracing::warn!(service, attempt, ?delay, "retrying request");
            tokio::time::sleep(delay).await;
        }

        let mut request = client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json().await?);
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(anyhow!("{} error {}: {}", service, status, body_text));
                    continue;
                }

                bail!("{} error {}: {}", service, status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow!("{} connection error ({}): {}", service, url, e));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} request failed after retries", service)))
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

fn json_to_vector(value: &serde_json::Value) -> Result<Vec<f32>> {
    value
        .as_array()
        .ok_or_else(|| anyhow!("embedding is not an array"))?
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| anyhow!("embedding contains a non-numeric value"))
        })
        .collect()
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAIProvider {
    model: String,
    dims: usize,
    api_key: String,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .context("embedding.model required for OpenAI provider")?;
        let dims = config
            .dims
            .context("embedding.dims required for OpenAI provider")?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            model,
            dims,
            api_key,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = post_json_with_retry(
                &self.client,
                "https://api.openai.com/v1/embeddings",
                Some(&self.api_key),
                &body,
                self.max_retries,
                "OpenAI API",
            )
            .await?;
            out.extend(parse_openai_response(&json)?);
        }
        Ok(out)
    }
}

/// Extract `data[].embedding`, ordered by `data[].index`.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(pos);
        let embedding = item
            .get("embedding")
            .ok_or_else(|| anyhow!("Invalid OpenAI response: missing embedding"))?;
        indexed.push((index, json_to_vector(embedding)?));
    }
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured URL (default `http://localhost:11434`).
pub struct OllamaProvider {
    model: String,
    dims: usize,
    url: String,
    batch_size: usize,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .context("embedding.model required for Ollama provider")?;
        let dims = config
            .dims
            .context("embedding.dims required for Ollama provider")?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(Self {
            model,
            dims,
            url,
            batch_size: config.batch_size.max(1),
            max_retries: config.max_retries,
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let endpoint = format!("{}/api/embed", self.url.trim_end_matches('/'));
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = serde_json::json!({
                "model": self.model,
                "input": batch,
            });
            let json = post_json_with_retry(
                &self.client,
                &endpoint,
                None,
                &body,
                self.max_retries,
                "Ollama API",
            )
            .await?;
            out.extend(parse_ollama_response(&json)?);
        }
        Ok(out)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    json.get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing embeddings array"))?
        .iter()
        .map(json_to_vector)
        .collect()
}

// ============ Local Provider (fastembed) ============

/// Local sentence-transformer inference via fastembed.
///
/// The model is downloaded on first use from Hugging Face and cached; it is
/// loaded once here and reused. Inference runs on the blocking thread pool.
#[cfg(feature = "local-embeddings-fastembed")]
pub struct LocalProvider {
    model_name: String,
    dims: usize,
    batch_size: usize,
    model: Arc<std::sync::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings-fastembed")]
impl LocalProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());
        let dims = config.dims.unwrap_or_else(|| local_model_dims(&model_name));

        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(config_to_fastembed_model(&model_name)?)
                .with_show_download_progress(false),
        )
        .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;

        tracing::info!(model = %model_name, dims, "local embedding model loaded");

        Ok(Self {
            model_name,
            dims,
            batch_size: config.batch_size.max(1),
            model: Arc::new(std::sync::Mutex::new(model)),
        })
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV1),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1, nomic-embed-text-v1.5",
            other
        ),
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
#[async_trait]
impl EmbeddingProvider for LocalProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| anyhow!("local embedding model lock poisoned"))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| anyhow!("Local embedding failed: {}", e))
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hash_provider() {
        let config = EmbeddingConfig {
            dims: Some(16),
            ..EmbeddingConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "hash");
        assert_eq!(provider.dims(), 16);
    }

    #[test]
    fn test_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "nope".into(),
            ..EmbeddingConfig::default()
        };
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn test_parse_openai_response_orders_by_index() {
        let json = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_openai_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_openai_response_missing_data() {
        let err = parse_openai_response(&serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("missing data"));
    }

    #[test]
    fn test_parse_ollama_response() {
        let json = serde_json::json!({ "embeddings": [[0.5, 0.25], [1.0, -1.0]] });
        let vectors = parse_ollama_response(&json).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![1.0, -1.0]);
    }

    #[test]
    fn test_parse_ollama_rejects_non_numeric() {
        let json = serde_json::json!({ "embeddings": [[0.5, "x"]] });
        assert!(parse_ollama_response(&json).is_err());
    }
}
