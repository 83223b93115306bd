//! Entity extractor backends.
//!
//! | Config Value | Extractor |
//! |-------------|-----------|
//! | `"heuristic"` | [`HeuristicExtractor`] from `knowmap-core` (offline) |
//! | `"remote"` | [`RemoteExtractor`], an HTTP NER service |
//!
//! The remote service contract is `POST {url}` with `{"text": "..."}`,
//! answered by `{"entities": [{"text": "..."}, ...]}` or the flat form
//! `{"entities": ["...", ...]}`. Mentions are kept in response order.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use knowmap_core::entities::{EntityExtractor, HeuristicExtractor};

use crate::config::EntitiesConfig;
use crate::embedding::post_json_with_retry;

/// Create the configured [`EntityExtractor`].
pub fn create_extractor(config: &EntitiesConfig) -> Result<Arc<dyn EntityExtractor>> {
    match config.provider.as_str() {
        "heuristic" => Ok(Arc::new(HeuristicExtractor::new())),
        "remote" => Ok(Arc::new(RemoteExtractor::new(config)?)),
        other => bail!("Unknown entities provider: {}", other),
    }
}

/// Entity extractor backed by an HTTP named-entity recognition service.
pub struct RemoteExtractor {
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl RemoteExtractor {
    pub fn new(config: &EntitiesConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .context("entities.url required for remote provider")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            url,
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl EntityExtractor for RemoteExtractor {
    fn name(&self) -> &str {
        "remote"
    }

    async fn extract(&self, text: &str) -> Result<Vec<String>> {
        let body = serde_json::json!({ "text": text });
        let json = post_json_with_retry(
            &self.client,
            &self.url,
            None,
            &body,
            self.max_retries,
            "NER service",
        )
        .await?;
        parse_entities_response(&json)
    }
}

fn parse_entities_response(json: &serde_json::Value) -> Result<Vec<String>> {
    let items = json
        .get("entities")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid NER response: missing entities array"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .or_else(|| item.get("text").and_then(|t| t.as_str()))
                .map(|s| s.to_string())
                .ok_or_else(|| anyhow!("Invalid NER response: entity without text"))
        })
        .collect()
}
