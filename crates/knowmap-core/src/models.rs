//! Core data models used throughout KnowMap.
//!
//! These types represent the document records, boundary requests, and
//! search results that flow through the ingestion and retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of characters of normalized text stored per document.
pub const TEXT_CAP: usize = 5000;

/// Number of characters of normalized text shown in a search result.
pub const PREVIEW_CHARS: usize = 200;

/// Number of characters of normalized text echoed back after an upload.
pub const UPLOAD_PREVIEW_CHARS: usize = 1000;

/// Default number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 5;

/// One ingested document.
///
/// Created exactly once at upload time and never mutated afterwards.
/// `embedding` is optional only so that rows read back from storage
/// without a vector can be represented; [`Store::insert`](crate::store::Store::insert)
/// refuses records where it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub owner: String,
    pub source_name: String,
    /// Cleaned, lowercased text capped at [`TEXT_CAP`] characters.
    pub normalized_text: String,
    /// Entity mentions in order of appearance; duplicates preserved.
    pub entities: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// Ingestion boundary input.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub owner: String,
    pub source_name: String,
    pub raw_text: String,
}

impl IngestRequest {
    /// Builds a request from optional boundary fields, reporting the first
    /// missing or blank field as [`Error::Input`].
    ///
    /// Empty text is accepted (it is a degenerate but valid upload); only an
    /// absent text field is an error.
    pub fn from_parts(
        owner: Option<String>,
        source_name: Option<String>,
        raw_text: Option<String>,
    ) -> Result<Self> {
        let owner = owner
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| Error::Input("owner must not be empty".to_string()))?;
        let source_name = source_name
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Input("source_name must not be empty".to_string()))?;
        let raw_text = raw_text.ok_or_else(|| Error::Input("text is required".to_string()))?;
        Ok(Self {
            owner,
            source_name,
            raw_text,
        })
    }
}

/// Search boundary input, as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Overrides the configured top-k for this request.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub source_name: String,
    /// First [`PREVIEW_CHARS`] characters of the stored normalized text.
    pub text_preview: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f64,
}

/// Lightweight listing entry for a stored document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub owner: String,
    pub source_name: String,
    pub entity_count: usize,
    pub has_embedding: bool,
    pub created_at: i64,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id.clone(),
            owner: record.owner.clone(),
            source_name: record.source_name.clone(),
            entity_count: record.entities.len(),
            has_embedding: record.embedding.is_some(),
            created_at: record.created_at,
        }
    }
}
