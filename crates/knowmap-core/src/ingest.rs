//! Upload → document record pipeline.
//!
//! Runs the entity extractor and the embedding provider on the raw text,
//! normalizes and caps the text for storage, and inserts the finished
//! record. The record is built completely before the single
//! [`Store::insert`] call, so any failure along the way leaves the index
//! untouched.

use chrono::Utc;
use uuid::Uuid;

use crate::embedding::{embed_text, EmbeddingProvider};
use crate::entities::EntityExtractor;
use crate::error::{Error, Result};
use crate::models::{DocumentRecord, IngestRequest};
use crate::normalize::normalize_for_storage;
use crate::store::Store;

/// Build a [`DocumentRecord`] from an upload and store it.
///
/// Collaborator failures are not retried here; providers handle their own
/// transport-level retries.
pub async fn ingest<S: Store + ?Sized>(
    store: &S,
    extractor: &dyn EntityExtractor,
    embedder: &dyn EmbeddingProvider,
    req: IngestRequest,
) -> Result<DocumentRecord> {
    let entities = if req.raw_text.trim().is_empty() {
        Vec::new()
    } else {
        extractor
            .extract(&req.raw_text)
            .await
            .map_err(|e| Error::Extraction(format!("{:#}", e)))?
    };

    let embedding = embed_text(embedder, &req.raw_text).await?;

    let record = DocumentRecord {
        id: Uuid::new_v4().to_string(),
        owner: req.owner,
        source_name: req.source_name,
        normalized_text: normalize_for_storage(&req.raw_text),
        entities,
        embedding: Some(embedding),
        created_at: Utc::now().timestamp(),
    };

    store.insert(&record).await?;

    tracing::info!(
        id = %record.id,
        owner = %record.owner,
        source_name = %record.source_name,
        entities = record.entities.len(),
        extractor = extractor.name(),
        model = embedder.model_name(),
        "document ingested"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::entities::HeuristicExtractor;
    use crate::models::TEXT_CAP;
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;

    fn request(text: &str) -> IngestRequest {
        IngestRequest {
            owner: "alice@example.com".into(),
            source_name: "notes.txt".into(),
            raw_text: text.into(),
        }
    }

    #[tokio::test]
    async fn test_ingest_builds_full_record() {
        let store = InMemoryStore::new(32);
        let record = ingest(
            &store,
            &HeuristicExtractor::new(),
            &HashEmbedder::new(32),
            request("Alice visited Berlin. Berlin was cold!"),
        )
        .await
        .unwrap();

        assert_eq!(record.owner, "alice@example.com");
        assert_eq!(record.source_name, "notes.txt");
        assert_eq!(record.entities, vec!["Alice", "Berlin", "Berlin"]);
        assert_eq!(record.normalized_text, "alice visited berlin berlin was cold ");
        assert_eq!(record.embedding.as_ref().map(Vec::len), Some(32));
        assert_eq!(store.scan().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_ingest_empty_text() {
        let store = InMemoryStore::new(8);
        let record = ingest(
            &store,
            &HeuristicExtractor::new(),
            &HashEmbedder::new(8),
            request(""),
        )
        .await
        .unwrap();

        assert!(record.entities.is_empty());
        assert_eq!(record.embedding, Some(vec![0.0; 8]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ingest_truncates_text() {
        let store = InMemoryStore::new(8);
        let long = "abc ".repeat(4000);
        let record = ingest(
            &store,
            &HeuristicExtractor::new(),
            &HashEmbedder::new(8),
            request(&long),
        )
        .await
        .unwrap();
        assert_eq!(record.normalized_text.chars().count(), TEXT_CAP);
    }

    #[tokio::test]
    async fn test_ingest_dimension_mismatch_rejected() {
        let store = InMemoryStore::new(16);
        let err = ingest(
            &store,
            &HeuristicExtractor::new(),
            &HashEmbedder::new(8),
            request("Some Text"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 16,
                actual: 8
            }
        ));
        assert!(store.is_empty().unwrap());
    }

    struct FailingExtractor;

    #[async_trait]
    impl EntityExtractor for FailingExtractor {
        fn name(&self) -> &str {
            "failing"
        }
        async fn extract(&self, _text: &str) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("model unavailable")
        }
    }

    #[tokio::test]
    async fn test_extractor_failure_writes_nothing() {
        let store = InMemoryStore::new(8);
        let err = ingest(
            &store,
            &FailingExtractor,
            &HashEmbedder::new(8),
            request("Alice"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(store.is_empty().unwrap());
    }
}
