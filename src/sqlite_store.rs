//! SQLite-backed [`Store`] implementation.
//!
//! Entities are stored as a JSON array and embeddings as little-endian
//! `f32` BLOBs. Each insert is a single `INSERT` statement, so a
//! concurrent scan never sees a partially written record.

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use knowmap_core::embedding::{blob_to_vec, vec_to_blob};
use knowmap_core::error::{Error, Result};
use knowmap_core::models::DocumentRecord;
use knowmap_core::store::{validate_embedding, Store};

use crate::config::Config;
use crate::db;
use crate::migrate;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    dims: usize,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, dims: usize) -> Self {
        Self { pool, dims }
    }

    /// Connect, create the schema if needed, and check the pinned
    /// dimensionality and model against the configured provider.
    pub async fn open(config: &Config) -> AnyResult<Self> {
        let pool = db::connect(config).await?;
        let dims = migrate::index_dims(config)?;
        migrate::migrate_pool(&pool, dims, &migrate::index_model_key(config)).await?;
        Ok(Self::new(pool, dims))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn storage(err: sqlx::Error) -> Error {
    Error::Storage(err.to_string())
}

#[async_trait]
impl Store for SqliteStore {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn insert(&self, record: &DocumentRecord) -> Result<()> {
        let embedding = validate_embedding(record, self.dims)?;
        let entities_json = serde_json::to_string(&record.entities)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, owner, source_name, normalized_text,
                                   entities_json, embedding, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.owner)
        .bind(&record.source_name)
        .bind(&record.normalized_text)
        .bind(&entities_json)
        .bind(vec_to_blob(embedding))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn scan(&self) -> Result<Vec<DocumentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, source_name, normalized_text, entities_json,
                   embedding, created_at
            FROM documents
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter()
            .map(|row| -> Result<DocumentRecord> {
                let entities_json: String = row.get("entities_json");
                let embedding: Option<Vec<u8>> = row.get("embedding");
                Ok(DocumentRecord {
                    id: row.get("id"),
                    owner: row.get("owner"),
                    source_name: row.get("source_name"),
                    normalized_text: row.get("normalized_text"),
                    entities: serde_json::from_str(&entities_json)?,
                    embedding: embedding.map(|blob| blob_to_vec(&blob)),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store(dims: usize) -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate::migrate_pool(&pool, dims, "test").await.unwrap();
        SqliteStore::new(pool, dims)
    }

    fn record(id: &str, entities: &[&str], embedding: Option<Vec<f32>>) -> DocumentRecord {
        DocumentRecord {
            id: id.into(),
            owner: "bob@example.com".into(),
            source_name: format!("{}.txt", id),
            normalized_text: "hello world ".into(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            embedding,
            created_at: 1_700_000_123,
        }
    }

    #[tokio::test]
    async fn test_insert_scan_roundtrip() {
        let store = memory_store(3).await;
        let a = record("a", &["Alice", "Alice", "Bob"], Some(vec![0.5, -1.25, 2.0]));
        let b = record("b", &[], Some(vec![0.0, 0.0, 0.0]));
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        let scanned = store.scan().await.unwrap();
        assert_eq!(scanned, vec![a, b]);
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_embeddings() {
        let store = memory_store(3).await;
        assert!(matches!(
            store.insert(&record("x", &[], Some(vec![1.0]))).await,
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(matches!(
            store.insert(&record("y", &[], None)).await,
            Err(Error::MissingEmbedding)
        ));
        assert!(store.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_row_without_embedding() {
        let store = memory_store(2).await;
        sqlx::query(
            "INSERT INTO documents (id, owner, source_name, normalized_text, created_at) \
             VALUES ('legacy', 'o', 'old.txt', 'old text', 0)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let scanned = store.scan().await.unwrap();
        assert_eq!(scanned.len(), 1);
        assert!(scanned[0].embedding.is_none());
        assert!(scanned[0].entities.is_empty());
    }

    #[tokio::test]
    async fn test_pinned_dims_mismatch_fails() {
        let store = memory_store(4).await;
        let err = migrate::migrate_pool(store.pool(), 8, "other")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("4 embedding dimensions"));
        assert_eq!(migrate::pinned_dims(store.pool()).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_pinned_model_mismatch_fails() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate::migrate_pool(&pool, 384, "hash").await.unwrap();
        migrate::migrate_pool(&pool, 384, "hash").await.unwrap();

        let err = migrate::migrate_pool(&pool, 384, "local:all-minilm-l6-v2")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("embedding model 'hash'"));
        assert_eq!(
            migrate::pinned_model(&pool).await.unwrap().as_deref(),
            Some("hash")
        );
    }
}
