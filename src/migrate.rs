//! Schema creation and index metadata.
//!
//! The `documents` table holds one row per [`DocumentRecord`](knowmap_core::models::DocumentRecord);
//! `seq` preserves insertion order for scans. `index_meta` pins the
//! embedding dimensionality and the embedding model identity the first time
//! the database is initialized. A later run configured with a different
//! vector size or a different model is refused.

use anyhow::{bail, Context, Result};
use sqlx::SqlitePool;

use crate::config::{Config, DEFAULT_LOCAL_MODEL};
use crate::db;

const DIMS_KEY: &str = "embedding_dims";
const MODEL_KEY: &str = "embedding_model";

/// Create the database and schema, and pin the embedding dimensionality.
pub async fn run_migrations(config: &Config) -> Result<usize> {
    let pool = db::connect(config).await?;
    let dims = index_dims(config)?;
    migrate_pool(&pool, dims, &index_model_key(config)).await?;
    pool.close().await;
    Ok(dims)
}

/// Dimensionality of the configured embedding provider.
pub fn index_dims(config: &Config) -> Result<usize> {
    config
        .embedding
        .resolved_dims()
        .context("embedding.dims must be set for this provider")
}

/// Identity of the configured embedding model as pinned in `index_meta`.
///
/// | Provider | Key |
/// |----------|-----|
/// | `hash` | `hash` (any `model` setting is ignored by the provider) |
/// | `local` | `local:<model>`, default model filled in |
/// | `openai`, `ollama` | `<provider>:<model>` |
pub fn index_model_key(config: &Config) -> String {
    let embedding = &config.embedding;
    match embedding.provider.as_str() {
        "hash" => "hash".to_string(),
        "local" => format!(
            "local:{}",
            embedding.model.as_deref().unwrap_or(DEFAULT_LOCAL_MODEL)
        ),
        provider => format!(
            "{}:{}",
            provider,
            embedding.model.as_deref().unwrap_or_default()
        ),
    }
}

/// Idempotently create all tables on an open pool and check `dims` against
/// the pinned value, and `model` against the pinned model key.
pub async fn migrate_pool(pool: &SqlitePool, dims: usize, model: &str) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            owner TEXT NOT NULL,
            source_name TEXT NOT NULL,
            normalized_text TEXT NOT NULL,
            entities_json TEXT NOT NULL DEFAULT '[]',
            embedding BLOB,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS index_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner)")
        .execute(pool)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO index_meta (key, value) VALUES (?, ?)")
        .bind(DIMS_KEY)
        .bind(dims.to_string())
        .execute(pool)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO index_meta (key, value) VALUES (?, ?)")
        .bind(MODEL_KEY)
        .bind(model)
        .execute(pool)
        .await?;

    let pinned = pinned_dims(pool).await?;
    if pinned != Some(dims) {
        bail!(
            "index was created with {} embedding dimensions but the configured provider produces {}; \
             use a new database path or the original embedding model",
            pinned.map(|d| d.to_string()).unwrap_or_else(|| "unknown".to_string()),
            dims
        );
    }

    let pinned_model = pinned_model(pool).await?;
    if pinned_model.as_deref() != Some(model) {
        bail!(
            "index was created with embedding model '{}' but the configured model is '{}'; \
             use a new database path or the original embedding model",
            pinned_model.unwrap_or_else(|| "unknown".to_string()),
            model
        );
    }

    Ok(())
}

/// Dimensionality recorded in `index_meta`, if any.
pub async fn pinned_dims(pool: &SqlitePool) -> Result<Option<usize>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?")
        .bind(DIMS_KEY)
        .fetch_optional(pool)
        .await?;
    Ok(value.and_then(|v| v.parse().ok()))
}

/// Embedding model key recorded in `index_meta`, if any.
pub async fn pinned_model(pool: &SqlitePool) -> Result<Option<String>> {
    Ok(
        sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?")
            .bind(MODEL_KEY)
            .fetch_optional(pool)
            .await?,
    )
}
