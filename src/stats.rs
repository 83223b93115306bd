//! Index statistics.
//!
//! Provides a quick summary of what's indexed: document and owner counts,
//! embedding coverage, and the size of the entity graph. Used by
//! `knowmap stats` to confirm uploads are landing as expected.

use anyhow::Result;
use serde::Serialize;

use knowmap_core::search::generate_graph;

use crate::config::Config;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: i64,
    pub owners: i64,
    pub embedded: i64,
    pub dims: Option<usize>,
    pub distinct_entities: usize,
    pub edges: usize,
}

pub async fn collect_stats(store: &SqliteStore) -> Result<IndexStats> {
    let pool = store.pool();

    let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    let owners: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT owner) FROM documents")
        .fetch_one(pool)
        .await?;
    let embedded: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE embedding IS NOT NULL")
            .fetch_one(pool)
            .await?;
    let dims = migrate::pinned_dims(pool).await?;

    let graph = generate_graph(store).await?;

    Ok(IndexStats {
        documents,
        owners,
        embedded,
        dims,
        distinct_entities: graph.node_count(),
        edges: graph.edge_count(),
    })
}

/// Run the stats command: query the index and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let stats = collect_stats(&store).await?;
    store.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("KnowMap Index Stats");
    println!("===================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  Owners:      {}", stats.owners);
    println!(
        "  Embedded:    {} / {} ({} dims)",
        stats.embedded,
        stats.documents,
        stats
            .dims
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string())
    );
    println!("  Entities:    {}", stats.distinct_entities);
    println!("  Edges:       {}", stats.edges);
    println!();

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
