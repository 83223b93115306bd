//! `knowmap list`: show stored documents in upload order.

use anyhow::Result;

use knowmap_core::models::DocumentSummary;
use knowmap_core::store::Store;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn list_documents<S: Store + ?Sized>(store: &S) -> Result<Vec<DocumentSummary>> {
    let records = store.scan().await?;
    Ok(records.iter().map(DocumentSummary::from).collect())
}

pub async fn run_list(config: &Config, json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let summaries = list_documents(&store).await?;
    store.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<24}  {:<28}  {:>8}  {:<10}",
        "ID", "OWNER", "SOURCE", "ENTITIES", "UPLOADED"
    );
    println!("{}", "-".repeat(114));
    for doc in &summaries {
        let date = chrono::DateTime::from_timestamp(doc.created_at, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<36}  {:<24}  {:<28}  {:>8}  {:<10}{}",
            doc.id,
            doc.owner,
            doc.source_name,
            doc.entity_count,
            date,
            if doc.has_embedding { "" } else { "  (no embedding)" }
        );
    }

    Ok(())
}
