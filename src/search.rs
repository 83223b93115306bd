//! `knowmap search`: rank stored documents against a query.

use anyhow::Result;

use knowmap_core::models::{SearchRequest, SearchResult};
use knowmap_core::search::search;

use crate::config::Config;
use crate::services::Services;

pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let services = Services::open(config).await?;
    let results = search_documents(&services, query, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. [{:.4}] {}", i + 1, result.score, result.source_name);
        println!("    excerpt: \"{}\"", result.text_preview.trim());
        println!();
    }

    Ok(())
}

pub async fn search_documents(
    services: &Services,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<SearchResult>> {
    let req = SearchRequest {
        query: Some(query.to_string()),
        limit,
    };
    Ok(search(
        services.store.as_ref(),
        services.embedder.as_ref(),
        &req,
        services.top_k(),
    )
    .await?)
}
