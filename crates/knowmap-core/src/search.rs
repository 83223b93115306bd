//! Query → ranked results, and the graph generation entry point.
//!
//! Both operations read one [`Store::scan`] snapshot and then run a pure
//! function over it ([`rank`] or [`CooccurrenceGraph::build`]). An empty
//! index is a valid state: search returns no results and the graph is
//! empty.

use crate::embedding::{embed_text, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::graph::CooccurrenceGraph;
use crate::models::{SearchRequest, SearchResult};
use crate::rank::rank;
use crate::store::Store;

/// Embed the query and rank every stored document against it.
///
/// `default_k` applies when the request carries no `limit`. A blank query
/// embeds to the zero vector, so every document scores `0.0` and the first
/// `k` documents come back in scan order.
pub async fn search<S: Store + ?Sized>(
    store: &S,
    embedder: &dyn EmbeddingProvider,
    req: &SearchRequest,
    default_k: usize,
) -> Result<Vec<SearchResult>> {
    let query = req
        .query
        .as_deref()
        .ok_or_else(|| Error::Input("query is required".to_string()))?;
    let k = req.limit.unwrap_or(default_k);

    let query_vec = embed_text(embedder, query).await?;
    let records = store.scan().await?;
    let results = rank(&query_vec, &records, k);

    tracing::debug!(
        scanned = records.len(),
        returned = results.len(),
        k,
        "search complete"
    );
    Ok(results)
}

/// Rebuild the co-occurrence graph from the current index contents.
pub async fn generate_graph<S: Store + ?Sized>(store: &S) -> Result<CooccurrenceGraph> {
    let records = store.scan().await?;
    let graph = CooccurrenceGraph::build(&records);
    tracing::debug!(
        documents = records.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph generated"
    );
    Ok(graph)
}
