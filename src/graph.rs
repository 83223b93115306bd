//! `knowmap graph`: render the entity co-occurrence graph.
//!
//! | Format | Output |
//! |--------|--------|
//! | `json` | `{"nodes": [...], "edges": [{"source", "target"}, ...]}`, pretty-printed |
//! | `dot`  | Graphviz `digraph`, suitable for `dot -Tsvg` |
//!
//! Both renderings list nodes and edges in sorted order, so the same index
//! always produces byte-identical output.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use knowmap_core::graph::CooccurrenceGraph;
use knowmap_core::search::generate_graph;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Json,
    Dot,
}

pub fn render_graph(graph: &CooccurrenceGraph, format: GraphFormat) -> Result<String> {
    match format {
        GraphFormat::Json => Ok(serde_json::to_string_pretty(graph)?),
        GraphFormat::Dot => Ok(graph.to_dot()),
    }
}

pub async fn run_graph(config: &Config, format: GraphFormat, output: Option<&Path>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let graph = generate_graph(&store).await?;
    store.close().await;

    let rendered = render_graph(&graph, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "wrote {} nodes, {} edges to {}",
                graph.node_count(),
                graph.edge_count(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
