//! Directed entity co-occurrence graph.
//!
//! # Algorithm
//!
//! 1. Start from an empty node set and an empty edge set.
//! 2. For every record, add each entity in its sequence as a node, so a
//!    document with a single entity still surfaces it as an isolated node.
//! 3. For every adjacent pair `(entities[i], entities[i + 1])` in the same
//!    record, add the directed edge `entities[i] → entities[i + 1]`.
//! 4. Sets collapse duplicates; there is no edge weight. Two consecutive
//!    identical mentions produce a self-loop, which is kept.
//!
//! The graph is a value computed from one index snapshot in
//! `O(total mentions)`; it holds no reference to the store and is rebuilt
//! from scratch on every request. Nodes and edges are kept in ordered sets
//! so that serialized output is identical across rebuilds.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::models::DocumentRecord;

/// A directed edge between two entity strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Entity adjacency graph across all ingested documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CooccurrenceGraph {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<Edge>,
}

impl CooccurrenceGraph {
    /// Build the graph from every record's entity sequence.
    pub fn build(records: &[DocumentRecord]) -> Self {
        Self::from_sequences(records.iter().map(|r| r.entities.as_slice()))
    }

    /// Build the graph from raw entity sequences.
    pub fn from_sequences<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut graph = Self::default();
        for entities in sequences {
            graph.nodes.extend(entities.iter().cloned());
            for pair in entities.windows(2) {
                graph.edges.insert(Edge {
                    source: pair[0].clone(),
                    target: pair[1].clone(),
                });
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.contains(&Edge {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    /// Render as a Graphviz `digraph`. Layout is left to the consumer.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph knowmap {\n");
        for node in &self.nodes {
            let _ = writeln!(out, "    \"{}\";", escape_dot(node));
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\";",
                escape_dot(&edge.source),
                escape_dot(&edge.target)
            );
        }
        out.push_str("}\n");
        out
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
