//! # KnowMap
//!
//! Document upload, entity co-occurrence graphs, and semantic search.
//!
//! Uploaded text is run through an entity extractor and an embedding
//! model, normalized, and stored in SQLite. Two read paths work over a full
//! scan of the index: the co-occurrence graph (directed edges between
//! adjacent entity mentions) and top-k cosine similarity search.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────────┐   ┌──────────┐
//! │  Upload  │──▶│ Extract + Embed    │──▶│  SQLite  │
//! │ CLI/HTTP │   │ (knowmap-core)     │   │ documents│
//! └──────────┘   └────────────────────┘   └────┬─────┘
//!                                              │ scan
//!                           ┌──────────────────┤
//!                           ▼                  ▼
//!                     ┌──────────┐       ┌──────────┐
//!                     │  Graph   │       │  Search  │
//!                     └──────────┘       └──────────┘
//! ```
//!
//! The indexing and retrieval logic lives in `knowmap-core`; this crate
//! adds the SQLite store, the network-backed providers, the CLI, and the
//! HTTP server.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation and dimensionality pinning |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`embedding`] | Embedding providers (hash, OpenAI, Ollama, fastembed) |
//! | [`entities`] | Entity extractors (heuristic, remote NER) |
//! | [`services`] | Shared store and providers |
//! | [`ingest`] | `upload` command |
//! | [`search`] | `search` command |
//! | [`graph`] | `graph` command and renderings |
//! | [`documents`] | `list` command |
//! | [`stats`] | `stats` command |
//! | [`server`] | HTTP API |

pub mod config;
pub mod db;
pub mod documents;
pub mod embedding;
pub mod entities;
pub mod graph;
pub mod ingest;
pub mod migrate;
pub mod search;
pub mod server;
pub mod services;
pub mod sqlite_store;
pub mod stats;
