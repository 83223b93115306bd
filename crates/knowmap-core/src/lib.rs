//! # KnowMap Core
//!
//! Document indexing and retrieval logic for KnowMap: document records,
//! text normalization, the index store abstraction, the entity
//! co-occurrence graph builder, and the cosine similarity ranker.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem I/O. The
//! external collaborators (entity recognition and embedding models) are
//! traits here; concrete network-backed implementations live in the
//! `knowmap` application crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Document records, requests, search results |
//! | [`normalize`] | Text cleaning and character-safe truncation |
//! | [`store`] | [`store::Store`] trait and in-memory backend |
//! | [`embedding`] | Embedding provider trait, hashing embedder, cosine similarity |
//! | [`entities`] | Entity extractor trait and heuristic extractor |
//! | [`graph`] | Directed entity co-occurrence graph |
//! | [`rank`] | Brute-force top-k similarity ranking |
//! | [`ingest`] | Upload → record pipeline |
//! | [`search`] | Query → ranked results pipeline |
//! | [`error`] | Error taxonomy |

pub mod embedding;
pub mod entities;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod rank;
pub mod search;
pub mod store;

pub use error::{Error, Result};
