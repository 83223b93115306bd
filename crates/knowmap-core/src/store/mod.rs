//! Document index abstraction for KnowMap.
//!
//! The [`Store`] trait is the only shared mutable resource in the system:
//! an append-only collection of [`DocumentRecord`]s with insertion and full
//! enumeration. Graph building and ranking run over one [`Store::scan`]
//! snapshot; a record inserted concurrently with a scan may or may not be
//! part of it, and no isolation beyond per-record atomicity is promised.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::DocumentRecord;

/// Abstract storage backend for document records.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`dims`](Store::dims) | Fixed embedding dimensionality of this index |
/// | [`insert`](Store::insert) | Atomically append one validated record |
/// | [`scan`](Store::scan) | Read every record, insertion order |
#[async_trait]
pub trait Store: Send + Sync {
    /// Embedding dimensionality every stored record must match.
    fn dims(&self) -> usize;

    /// Append a record.
    ///
    /// Fails with [`Error::MissingEmbedding`], [`Error::DimensionMismatch`]
    /// or [`Error::MalformedEmbedding`]; never rejects on content otherwise.
    /// A rejected insert leaves the index unchanged.
    async fn insert(&self, record: &DocumentRecord) -> Result<()>;

    /// Return every record.
    ///
    /// Backends return insertion order. Callers may use that order for
    /// tie-breaking but must not depend on it for correctness.
    async fn scan(&self) -> Result<Vec<DocumentRecord>>;
}

/// Check a record's embedding against the index dimensionality.
///
/// Shared by every [`Store`] backend so the rejection rules are identical.
pub fn validate_embedding(record: &DocumentRecord, dims: usize) -> Result<&[f32]> {
    let embedding = record
        .embedding
        .as_deref()
        .ok_or(Error::MissingEmbedding)?;
    if embedding.len() != dims {
        return Err(Error::DimensionMismatch {
            expected: dims,
            actual: embedding.len(),
        });
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(Error::MalformedEmbedding);
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(embedding: Option<Vec<f32>>) -> DocumentRecord {
        DocumentRecord {
            id: "id".into(),
            owner: "owner".into(),
            source_name: "a.txt".into(),
            normalized_text: "text".into(),
            entities: vec![],
            embedding,
            created_at: 0,
        }
    }

    #[test]
    fn test_validate_ok() {
        let r = record(Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(validate_embedding(&r, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_validate_missing() {
        let r = record(None);
        assert!(matches!(
            validate_embedding(&r, 3),
            Err(Error::MissingEmbedding)
        ));
    }

    #[test]
    fn test_validate_wrong_length() {
        let r = record(Some(vec![0.1, 0.2]));
        assert!(matches!(
            validate_embedding(&r, 3),
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_validate_non_finite() {
        let r = record(Some(vec![0.1, f32::NAN, 0.3]));
        assert!(matches!(
            validate_embedding(&r, 3),
            Err(Error::MalformedEmbedding)
        ));
    }
}
