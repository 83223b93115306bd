//! In-memory [`Store`] implementation for testing and embedded use.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`. Each insert pushes a
//! fully built record under a single write lock, so a concurrent scan sees
//! either the whole record or nothing.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::DocumentRecord;

use super::{validate_embedding, Store};

/// In-memory document index.
pub struct InMemoryStore {
    dims: usize,
    records: RwLock<Vec<DocumentRecord>>,
}

impl InMemoryStore {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> Error {
    Error::Storage("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl Store for InMemoryStore {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn insert(&self, record: &DocumentRecord) -> Result<()> {
        validate_embedding(record, self.dims)?;
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.push(record.clone());
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<DocumentRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.clone())
    }
}
