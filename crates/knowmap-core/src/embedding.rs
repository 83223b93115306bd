//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, the offline [`HashEmbedder`], and pure helpers for vector
//! serialization and similarity computation.
//!
//! Network and model-backed providers (OpenAI, Ollama, fastembed) live in
//! the `knowmap` app crate.

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::normalize::clean;

/// Trait for embedding providers.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector, so that query embeddings stay comparable with stored ones.
/// Providers are built once at startup and shared behind an `Arc`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> AnyResult<Vec<Vec<f32>>>;
}

/// Embed a single text, enforcing the provider's dimensionality.
///
/// Blank text never reaches the model: it maps to the zero vector of
/// length `dims()`, which ranks with similarity 0 against everything.
pub async fn embed_text(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    let dims = provider.dims();
    if text.trim().is_empty() {
        return Ok(vec![0.0; dims]);
    }

    let vector = provider
        .embed(&[text.to_string()])
        .await
        .map_err(|e| Error::Embedding(format!("{:#}", e)))?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))?;

    if vector.len() != dims {
        return Err(Error::ProviderDimensions {
            expected: dims,
            actual: vector.len(),
        });
    }
    Ok(vector)
}

/// Deterministic, offline embedder based on signed feature hashing.
///
/// Each normalized token is hashed with SHA-256; the first four bytes pick
/// a bucket and the fifth picks the sign. The accumulated vector is
/// L2-normalized. Texts sharing vocabulary land close together, which is
/// enough for local use and for tests, with no model download.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    /// Embed one text synchronously.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        if self.dims == 0 {
            return vector;
        }

        for token in clean(text).split_whitespace() {
            let digest = Sha256::digest(token.as_bytes());
            let bucket =
                u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize % self.dims;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> AnyResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// # Example
///
/// ```rust
/// use knowmap_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embedding vectors.
///
/// Accumulates in `f64` and returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal, or either vector has zero norm
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, and any
/// non-finite intermediate result.
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
