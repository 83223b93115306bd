//! Error types for the indexing and retrieval core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required request field is missing or malformed.
    #[error("invalid input: {0}")]
    Input(String),

    #[error("embedding has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("record has no embedding")]
    MissingEmbedding,

    #[error("embedding contains non-finite values")]
    MalformedEmbedding,

    /// The embedding provider returned a vector whose length differs from
    /// the dimensionality it advertises. A server-side configuration fault.
    #[error("embedding provider returned {actual} dimensions, expected {expected}")]
    ProviderDimensions { expected: usize, actual: usize },

    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("entity extraction failed: {0}")]
    Extraction(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// True for errors caused by the caller's request rather than by the
    /// system, i.e. errors that map to a client error response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Input(_)
                | Error::DimensionMismatch { .. }
                | Error::MissingEmbedding
                | Error::MalformedEmbedding
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
