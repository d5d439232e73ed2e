use thiserror::Error;

/// Errors that can occur while building, persisting or searching an index
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Failed to build the index
    #[error("Failed to build index: {0}")]
    Build(String),

    /// Invalid query provided
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Vectors of different lengths were mixed
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A persisted bundle could not be used
    #[error("Invalid embedding bundle: {0}")]
    InvalidArtifact(String),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] bionel_embeddings::EmbeddingError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, VectorStoreError>;
