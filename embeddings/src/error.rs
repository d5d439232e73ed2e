use thiserror::Error;

/// Errors that can occur during embedding operations
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Failed to initialize the embedding model
    #[error("Failed to initialize embedding model: {0}")]
    ModelInitialization(String),

    /// Failed to generate embeddings
    #[error("Failed to generate embeddings: {0}")]
    EmbeddingGeneration(String),

    /// Invalid input provided to an encoder
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model not found or failed to download
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The encoder produced vectors of an unexpected length
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A persisted encoder could not be decoded
    #[error("Invalid sparse encoder artifact: {0}")]
    InvalidArtifact(String),

    /// Binary (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
