use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Vector store error: {0}")]
    VectorStore(#[from] bionel_vector_store::VectorStoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] bionel_embeddings::EmbeddingError),

    #[error("Sparse search unavailable: {0}")]
    SparseUnavailable(String),

    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),

    #[error("Index returned row {row}, but the dictionary has {len} entries")]
    RowOutOfRange { row: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
