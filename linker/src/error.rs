use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkerError {
    #[error("Invalid linker configuration: {0}")]
    Config(String),

    #[error("Missing {what} at {}", path.display())]
    MissingResource { what: String, path: PathBuf },

    #[error("Dictionary error: {0}")]
    Dictionary(#[from] bionel_dictionary::DictionaryError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] bionel_retrieval::RetrievalError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] bionel_embeddings::EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkerError>;
