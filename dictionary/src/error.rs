use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dictionary line {line} in {source_id}: expected `concept_id||name`")]
    Malformed { source_id: String, line: usize },

    #[error("Dictionary {0} contains no entries")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, DictionaryError>;
