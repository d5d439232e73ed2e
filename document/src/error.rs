use thiserror::Error;

/// Errors raised while building annotated sentences
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Token range does not fit the sentence
    #[error("Invalid token range {start}..{end} for sentence with {len} tokens")]
    InvalidTokenRange { start: usize, end: usize, len: usize },

    /// Character range does not cover any token
    #[error("Character range {start}..{end} does not cover any token")]
    EmptyCharRange { start: usize, end: usize },
}
