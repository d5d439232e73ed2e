use std::path::PathBuf;
use thiserror::Error;

/// Failures of the external abbreviation detector.
///
/// These never abort linking: the preprocessor logs them and carries on
/// with an empty abbreviation map.
#[derive(Debug, Error)]
pub enum AbbreviationError {
    /// Could not prepare the tool's input files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool binary could not be started
    #[error("Failed to run abbreviation detector {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure
    #[error("Abbreviation detector exited with status {status:?}: {stderr}")]
    ExitStatus { status: Option<i32>, stderr: String },
}
