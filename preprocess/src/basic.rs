use serde::{Deserialize, Serialize};

/// ASCII punctuation, the characters removed by default
pub const DEFAULT_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Lowercasing and punctuation removal for mentions and dictionary names.
///
/// Adapted from the BioSyn preprocessing: names are split on runs of
/// whitespace and punctuation and rejoined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicPreprocessor {
    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_true")]
    pub remove_punctuation: bool,

    /// Characters treated as separators when `remove_punctuation` is set
    #[serde(default = "default_punctuation")]
    pub punctuation_symbols: String,
}

fn default_true() -> bool {
    true
}

fn default_punctuation() -> String {
    DEFAULT_PUNCTUATION.to_string()
}

impl Default for BasicPreprocessor {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_punctuation: true,
            punctuation_symbols: default_punctuation(),
        }
    }
}

impl BasicPreprocessor {
    pub fn new(lowercase: bool, remove_punctuation: bool) -> Self {
        Self {
            lowercase,
            remove_punctuation,
            ..Default::default()
        }
    }

    pub fn process_entry(&self, entity_name: &str) -> String {
        let name = if self.lowercase {
            entity_name.to_lowercase()
        } else {
            entity_name.to_string()
        };

        if !self.remove_punctuation {
            return name.trim().to_string();
        }

        name.split(|c: char| c.is_whitespace() || self.punctuation_symbols.contains(c))
            .filter(|piece| !piece.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
