//! # Bionel Document
//!
//! Minimal annotation model shared by the normalization crates: tokenized
//! sentences, entity mention spans recognized by an upstream tagger, the
//! candidates produced by retrieval and the linking labels attached back to
//! the sentence.
//!
//! ## Example
//!
//! ```
//! use bionel_document::Sentence;
//!
//! let mut sentence = Sentence::new("Respiratory syncytial virus (RSV) is common.");
//! sentence.annotate("disease", 4..5).unwrap();
//!
//! assert_eq!(
//!     sentence.tokenized_text(),
//!     "Respiratory syncytial virus ( RSV ) is common ."
//! );
//! assert_eq!(sentence.mentions(Some("disease")).next().unwrap().text, "RSV");
//! ```

mod error;
mod label;
mod sentence;

pub use error::DocumentError;
pub use label::{Candidate, LinkingLabel, PredictionSet};
pub use sentence::{EntityAnnotation, MentionSpan, Sentence, Token};

/// Label category used when no entity type was requested.
pub const DEFAULT_LABEL_CATEGORY: &str = "nen";

/// Label category under which linking results for `entity_type` are stored.
pub fn label_category(entity_type: Option<&str>) -> String {
    match entity_type {
        Some(entity_type) => format!("{entity_type}_{DEFAULT_LABEL_CATEGORY}"),
        None => DEFAULT_LABEL_CATEGORY.to_string(),
    }
}
