use crate::sentence::MentionSpan;
use serde::{Deserialize, Serialize};

/// A knowledge-base concept proposed for a mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Canonical (dictionary) name of the concept
    pub canonical_name: String,

    /// Raw concept identifier; `None` when nothing matched
    pub concept_id: Option<String>,

    /// Similarity score (higher is better)
    pub score: f32,
}

impl Candidate {
    pub fn new(canonical_name: impl Into<String>, concept_id: impl Into<String>, score: f32) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            concept_id: Some(concept_id.into()),
            score,
        }
    }

    /// Candidate for a mention that has no dictionary counterpart
    pub fn unmatched(mention: impl Into<String>) -> Self {
        Self {
            canonical_name: mention.into(),
            concept_id: None,
            score: 0.0,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.concept_id.is_some()
    }
}

/// Up to `top_k` candidates for one mention, best first
pub type PredictionSet = Vec<Candidate>;

/// Normalization result attached to a sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkingLabel {
    /// The mention this label belongs to
    pub span: MentionSpan,

    /// Primary concept identifier without database prefix
    pub concept_id: String,

    pub concept_name: String,

    /// Further identifiers of a compound concept id
    #[serde(default)]
    pub additional_ids: Vec<String>,

    /// Database the primary identifier comes from (e.g. `MESH`)
    pub database: Option<String>,

    pub score: f32,
}
