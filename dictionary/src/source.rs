use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One dictionary line: a concept identifier and one of its names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub concept_id: String,
    pub canonical_name: String,
}

impl DictionaryEntry {
    pub fn new(concept_id: impl Into<String>, canonical_name: impl Into<String>) -> Self {
        Self {
            concept_id: concept_id.into(),
            canonical_name: canonical_name.into(),
        }
    }
}

/// Fallible, ordered stream of dictionary entries
pub type EntryStream<'a> = Box<dyn Iterator<Item = Result<DictionaryEntry>> + 'a>;

/// Anything that can stream dictionary entries in a fixed order
pub trait DictionarySource {
    /// Stable identifier used in cache keys (e.g. `ctd-disease`)
    fn id(&self) -> &str;

    /// Stream all entries in their canonical order
    fn stream(&self) -> Result<EntryStream<'_>>;
}

/// Dictionary held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDictionary {
    id: String,
    entries: Vec<DictionaryEntry>,
}

impl InMemoryDictionary {
    pub fn new(id: impl Into<String>, entries: Vec<DictionaryEntry>) -> Self {
        Self {
            id: id.into(),
            entries,
        }
    }

    /// Build from `(concept_id, name)` pairs
    pub fn from_pairs<I, A, B>(id: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(concept_id, name)| DictionaryEntry::new(concept_id, name))
            .collect();
        Self::new(id, entries)
    }
}

impl DictionarySource for InMemoryDictionary {
    fn id(&self) -> &str {
        &self.id
    }

    fn stream(&self) -> Result<EntryStream<'_>> {
        Ok(Box::new(self.entries.iter().cloned().map(Ok)))
    }
}
