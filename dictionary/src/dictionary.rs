use crate::error::{DictionaryError, Result};
use crate::source::{DictionaryEntry, DictionarySource};
use log::info;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

const COMPOUND_SEPARATOR: char = '|';
const DATABASE_SEPARATOR: char = ':';

/// A fully materialized dictionary.
///
/// Entry order is the order of the source stream and never changes after
/// loading.
#[derive(Debug, Clone)]
pub struct Dictionary {
    id: String,
    entries: Vec<DictionaryEntry>,
    fingerprint: String,
}

impl Dictionary {
    /// Stream every entry of `source` into memory
    pub fn load(source: &dyn DictionarySource) -> Result<Self> {
        let entries = source.stream()?.collect::<Result<Vec<_>>>()?;
        if entries.is_empty() {
            return Err(DictionaryError::Empty(source.id().to_string()));
        }

        info!(
            "Loaded dictionary {} with {} entries",
            source.id(),
            entries.len()
        );
        Ok(Self::from_entries(source.id(), entries))
    }

    pub fn from_entries(id: impl Into<String>, entries: Vec<DictionaryEntry>) -> Self {
        let fingerprint = compute_fingerprint(&entries);
        Self {
            id: id.into(),
            entries,
            fingerprint,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn entry(&self, row: usize) -> Option<&DictionaryEntry> {
        self.entries.get(row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SHA-256 over every `(concept_id, name)` pair, in order
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.canonical_name.as_str())
    }

    /// Distinct databases (e.g. `MESH`, `OMIM`) referenced by identifiers
    pub fn database_names(&self) -> Vec<String> {
        let databases: BTreeSet<&str> = self
            .entries
            .iter()
            .flat_map(|entry| entry.concept_id.split(COMPOUND_SEPARATOR))
            .filter_map(database_of)
            .collect();
        databases.into_iter().map(str::to_string).collect()
    }
}

/// Database prefix of a single identifier: everything before the last `:`
pub fn database_of(concept_id: &str) -> Option<&str> {
    concept_id
        .rsplit_once(DATABASE_SEPARATOR)
        .map(|(database, _)| database)
}

fn compute_fingerprint(entries: &[DictionaryEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        hasher.update(entry.concept_id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(entry.canonical_name.as_bytes());
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}
