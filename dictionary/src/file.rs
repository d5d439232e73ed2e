use crate::error::{DictionaryError, Result};
use crate::source::{DictionaryEntry, DictionarySource, EntryStream};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const FIELD_SEPARATOR: &str = "||";

/// Dictionary stored as text, one `concept_id||name` pair per line.
///
/// Synonyms of a concept are separate lines sharing the concept id. Blank
/// lines are skipped.
#[derive(Debug, Clone)]
pub struct DictionaryFile {
    path: PathBuf,
    id: String,
}

impl DictionaryFile {
    /// The dictionary id is the file stem
    pub fn new(path: &Path) -> Self {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::with_id(path, id)
    }

    pub fn with_id(path: &Path, id: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            id: id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DictionarySource for DictionaryFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn stream(&self) -> Result<EntryStream<'_>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let entries = reader
            .lines()
            .enumerate()
            .filter_map(move |(idx, line)| match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(parse_line(&line).ok_or_else(|| DictionaryError::Malformed {
                    source_id: self.id.clone(),
                    line: idx + 1,
                })),
                Err(err) => Some(Err(err.into())),
            });
        Ok(Box::new(entries))
    }
}

fn parse_line(line: &str) -> Option<DictionaryEntry> {
    let (concept_id, name) = line.trim_end_matches(['\r', '\n']).split_once(FIELD_SEPARATOR)?;
    let concept_id = concept_id.trim();
    let name = name.trim();
    if concept_id.is_empty() || name.is_empty() {
        return None;
    }
    Some(DictionaryEntry::new(concept_id, name))
}
