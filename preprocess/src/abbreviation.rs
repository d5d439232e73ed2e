use crate::error::AbbreviationError;
use log::{debug, error};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// File name of the Ab3P executable inside its resource directory
pub const AB3P_BINARY_NAME: &str = "identify_abbr";

/// Ab3P reads the location of its word data from this file in its working
/// directory.
const PATH_FILE_NAME: &str = "path_Ab3P";

const INPUT_FILE_NAME: &str = "sentences.txt";

/// Known complaints Ab3P prints to stdout instead of failing
const TOOL_DIAGNOSTICS: [(&str, &str); 3] = [
    (
        "Path file for type cshset does not exist!",
        "a path_Ab3P file pointing to the word data directory is required",
    ),
    ("Cannot open", "could not open the word data directory"),
    ("failed to open", "could not open the word data directory"),
];

/// Abbreviations defined per sentence.
///
/// Keys are the (trimmed) tokenized sentence text; inner maps go from the
/// lowercased short form to the lowercased long form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationMap {
    sentences: HashMap<String, HashMap<String, String>>,
}

impl AbbreviationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sentence: &str, short_form: &str, long_form: &str) {
        self.sentences
            .entry(sentence.trim().to_string())
            .or_default()
            .insert(
                short_form.trim().to_lowercase(),
                long_form.trim().to_lowercase(),
            );
    }

    /// Long form of `short_form` (already lowercased) within `sentence`
    pub fn long_form(&self, sentence: &str, short_form: &str) -> Option<&str> {
        self.sentences
            .get(sentence.trim())
            .and_then(|abbreviations| abbreviations.get(short_form))
            .map(String::as_str)
    }

    /// Number of sentences with at least one abbreviation
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Detects abbreviation definitions in a batch of sentences
pub trait AbbreviationResolver: Send + Sync {
    fn resolve(&self, sentences: &[String]) -> Result<AbbreviationMap, AbbreviationError>;
}

/// Resolver that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl AbbreviationResolver for NoopResolver {
    fn resolve(&self, _sentences: &[String]) -> Result<AbbreviationMap, AbbreviationError> {
        Ok(AbbreviationMap::new())
    }
}

/// Runs the Ab3P abbreviation definition detector
/// (<https://github.com/ncbi-nlp/Ab3P>) as a child process.
#[derive(Debug, Clone)]
pub struct Ab3pResolver {
    binary: PathBuf,
    word_data_dir: PathBuf,
}

impl Ab3pResolver {
    pub fn new(binary: impl Into<PathBuf>, word_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            word_data_dir: word_data_dir.into(),
        }
    }

    /// Look for `ab3p/identify_abbr` and `ab3p/word_data/` under `cache_root`
    pub fn locate(cache_root: &Path) -> Option<Self> {
        let data_dir = cache_root.join("ab3p");
        let binary = data_dir.join(AB3P_BINARY_NAME);
        let word_data_dir = data_dir.join("word_data");
        if binary.is_file() && word_data_dir.is_dir() {
            Some(Self::new(binary, word_data_dir))
        } else {
            debug!("Ab3P not found under {}", data_dir.display());
            None
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn write_inputs(&self, workdir: &Path, sentences: &[String]) -> std::io::Result<PathBuf> {
        let input_path = workdir.join(INPUT_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&input_path)?);
        for sentence in sentences {
            writeln!(writer, "{sentence}")?;
        }
        writer.flush()?;

        fs::write(
            workdir.join(PATH_FILE_NAME),
            format!("{}/\n", self.word_data_dir.display()),
        )?;

        Ok(input_path)
    }
}

impl AbbreviationResolver for Ab3pResolver {
    fn resolve(&self, sentences: &[String]) -> Result<AbbreviationMap, AbbreviationError> {
        if sentences.is_empty() {
            return Ok(AbbreviationMap::new());
        }

        // The path file has to sit in the tool's working directory, so each
        // run gets a scratch directory of its own.
        let workdir = tempfile::tempdir()?;
        let input_path = self.write_inputs(workdir.path(), sentences)?;

        debug!(
            "Running {} on {} sentences",
            self.binary.display(),
            sentences.len()
        );
        let output = Command::new(&self.binary)
            .arg(&input_path)
            .current_dir(workdir.path())
            .output()
            .map_err(|source| AbbreviationError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AbbreviationError::ExitStatus {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for (needle, meaning) in TOOL_DIAGNOSTICS {
            if stdout.contains(needle) {
                error!("Ab3P abbreviation resolution failed: {meaning}");
            }
        }

        let abbreviations = parse_ab3p_output(&stdout);
        debug!(
            "Ab3P found abbreviations in {} sentences",
            abbreviations.len()
        );
        Ok(abbreviations)
    }
}

/// Parse Ab3P output.
///
/// Ab3P echoes every input sentence and follows it with one
/// `short|long|precision` line per abbreviation found. A blank line ends
/// the current sentence.
pub fn parse_ab3p_output(output: &str) -> AbbreviationMap {
    let mut abbreviations = AbbreviationMap::new();
    let mut current_sentence: Option<&str> = None;

    for line in output.lines() {
        let fields: Vec<&str> = line.split('|').collect();
        if let [short_form, long_form, _precision] = fields.as_slice() {
            if let Some(sentence) = current_sentence {
                abbreviations.insert(sentence, short_form, long_form);
            }
        } else if !line.trim().is_empty() {
            current_sentence = Some(line);
        } else {
            current_sentence = None;
        }
    }

    abbreviations
}
