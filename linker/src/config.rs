use crate::error::{LinkerError, Result};
use crate::registry;
use bionel_preprocess::BasicPreprocessor;
use bionel_vector_store::SimilarityMetric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the default cache root
pub const CACHE_ROOT_ENV_VAR: &str = "BIONEL_CACHE_ROOT";

const CACHE_DIR_NAME: &str = "bionel";

/// Configuration for [`crate::EntityLinker::load`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Pretrained model name, entity type, local model directory or
    /// `exact-string-match`
    pub model: String,

    /// Packaged dictionary name, entity type or path to a dictionary file.
    /// Inferred from `model` when unset.
    #[serde(default)]
    pub dictionary: Option<String>,

    /// Fuse sparse lexical scores into the dense ranking
    #[serde(default = "default_true")]
    pub hybrid_search: bool,

    #[serde(default)]
    pub similarity_metric: SimilarityMetric,

    /// Maximal number of tokens per mention or name fed to the encoder
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Names per encoder call while indexing the dictionary
    #[serde(default = "default_index_batch_size")]
    pub index_batch_size: usize,

    /// Overrides the weight persisted with the sparse encoder
    #[serde(default)]
    pub sparse_weight: Option<f32>,

    /// Fit a sparse encoder on the dictionary when the model ships none
    #[serde(default)]
    pub default_sparse_encoder: bool,

    /// Expand abbreviations defined in the mention's sentence (needs Ab3P)
    #[serde(default = "default_true")]
    pub abbreviation_resolution: bool,

    /// Directory holding the Ab3P executable and its `word_data/`.
    /// Defaults to `<cache_root>/ab3p`.
    #[serde(default)]
    pub ab3p_dir: Option<PathBuf>,

    #[serde(default)]
    pub preprocessing: BasicPreprocessor,

    /// Where datasets, embedding bundles and model artifacts live
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_max_length() -> usize {
    bionel_embeddings::DEFAULT_MAX_LENGTH
}

fn default_index_batch_size() -> usize {
    bionel_embeddings::DEFAULT_BATCH_SIZE
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            model: registry::DENSE_MODEL.to_string(),
            dictionary: None,
            hybrid_search: true,
            similarity_metric: SimilarityMetric::default(),
            max_length: default_max_length(),
            index_batch_size: default_index_batch_size(),
            sparse_weight: None,
            default_sparse_encoder: false,
            abbreviation_resolution: true,
            ab3p_dir: None,
            preprocessing: BasicPreprocessor::default(),
            cache_root: None,
        }
    }
}

impl LinkerConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Pretrained setup for one of [`registry::ENTITY_TYPES`]
    pub fn for_entity_type(entity_type: &str) -> Self {
        Self::new(entity_type)
    }

    /// Exact string matching against `dictionary`
    pub fn exact_match(dictionary: impl Into<String>) -> Self {
        Self {
            dictionary: Some(dictionary.into()),
            hybrid_search: false,
            ..Self::new(registry::EXACT_STRING_MATCH)
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }

        if let Some(weight) = self.sparse_weight {
            if !(0.0..=1.0).contains(&weight) {
                return Err(format!("sparse_weight must be in [0.0, 1.0], got {weight}"));
            }
        }

        if self.max_length == 0 {
            return Err("max_length must be > 0".to_string());
        }

        if self.index_batch_size == 0 {
            return Err("index_batch_size must be > 0".to_string());
        }

        Ok(())
    }

    /// Cache root: config value, then `BIONEL_CACHE_ROOT`, then the
    /// platform cache directory
    pub fn cache_root(&self) -> PathBuf {
        if let Some(root) = &self.cache_root {
            return root.clone();
        }
        if let Some(root) = std::env::var_os(CACHE_ROOT_ENV_VAR) {
            return PathBuf::from(root);
        }
        dirs::cache_dir()
            .map(|dir| dir.join(CACHE_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{CACHE_DIR_NAME}")))
    }

    pub(crate) fn check(&self) -> Result<()> {
        self.validate().map_err(LinkerError::Config)
    }
}
