//! Sparse encoder artifacts shipped with (or fitted for) a hybrid model.

use crate::config::LinkerConfig;
use crate::error::{LinkerError, Result};
use crate::resolve::ModelSource;
use bionel_dictionary::Dictionary;
use bionel_embeddings::CharNgramVectorizer;
use bionel_preprocess::Preprocessor;
use bionel_retrieval::DEFAULT_SPARSE_WEIGHT;
use hf_hub::api::sync::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SPARSE_ENCODER_FILE: &str = "sparse_encoder.bin";
pub const SPARSE_WEIGHT_FILE: &str = "sparse_weight.json";

const MODELS_DIR: &str = "models";
const FITTED_DIR: &str = "fitted";

#[derive(Debug, Serialize, Deserialize)]
struct SparseWeightFile {
    sparse_weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dictionary_fingerprint: Option<String>,
}

/// A fitted sparse encoder and its fusion weight
#[derive(Debug, Clone)]
pub struct SparseArtifacts {
    pub encoder: CharNgramVectorizer,
    pub sparse_weight: f32,
    /// Dictionary the encoder was fitted on, for default encoders
    pub dictionary_fingerprint: Option<String>,
}

impl SparseArtifacts {
    /// Fit an encoder on `names`
    pub fn fit<S: AsRef<str>>(names: &[S], sparse_weight: f32) -> Self {
        Self {
            encoder: CharNgramVectorizer::fit(names),
            sparse_weight,
            dictionary_fingerprint: None,
        }
    }

    /// Load both artifact files from `dir`; `None` when either is absent
    pub fn load_dir(dir: &Path) -> Result<Option<Self>> {
        let encoder_path = dir.join(SPARSE_ENCODER_FILE);
        let weight_path = dir.join(SPARSE_WEIGHT_FILE);
        if !encoder_path.is_file() || !weight_path.is_file() {
            return Ok(None);
        }
        Self::load_files(&encoder_path, &weight_path).map(Some)
    }

    fn load_files(encoder_path: &Path, weight_path: &Path) -> Result<Self> {
        let encoder = CharNgramVectorizer::load_from_path(encoder_path)?;
        let weight: SparseWeightFile = serde_json::from_str(&fs::read_to_string(weight_path)?)?;
        Ok(Self {
            encoder,
            sparse_weight: weight.sparse_weight,
            dictionary_fingerprint: weight.dictionary_fingerprint,
        })
    }

    pub fn save_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        self.encoder.save_to_path(&dir.join(SPARSE_ENCODER_FILE))?;
        let weight = SparseWeightFile {
            sparse_weight: self.sparse_weight,
            dictionary_fingerprint: self.dictionary_fingerprint.clone(),
        };
        fs::write(
            dir.join(SPARSE_WEIGHT_FILE),
            serde_json::to_string_pretty(&weight)?,
        )?;
        Ok(())
    }
}

/// `<cache_root>/models/<model id>`, with path separators flattened
pub fn model_cache_dir(cache_root: &Path, model_id: &str) -> PathBuf {
    cache_root.join(MODELS_DIR).join(cache_key(model_id))
}

/// `<model cache dir>/fitted/<dictionary id>`: home of the default encoder
/// fitted for one dictionary
pub fn fitted_encoder_dir(cache_root: &Path, model_id: &str, dictionary_id: &str) -> PathBuf {
    model_cache_dir(cache_root, model_id)
        .join(FITTED_DIR)
        .join(cache_key(dictionary_id))
}

fn cache_key(id: &str) -> String {
    id.trim_matches(['/', '\\'])
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => c,
            _ => '_',
        })
        .collect()
}

/// Find the sparse encoder for `model`.
///
/// Looks in the local model directory, then the model cache directory.
/// With `default_sparse_encoder` set, an encoder previously fitted on the
/// same dictionary contents comes next. Then the model's Hugging Face
/// repository is tried. When none has it and `default_sparse_encoder` is
/// set, an encoder is fitted on the preprocessed dictionary names and
/// persisted under [`fitted_encoder_dir`].
/// An explicit `sparse_weight` in the config wins over the stored one.
pub fn resolve_sparse_artifacts(
    config: &LinkerConfig,
    model: &ModelSource,
    cache_root: &Path,
    dictionary: &Dictionary,
    preprocessor: &Preprocessor,
) -> Result<SparseArtifacts> {
    let cache_dir = model_cache_dir(cache_root, &model.id());
    let fitted_dir = fitted_encoder_dir(cache_root, &model.id(), dictionary.id());

    let mut found = match model {
        ModelSource::Local { path } => SparseArtifacts::load_dir(path)?,
        _ => None,
    };
    if found.is_none() {
        found = load_cached(&cache_dir);
    }
    if found.is_none() && config.default_sparse_encoder {
        found = load_cached(&fitted_dir).filter(|artifacts| {
            let current =
                artifacts.dictionary_fingerprint.as_deref() == Some(dictionary.fingerprint());
            if !current {
                info!(
                    "Dictionary {} changed since its sparse encoder was fitted; refitting",
                    dictionary.id()
                );
            }
            current
        });
    }
    if found.is_none() {
        if let ModelSource::Pretrained { repo, hybrid: true } = model {
            found = download(repo, &cache_dir);
        }
    }

    let mut artifacts = match found {
        Some(artifacts) => artifacts,
        None if config.default_sparse_encoder => {
            let names: Vec<String> = dictionary
                .names()
                .map(|name| preprocessor.process_entry(name))
                .collect();
            let mut artifacts = SparseArtifacts::fit(
                &names,
                config.sparse_weight.unwrap_or(DEFAULT_SPARSE_WEIGHT),
            );
            artifacts.dictionary_fingerprint = Some(dictionary.fingerprint().to_string());
            info!(
                "Fitted default sparse encoder on {} names ({} features)",
                names.len(),
                artifacts.encoder.vocabulary_len()
            );
            artifacts.save_dir(&fitted_dir)?;
            artifacts
        }
        None => {
            return Err(LinkerError::Config(format!(
                "model '{}' ships no sparse encoder; set default_sparse_encoder = true \
                 or disable hybrid_search",
                model.id()
            )));
        }
    };

    if let Some(weight) = config.sparse_weight {
        artifacts.sparse_weight = weight;
    }
    Ok(artifacts)
}

fn load_cached(dir: &Path) -> Option<SparseArtifacts> {
    match SparseArtifacts::load_dir(dir) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            warn!(
                "Ignoring unreadable sparse encoder in {}: {e}",
                dir.display()
            );
            None
        }
    }
}

fn download(repo: &str, cache_dir: &Path) -> Option<SparseArtifacts> {
    let fetch = || -> std::result::Result<SparseArtifacts, String> {
        let api = Api::new().map_err(|e| format!("hf-hub: {e}"))?;
        let repo_api = api.model(repo.to_string());
        let encoder_path = repo_api
            .get(SPARSE_ENCODER_FILE)
            .map_err(|e| format!("{SPARSE_ENCODER_FILE}: {e}"))?;
        let weight_path = repo_api
            .get(SPARSE_WEIGHT_FILE)
            .map_err(|e| format!("{SPARSE_WEIGHT_FILE}: {e}"))?;
        SparseArtifacts::load_files(&encoder_path, &weight_path).map_err(|e| format!("{repo}: {e}"))
    };

    match fetch() {
        Ok(artifacts) => {
            info!("Downloaded sparse encoder of {repo}");
            if let Err(e) = artifacts.save_dir(cache_dir) {
                warn!("Failed to cache sparse encoder of {repo}: {e}");
            }
            Some(artifacts)
        }
        Err(e) => {
            warn!("No sparse encoder available from {repo}: {e}");
            None
        }
    }
}
