use crate::encoder::DenseEncoder;
use crate::error::EmbeddingError;
use fastembed::{
    EmbeddingModel, InitOptions, InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles,
    UserDefinedEmbeddingModel,
};
use hf_hub::api::sync::Api;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of tokens per mention or concept name
pub const DEFAULT_MAX_LENGTH: usize = 25;

const ONNX_FILE: &str = "onnx/model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE: &str = "config.json";
const SPECIAL_TOKENS_MAP_FILE: &str = "special_tokens_map.json";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";

/// Configuration for the embedding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    pub model: EmbeddingModelSource,

    /// Maximal number of tokens fed to the model per text
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Truncate vectors to this many dimensions (Matryoshka models)
    #[serde(default)]
    pub dimension: Option<usize>,

    /// Show download progress when downloading models
    #[serde(default)]
    pub show_download_progress: bool,
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModelSource::Builtin(EmbeddingModelType::AllMiniLmL6V2),
            max_length: DEFAULT_MAX_LENGTH,
            dimension: None,
            show_download_progress: false,
        }
    }
}

impl EmbeddingConfig {
    /// Config for a Hugging Face repository exporting an ONNX model
    pub fn hugging_face(repo: impl Into<String>) -> Self {
        Self {
            model: EmbeddingModelSource::HuggingFace { repo: repo.into() },
            ..Default::default()
        }
    }
}

/// Models bundled with fastembed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EmbeddingModelType {
    /// All-MiniLM-L6-v2 (lightweight, faster)
    AllMiniLmL6V2,
    /// BGE-small-en-v1.5
    BgeSmallEnV15,
    /// Nomic-embed-text-v1.5
    NomicEmbedTextV15,
}

impl EmbeddingModelType {
    fn to_fastembed_model(self) -> EmbeddingModel {
        match self {
            EmbeddingModelType::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            EmbeddingModelType::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            EmbeddingModelType::NomicEmbedTextV15 => EmbeddingModel::NomicEmbedTextV15,
        }
    }

    fn id(self) -> &'static str {
        match self {
            EmbeddingModelType::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            EmbeddingModelType::BgeSmallEnV15 => "BAAI/bge-small-en-v1.5",
            EmbeddingModelType::NomicEmbedTextV15 => "nomic-ai/nomic-embed-text-v1.5",
        }
    }
}

/// Where the encoder weights come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmbeddingModelSource {
    /// A model fastembed knows how to fetch
    Builtin(EmbeddingModelType),

    /// A Hugging Face repository with an ONNX export (`onnx/model.onnx`)
    /// and tokenizer files; pooled on the CLS token like SapBERT/BioSyn.
    ///
    /// The SapBERT and BioSyn repositories publish PyTorch weights only,
    /// so loading them this way fails until an ONNX export is uploaded.
    /// Export the model locally and use [`EmbeddingModelSource::LocalDir`].
    HuggingFace { repo: String },

    /// A local directory laid out like such a repository, e.g. the output
    /// of `optimum-cli export onnx --model <repo> <dir>` with the ONNX file
    /// moved to `<dir>/onnx/model.onnx`
    LocalDir { path: PathBuf },
}

impl EmbeddingModelSource {
    /// Identifier used in cache keys
    pub fn id(&self) -> String {
        match self {
            EmbeddingModelSource::Builtin(model) => model.id().to_string(),
            EmbeddingModelSource::HuggingFace { repo } => repo.clone(),
            EmbeddingModelSource::LocalDir { path } => path.display().to_string(),
        }
    }
}

/// Dense encoder backed by an ONNX transformer via fastembed
pub struct EmbeddingService {
    model: TextEmbedding,
    config: EmbeddingConfig,
    model_id: String,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a new embedding service with default configuration
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_config(EmbeddingConfig::default())
    }

    /// Create a new embedding service with custom configuration
    pub fn with_config(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let model_id = config.model.id();
        info!(
            "Initializing embedding service with model {model_id}, max length {}",
            config.max_length
        );

        let model = match &config.model {
            EmbeddingModelSource::Builtin(model) => {
                let init_options = InitOptions::new(model.to_fastembed_model())
                    .with_max_length(config.max_length)
                    .with_show_download_progress(config.show_download_progress);
                TextEmbedding::try_new(init_options)
            }
            EmbeddingModelSource::HuggingFace { repo } => {
                let files = ModelFiles::download(repo)?;
                TextEmbedding::try_new_from_user_defined(
                    files.into_user_defined()?,
                    InitOptionsUserDefined::new().with_max_length(config.max_length),
                )
            }
            EmbeddingModelSource::LocalDir { path } => {
                let files = ModelFiles::local(path);
                TextEmbedding::try_new_from_user_defined(
                    files.into_user_defined()?,
                    InitOptionsUserDefined::new().with_max_length(config.max_length),
                )
            }
        }
        .map_err(|e| {
            EmbeddingError::ModelInitialization(format!("Failed to initialize model: {e}"))
        })?;

        // Probe once so the dimension is known before the first real batch.
        let probe = model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| EmbeddingError::ModelInitialization(e.to_string()))?;
        let native_dimension = probe.first().map(Vec::len).unwrap_or_default();
        let dimension = config
            .dimension
            .map_or(native_dimension, |target| target.min(native_dimension));

        info!("Embedding service initialized, dimension {dimension}");

        Ok(Self {
            model,
            config,
            model_id,
            dimension,
        })
    }

    /// Generate a single embedding for a text
    pub fn embed_single(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.embed_batch(&[text.to_string()])?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::EmbeddingGeneration("No embedding generated".into()))
    }

    /// Get the configuration of this service
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

impl DenseEncoder for EmbeddingService {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut embeddings = self
            .model
            .embed(text_refs, Some(texts.len()))
            .map_err(|e| EmbeddingError::EmbeddingGeneration(e.to_string()))?;

        for embedding in &mut embeddings {
            // Truncate to target dimension if needed (Matryoshka)
            embedding.truncate(self.dimension);
        }

        Ok(embeddings)
    }
}

/// Paths of the files making up a user-defined ONNX model
struct ModelFiles {
    onnx: PathBuf,
    tokenizer: PathBuf,
    config: PathBuf,
    special_tokens_map: PathBuf,
    tokenizer_config: PathBuf,
}

impl ModelFiles {
    fn local(dir: &Path) -> Self {
        Self {
            onnx: dir.join(ONNX_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            config: dir.join(CONFIG_FILE),
            special_tokens_map: dir.join(SPECIAL_TOKENS_MAP_FILE),
            tokenizer_config: dir.join(TOKENIZER_CONFIG_FILE),
        }
    }

    fn download(repo: &str) -> Result<Self, EmbeddingError> {
        let api = Api::new().map_err(|e| EmbeddingError::ModelNotFound(e.to_string()))?;
        let repo_api = api.model(repo.to_string());
        let get = |file: &str| {
            repo_api
                .get(file)
                .map_err(|e| EmbeddingError::ModelNotFound(format!("{repo}/{file}: {e}")))
        };

        Ok(Self {
            onnx: get(ONNX_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
            config: get(CONFIG_FILE)?,
            special_tokens_map: get(SPECIAL_TOKENS_MAP_FILE)?,
            tokenizer_config: get(TOKENIZER_CONFIG_FILE)?,
        })
    }

    fn into_user_defined(self) -> Result<UserDefinedEmbeddingModel, EmbeddingError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                EmbeddingError::ModelNotFound(format!("{}: {e}", path.display()))
            })
        };

        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read(&self.tokenizer)?,
            config_file: read(&self.config)?,
            special_tokens_map_file: read(&self.special_tokens_map)?,
            tokenizer_config_file: read(&self.tokenizer_config)?,
        };

        Ok(UserDefinedEmbeddingModel::new(read(&self.onnx)?, tokenizer_files)
            .with_pooling(Pooling::Cls))
    }
}
