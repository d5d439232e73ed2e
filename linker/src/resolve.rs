//! Mapping of user-facing model and dictionary names to concrete resources.

use crate::config::LinkerConfig;
use crate::error::{LinkerError, Result};
use crate::registry;
use bionel_embeddings::EmbeddingModelSource;
use bionel_vector_store::DATASETS_DIR;
use std::path::{Path, PathBuf};

/// File holding a packaged dictionary inside its dataset directory
pub const DICTIONARY_FILE_NAME: &str = "dictionary.txt";

/// Retrieval model selected by a [`LinkerConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Dictionary lookup of the preprocessed mention, no encoder
    ExactMatch,

    /// A published model; `hybrid` models were trained with a sparse encoder
    Pretrained { repo: String, hybrid: bool },

    /// A model directory on disk
    Local { path: PathBuf },
}

impl ModelSource {
    /// Identifier used for cache keys and artifact directories
    pub fn id(&self) -> String {
        match self {
            ModelSource::ExactMatch => registry::EXACT_STRING_MATCH.to_string(),
            ModelSource::Pretrained { repo, .. } => repo.clone(),
            ModelSource::Local { path } => path.display().to_string(),
        }
    }

    /// Where the dense encoder weights come from; `None` for exact matching
    pub fn embedding_source(&self) -> Option<EmbeddingModelSource> {
        match self {
            ModelSource::ExactMatch => None,
            ModelSource::Pretrained { repo, .. } => {
                Some(EmbeddingModelSource::HuggingFace { repo: repo.clone() })
            }
            ModelSource::Local { path } => {
                Some(EmbeddingModelSource::LocalDir { path: path.clone() })
            }
        }
    }
}

/// A dictionary file together with the id its embeddings are cached under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLocation {
    pub id: String,
    pub path: PathBuf,
}

/// Resolve `config.model`
pub fn resolve_model(config: &LinkerConfig) -> Result<ModelSource> {
    let model = config.model.trim();

    if model.eq_ignore_ascii_case(registry::EXACT_STRING_MATCH) {
        return Ok(ModelSource::ExactMatch);
    }

    let path = Path::new(model);
    if path.is_dir() {
        return Ok(ModelSource::Local {
            path: path.to_path_buf(),
        });
    }

    // registry names are lowercase
    let name = model.to_ascii_lowercase();

    if let Some(dense_repo) = registry::dense_model_for(&name) {
        let dense = ModelSource::Pretrained {
            repo: dense_repo.to_string(),
            hybrid: false,
        };
        if !config.hybrid_search {
            return Ok(dense);
        }
        if let Some(repo) = registry::hybrid_model_for(&name) {
            return Ok(ModelSource::Pretrained {
                repo: repo.to_string(),
                hybrid: true,
            });
        }
        return if config.default_sparse_encoder {
            Ok(dense)
        } else {
            Err(LinkerError::Config(format!(
                "no hybrid model is trained for entity type '{model}'; set \
                 default_sparse_encoder = true or disable hybrid_search"
            )))
        };
    }

    if registry::is_hybrid_model(&name) {
        return Ok(ModelSource::Pretrained {
            repo: registry::hybrid_model_repo(&name),
            hybrid: true,
        });
    }

    if registry::DENSE_MODELS
        .iter()
        .any(|dense| dense.eq_ignore_ascii_case(model))
    {
        if config.hybrid_search && !config.default_sparse_encoder {
            return Err(LinkerError::Config(format!(
                "model '{model}' was not trained for hybrid search; set \
                 default_sparse_encoder = true or disable hybrid_search"
            )));
        }
        return Ok(dense_model());
    }

    Err(LinkerError::Config(format!(
        "unknown model '{model}'; expected a local model directory, one of the \
         entity types [{}] or one of the models [{}]",
        registry::ENTITY_TYPES.join(", "),
        registry::model_names().collect::<Vec<_>>().join(", ")
    )))
}

fn dense_model() -> ModelSource {
    ModelSource::Pretrained {
        repo: registry::DENSE_MODEL.to_string(),
        hybrid: false,
    }
}

/// Resolve `config.dictionary`, inferring it from the model when unset
pub fn resolve_dictionary(
    config: &LinkerConfig,
    model: &ModelSource,
    cache_root: &Path,
) -> Result<DictionaryLocation> {
    let name = match config.dictionary.as_deref().map(str::trim) {
        Some(dictionary) => {
            let lowercase = dictionary.to_ascii_lowercase();
            if let Some(packaged) = registry::dictionary_for_entity_type(&lowercase) {
                packaged
            } else if let Some(packaged) = registry::packaged_dictionary(&lowercase) {
                packaged
            } else if Path::new(dictionary).is_file() {
                return Ok(DictionaryLocation {
                    id: dictionary.to_string(),
                    path: PathBuf::from(dictionary),
                });
            } else {
                return Err(LinkerError::Config(format!(
                    "unknown dictionary '{dictionary}'; expected a dictionary file, one \
                     of the entity types [{}] or one of the dictionaries [{}]",
                    registry::ENTITY_TYPES.join(", "),
                    registry::DICTIONARIES.join(", ")
                )));
            }
        }
        None => infer_dictionary(config, model)?,
    };

    let path = packaged_dictionary_path(cache_root, name);
    if !path.is_file() {
        return Err(LinkerError::MissingResource {
            what: format!("dictionary '{name}'"),
            path,
        });
    }

    Ok(DictionaryLocation {
        id: name.to_string(),
        path,
    })
}

fn infer_dictionary(config: &LinkerConfig, model: &ModelSource) -> Result<&'static str> {
    let model_name = config.model.trim();
    let lowercase = model_name.to_ascii_lowercase();
    let inferred = match model {
        ModelSource::ExactMatch => {
            return Err(LinkerError::Config(format!(
                "{} needs a dictionary; set one of the entity types [{}], one of the \
                 dictionaries [{}] or a dictionary file",
                registry::EXACT_STRING_MATCH,
                registry::ENTITY_TYPES.join(", "),
                registry::DICTIONARIES.join(", ")
            )));
        }
        ModelSource::Pretrained { repo, .. } => registry::dictionary_for_entity_type(&lowercase)
            .or_else(|| registry::dictionary_for_model(repo)),
        ModelSource::Local { .. } => None,
    };

    inferred.ok_or_else(|| {
        LinkerError::Config(format!(
            "no dictionary is known for model '{model_name}'; set dictionary to one of \
             [{}] or to a dictionary file",
            registry::DICTIONARIES.join(", ")
        ))
    })
}

/// `<cache_root>/datasets/<name>/dictionary.txt`
pub fn packaged_dictionary_path(cache_root: &Path, name: &str) -> PathBuf {
    cache_root
        .join(DATASETS_DIR)
        .join(name)
        .join(DICTIONARY_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config(model: &str) -> LinkerConfig {
        LinkerConfig::new(model)
    }

    fn install_dictionary(cache_root: &Path, name: &str) -> PathBuf {
        let path = packaged_dictionary_path(cache_root, name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "MESH:D007251||influenza\n").unwrap();
        path
    }

    #[test]
    fn test_entity_type_selects_hybrid_model() {
        assert_eq!(
            resolve_model(&config("disease")).unwrap(),
            ModelSource::Pretrained {
                repo: "dmis-lab/biosyn-sapbert-bc5cdr-disease".to_string(),
                hybrid: true,
            }
        );
    }

    #[test]
    fn test_entity_type_without_hybrid_model() {
        let err = resolve_model(&config("species")).unwrap_err();
        assert!(err.to_string().contains("default_sparse_encoder"));

        let mut with_default = config("species");
        with_default.default_sparse_encoder = true;
        assert_eq!(resolve_model(&with_default).unwrap(), dense_model());
    }

    #[test]
    fn test_dense_only_uses_dense_model() {
        let mut dense = config("chemical");
        dense.hybrid_search = false;
        assert_eq!(resolve_model(&dense).unwrap(), dense_model());
    }

    #[test]
    fn test_short_hybrid_model_name_gets_organisation() {
        assert_eq!(
            resolve_model(&config("biosyn-biobert-bc2gn")).unwrap(),
            ModelSource::Pretrained {
                repo: "dmis-lab/biosyn-biobert-bc2gn".to_string(),
                hybrid: true,
            }
        );
    }

    #[test]
    fn test_dense_model_needs_sparse_encoder_for_hybrid() {
        assert!(resolve_model(&config(registry::DENSE_MODEL)).is_err());

        let mut dense = config(registry::DENSE_MODEL);
        dense.hybrid_search = false;
        assert_eq!(resolve_model(&dense).unwrap(), dense_model());
    }

    #[test]
    fn test_registry_names_ignore_case() {
        assert_eq!(
            resolve_model(&config("Disease")).unwrap(),
            resolve_model(&config("disease")).unwrap()
        );
        assert_eq!(
            resolve_model(&config("BIOSYN-SAPBERT-BC2GN")).unwrap(),
            ModelSource::Pretrained {
                repo: "dmis-lab/biosyn-sapbert-bc2gn".to_string(),
                hybrid: true,
            }
        );

        let temp_dir = TempDir::new().unwrap();
        install_dictionary(temp_dir.path(), "ctd-disease");
        install_dictionary(temp_dir.path(), "ncbi-gene");

        let disease = config("Disease");
        let model = resolve_model(&disease).unwrap();
        let location = resolve_dictionary(&disease, &model, temp_dir.path()).unwrap();
        assert_eq!(location.id, "ctd-disease");

        let exact = LinkerConfig::exact_match("NCBI-Gene");
        let location =
            resolve_dictionary(&exact, &ModelSource::ExactMatch, temp_dir.path()).unwrap();
        assert_eq!(location.id, "ncbi-gene");
    }

    #[test]
    fn test_unknown_model_lists_choices() {
        let message = resolve_model(&config("bert-base-uncased"))
            .unwrap_err()
            .to_string();
        assert!(message.contains("bert-base-uncased"));
        assert!(message.contains("species"));
        assert!(message.contains("exact-string-match"));
        assert!(message.contains("biosyn-sapbert-bc2gn"));
    }

    #[test]
    fn test_local_model_directory() {
        let temp_dir = TempDir::new().unwrap();
        let local = config(temp_dir.path().to_str().unwrap());
        assert_eq!(
            resolve_model(&local).unwrap(),
            ModelSource::Local {
                path: temp_dir.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_dictionary_inferred_from_entity_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = install_dictionary(temp_dir.path(), "ncbi-gene");

        let gene = config("gene");
        let model = resolve_model(&gene).unwrap();
        let location = resolve_dictionary(&gene, &model, temp_dir.path()).unwrap();
        assert_eq!(
            location,
            DictionaryLocation {
                id: "ncbi-gene".to_string(),
                path,
            }
        );
    }

    #[test]
    fn test_dictionary_inferred_from_model() {
        let temp_dir = TempDir::new().unwrap();
        install_dictionary(temp_dir.path(), "ctd-disease");

        let biobert = config("biosyn-biobert-bc5cdr-disease");
        let model = resolve_model(&biobert).unwrap();
        let location = resolve_dictionary(&biobert, &model, temp_dir.path()).unwrap();
        assert_eq!(location.id, "ctd-disease");
    }

    #[test]
    fn test_explicit_dictionary_forms() {
        let temp_dir = TempDir::new().unwrap();
        install_dictionary(temp_dir.path(), "ctd-chemical");
        let local = temp_dir.path().join("custom.txt");
        std::fs::write(&local, "C1||aspirin\n").unwrap();

        let mut exact = LinkerConfig::exact_match("chemical");
        let location =
            resolve_dictionary(&exact, &ModelSource::ExactMatch, temp_dir.path()).unwrap();
        assert_eq!(location.id, "ctd-chemical");

        exact.dictionary = Some(local.display().to_string());
        let location =
            resolve_dictionary(&exact, &ModelSource::ExactMatch, temp_dir.path()).unwrap();
        assert_eq!(location.path, local);
    }

    #[test]
    fn test_unknown_dictionary_lists_choices() {
        let temp_dir = TempDir::new().unwrap();
        let exact = LinkerConfig::exact_match("umls");
        let message = resolve_dictionary(&exact, &ModelSource::ExactMatch, temp_dir.path())
            .unwrap_err()
            .to_string();
        assert!(message.contains("umls"));
        assert!(message.contains("ncbi-taxonomy"));
    }

    #[test]
    fn test_exact_match_requires_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let exact = config("exact-string-match");
        let model = resolve_model(&exact).unwrap();
        assert_eq!(model, ModelSource::ExactMatch);
        assert!(matches!(
            resolve_dictionary(&exact, &model, temp_dir.path()),
            Err(LinkerError::Config(_))
        ));
    }

    #[test]
    fn test_missing_packaged_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let disease = config("disease");
        let model = resolve_model(&disease).unwrap();
        let err = resolve_dictionary(&disease, &model, temp_dir.path()).unwrap_err();
        assert!(matches!(err, LinkerError::MissingResource { .. }));
    }

    #[test]
    fn test_local_model_needs_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let local = ModelSource::Local {
            path: temp_dir.path().to_path_buf(),
        };
        let config = config(temp_dir.path().to_str().unwrap());
        assert!(matches!(
            resolve_dictionary(&config, &local, temp_dir.path()),
            Err(LinkerError::Config(_))
        ));
    }
}
