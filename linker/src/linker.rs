use crate::artifacts::resolve_sparse_artifacts;
use crate::config::LinkerConfig;
use crate::error::Result;
use crate::identifier::parse_concept_identifier;
use crate::resolve::{resolve_dictionary, resolve_model};
use bionel_dictionary::{Dictionary, DictionaryFile};
use bionel_document::{LinkingLabel, MentionSpan, Sentence, label_category};
use bionel_embeddings::{DenseEncoder, EmbeddingConfig, EmbeddingService};
use bionel_preprocess::{AB3P_BINARY_NAME, Ab3pResolver, AbbreviationPreprocessor, Preprocessor};
use bionel_retrieval::{
    DEFAULT_SPARSE_WEIGHT, EntityRetriever, ExactStringMatchRetriever, HybridRetriever,
    RetrievalConfig,
};
use log::{debug, info, warn};
use std::path::Path;

/// Links entity mentions in sentences to dictionary concepts
pub struct EntityLinker {
    retriever: EntityRetriever,
    preprocessor: Option<Preprocessor>,
}

impl EntityLinker {
    pub fn new(retriever: impl Into<EntityRetriever>, preprocessor: Option<Preprocessor>) -> Self {
        Self {
            retriever: retriever.into(),
            preprocessor,
        }
    }

    /// Build a linker from `config`, loading the dense encoder with fastembed
    pub fn load(config: LinkerConfig) -> Result<Self> {
        Self::load_with_encoder(config, |embedding_config| {
            let service = EmbeddingService::with_config(embedding_config)?;
            Ok(Box::new(service) as Box<dyn DenseEncoder>)
        })
    }

    /// Build a linker from `config` with a caller supplied dense encoder.
    ///
    /// `make_encoder` is only called for embedding-based models.
    pub fn load_with_encoder<F>(config: LinkerConfig, make_encoder: F) -> Result<Self>
    where
        F: FnOnce(EmbeddingConfig) -> Result<Box<dyn DenseEncoder>>,
    {
        config.check()?;
        let cache_root = config.cache_root();

        let model = resolve_model(&config)?;
        let location = resolve_dictionary(&config, &model, &cache_root)?;
        info!(
            "Loading linker for model {} with dictionary {}",
            model.id(),
            location.id
        );
        let dictionary = Dictionary::load(&DictionaryFile::with_id(&location.path, &location.id))?;
        let preprocessor = build_preprocessor(&config, &cache_root);

        let retriever: EntityRetriever = match model.embedding_source() {
            None => ExactStringMatchRetriever::new(&dictionary, Some(&preprocessor)).into(),
            Some(source) => {
                let dense_encoder = make_encoder(EmbeddingConfig {
                    model: source,
                    max_length: config.max_length,
                    ..Default::default()
                })?;

                let sparse = if config.hybrid_search {
                    Some(resolve_sparse_artifacts(
                        &config,
                        &model,
                        &cache_root,
                        &dictionary,
                        &preprocessor,
                    )?)
                } else {
                    None
                };

                let retrieval_config = RetrievalConfig {
                    hybrid_search: config.hybrid_search,
                    similarity_metric: config.similarity_metric,
                    sparse_weight: sparse
                        .as_ref()
                        .map_or(DEFAULT_SPARSE_WEIGHT, |artifacts| artifacts.sparse_weight),
                    index_batch_size: config.index_batch_size,
                };

                HybridRetriever::build(
                    retrieval_config,
                    dictionary,
                    &preprocessor,
                    dense_encoder,
                    sparse.map(|artifacts| artifacts.encoder),
                    &cache_root,
                )?
                .into()
            }
        };

        Ok(Self::new(retriever, Some(preprocessor)))
    }

    pub fn retriever(&self) -> &EntityRetriever {
        &self.retriever
    }

    /// Attach up to `top_k` linking labels to every mention of `entity_type`
    /// (every mention for `None`) in `sentences`.
    pub fn predict(
        &mut self,
        sentences: &mut [Sentence],
        entity_type: Option<&str>,
        top_k: usize,
    ) -> Result<()> {
        if let Some(preprocessor) = self.preprocessor.as_mut() {
            preprocessor.initialize(sentences);
        }

        let category = label_category(entity_type);
        let mut linked = 0usize;

        for sentence in sentences.iter_mut() {
            let spans: Vec<MentionSpan> = sentence.mentions(entity_type).cloned().collect();

            for span in spans {
                let mention = match &self.preprocessor {
                    Some(preprocessor) => preprocessor.process_mention(&span, sentence),
                    None => span.text.clone(),
                };

                let predictions = self.retriever.search(std::slice::from_ref(&mention), top_k)?;
                for candidate in predictions.into_iter().flatten() {
                    let Some(identifier) = candidate.concept_id.as_deref() else {
                        debug!("No concept found for mention '{mention}'");
                        continue;
                    };

                    let parsed = parse_concept_identifier(identifier);
                    sentence.add_label(
                        &category,
                        LinkingLabel {
                            span: span.clone(),
                            concept_id: parsed.concept_id,
                            concept_name: candidate.canonical_name,
                            additional_ids: parsed.additional_ids,
                            database: parsed.database,
                            score: candidate.score,
                        },
                    );
                    linked += 1;
                }
            }
        }

        debug!(
            "Attached {linked} labels under '{category}' across {} sentences",
            sentences.len()
        );
        Ok(())
    }
}

fn build_preprocessor(config: &LinkerConfig, cache_root: &Path) -> Preprocessor {
    let basic = Preprocessor::Basic(config.preprocessing.clone());
    if !config.abbreviation_resolution {
        return basic;
    }

    let resolver = match &config.ab3p_dir {
        Some(dir) => {
            let binary = dir.join(AB3P_BINARY_NAME);
            let word_data = dir.join("word_data");
            (binary.is_file() && word_data.is_dir())
                .then(|| Ab3pResolver::new(binary, word_data))
        }
        None => Ab3pResolver::locate(cache_root),
    };

    match resolver {
        Some(resolver) => {
            info!("Resolving abbreviations with {}", resolver.binary().display());
            Preprocessor::Abbreviation(AbbreviationPreprocessor::new(
                Box::new(resolver),
                Some(basic),
            ))
        }
        None => {
            warn!("Ab3P not found, linking without abbreviation resolution");
            basic
        }
    }
}
