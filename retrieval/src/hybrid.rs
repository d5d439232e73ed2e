use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::fusion::fuse_candidates;
use bionel_dictionary::Dictionary;
use bionel_document::{Candidate, PredictionSet};
use bionel_embeddings::{CharNgramVectorizer, DenseEncoder};
use bionel_preprocess::Preprocessor;
use bionel_vector_store::{DenseMatrix, DictionaryIndex, IndexRequest, SimilarityMetric, top_k};
use log::{debug, info};
use std::path::Path;

/// Dense nearest-neighbour search, optionally fused with sparse lexical
/// search, over a [`DictionaryIndex`].
pub struct HybridRetriever {
    config: RetrievalConfig,
    index: DictionaryIndex,
    dense_encoder: Box<dyn DenseEncoder>,
    sparse_encoder: Option<CharNgramVectorizer>,
}

impl HybridRetriever {
    /// Wrap an already built index
    pub fn new(
        config: RetrievalConfig,
        index: DictionaryIndex,
        dense_encoder: Box<dyn DenseEncoder>,
        sparse_encoder: Option<CharNgramVectorizer>,
    ) -> Result<Self> {
        config.validate().map_err(RetrievalError::InvalidConfig)?;

        if config.hybrid_search {
            let encoder = sparse_encoder.as_ref().ok_or_else(|| {
                RetrievalError::SparseUnavailable(
                    "hybrid search needs a sparse encoder".to_string(),
                )
            })?;
            let matrix = index.sparse_matrix().ok_or_else(|| {
                RetrievalError::SparseUnavailable("index has no sparse embeddings".to_string())
            })?;
            if matrix.n_cols() != encoder.vocabulary_len() {
                return Err(RetrievalError::SparseUnavailable(format!(
                    "index vocabulary has {} features, encoder has {}",
                    matrix.n_cols(),
                    encoder.vocabulary_len()
                )));
            }
        }

        Ok(Self {
            config,
            index,
            dense_encoder,
            sparse_encoder,
        })
    }

    /// Build (or load from `cache_root`) the dictionary index and wrap it
    pub fn build(
        config: RetrievalConfig,
        dictionary: Dictionary,
        preprocessor: &Preprocessor,
        dense_encoder: Box<dyn DenseEncoder>,
        sparse_encoder: Option<CharNgramVectorizer>,
        cache_root: &Path,
    ) -> Result<Self> {
        config.validate().map_err(RetrievalError::InvalidConfig)?;

        let request = IndexRequest {
            metric: config.similarity_metric,
            batch_size: config.index_batch_size,
            ..IndexRequest::new(cache_root)
        };
        let sparse_for_index = if config.hybrid_search {
            sparse_encoder.as_ref()
        } else {
            None
        };

        info!(
            "Building {} retriever over {} ({} entries)",
            if config.hybrid_search { "hybrid" } else { "dense" },
            dictionary.id(),
            dictionary.len()
        );
        let index = DictionaryIndex::build_or_load(
            &request,
            dictionary,
            preprocessor,
            dense_encoder.as_ref(),
            sparse_for_index,
        )?;

        Self::new(config, index, dense_encoder, sparse_encoder)
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn index(&self) -> &DictionaryIndex {
        &self.index
    }

    /// Dense top-k `(row, score)` per mention, best first
    pub fn search_dense(
        &self,
        mentions: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<(usize, f32)>>> {
        let embeddings = self
            .dense_encoder
            .embed(mentions, self.config.index_batch_size, None)?;
        let mut queries = DenseMatrix::from_rows(self.dense_encoder.dimension(), embeddings)?;
        if self.config.similarity_metric == SimilarityMetric::Cosine {
            queries.l2_normalize_rows();
        }

        Ok(self.index.dense_index().search(&queries, top_k)?)
    }

    /// Sparse top-k `(row, score)` per mention, best first.
    ///
    /// With `normalize`, scores of the whole batch are min-max rescaled to
    /// `[0, 1]` before selection.
    pub fn search_sparse(
        &self,
        mentions: &[String],
        top_k_per_mention: usize,
        normalize: bool,
    ) -> Result<Vec<Vec<(usize, f32)>>> {
        let (encoder, index) = match (&self.sparse_encoder, self.index.sparse_index()) {
            (Some(encoder), Some(index)) => (encoder, index),
            _ => {
                return Err(RetrievalError::SparseUnavailable(
                    "no sparse encoder or sparse embeddings loaded".to_string(),
                ));
            }
        };

        let queries = encoder.transform(mentions);
        let mut scores = index.scores(&queries, self.config.similarity_metric)?;
        if normalize {
            min_max_normalize(&mut scores);
        }

        Ok(scores
            .iter()
            .map(|row_scores| top_k(row_scores, top_k_per_mention))
            .collect())
    }

    /// Top-k dictionary candidates per mention
    pub fn search(&self, mentions: &[String], top_k: usize) -> Result<Vec<PredictionSet>> {
        let dense = self.search_dense(mentions, top_k)?;

        let ranked = if self.config.hybrid_search {
            let sparse = self.search_sparse(mentions, top_k, false)?;
            dense
                .iter()
                .zip(&sparse)
                .map(|(dense, sparse)| {
                    fuse_candidates(dense, sparse, self.config.sparse_weight, top_k)
                })
                .collect()
        } else {
            dense
        };

        debug!("Ranked candidates for {} mentions", mentions.len());
        ranked
            .into_iter()
            .map(|candidates| self.to_prediction_set(candidates))
            .collect()
    }

    fn to_prediction_set(&self, candidates: Vec<(usize, f32)>) -> Result<PredictionSet> {
        candidates
            .into_iter()
            .map(|(row, score)| {
                let entry = self.index.entry(row).ok_or(RetrievalError::RowOutOfRange {
                    row,
                    len: self.index.len(),
                })?;
                Ok(Candidate::new(
                    entry.canonical_name.clone(),
                    entry.concept_id.clone(),
                    score,
                ))
            })
            .collect()
    }
}

/// Rescale every score to `[0, 1]` using the minimum and maximum over the
/// whole matrix. A constant matrix becomes all zeros.
fn min_max_normalize(scores: &mut [Vec<f32>]) {
    let (min, max) = scores
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &score| {
            (min.min(score), max.max(score))
        });

    let range = max - min;
    for score in scores.iter_mut().flatten() {
        *score = if range > 0.0 { (*score - min) / range } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bionel_dictionary::DictionaryEntry;
    use bionel_embeddings::EmbeddingError;
    use bionel_preprocess::BasicPreprocessor;
    use pretty_assertions::assert_eq;

    /// Bag of vowels, so names sharing vowels land close together
    struct VowelEncoder;

    impl DenseEncoder for VowelEncoder {
        fn model_id(&self) -> &str {
            "test/vowels"
        }

        fn dimension(&self) -> usize {
            5
        }

        fn embed_batch(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut vector = vec![0.0; 5];
                    for c in text.chars() {
                        if let Some(i) = "aeiou".find(c) {
                            vector[i] += 1.0;
                        }
                    }
                    vector
                })
                .collect())
        }
    }

    const NAMES: [(&str, &str); 5] = [
        ("MESH:D007251", "influenza"),
        ("MESH:D006973", "hypertension"),
        ("MESH:D009369", "neoplasms"),
        ("MESH:D003920", "diabetes mellitus"),
        ("MESH:D001249", "asthma"),
    ];

    fn dictionary() -> Dictionary {
        Dictionary::from_entries(
            "test-diseases",
            NAMES
                .iter()
                .map(|(id, name)| DictionaryEntry::new(*id, *name))
                .collect(),
        )
    }

    fn retriever(config: RetrievalConfig, cache_root: &Path) -> HybridRetriever {
        let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
        let names: Vec<&str> = NAMES.iter().map(|(_, name)| *name).collect();
        let sparse = CharNgramVectorizer::fit(&names);
        HybridRetriever::build(
            config,
            dictionary(),
            &preprocessor,
            Box::new(VowelEncoder),
            Some(sparse),
            cache_root,
        )
        .unwrap()
    }

    fn mentions(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_sparse_top_k_matches_brute_force() {
        let temp_dir = tempfile::tempdir().unwrap();
        let retriever = retriever(RetrievalConfig::default(), temp_dir.path());
        let queries = mentions(&["influenza a", "hypertensive", "diabetes", "xyz"]);

        let encoder = retriever.sparse_encoder.as_ref().unwrap();
        let full = retriever
            .index
            .sparse_index()
            .unwrap()
            .scores(&encoder.transform(&queries), SimilarityMetric::Cosine)
            .unwrap();

        for k in 0..=NAMES.len() {
            let results = retriever.search_sparse(&queries, k, false).unwrap();
            for (row_scores, result) in full.iter().zip(&results) {
                let mut expected: Vec<f32> = row_scores.clone();
                expected.sort_by(|a, b| b.total_cmp(a));
                expected.truncate(k);
                let scores: Vec<f32> = result.iter().map(|(_, score)| *score).collect();
                assert_eq!(scores, expected, "k = {k}");
            }
        }
    }

    #[test]
    fn test_sparse_normalization() {
        let temp_dir = tempfile::tempdir().unwrap();
        let retriever = retriever(RetrievalConfig::default(), temp_dir.path());

        let results = retriever
            .search_sparse(&mentions(&["asthma", "neoplasm"]), NAMES.len(), true)
            .unwrap();

        let all: Vec<f32> = results.iter().flatten().map(|(_, s)| *s).collect();
        assert!(all.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(all.contains(&1.0));
        assert!(all.contains(&0.0));
        assert_eq!(results[0][0].0, 4);
    }

    #[test]
    fn test_min_max_constant_matrix() {
        let mut scores = vec![vec![0.3, 0.3], vec![0.3]];
        min_max_normalize(&mut scores);
        assert_eq!(scores, vec![vec![0.0, 0.0], vec![0.0]]);
    }

    #[test]
    fn test_dense_only_search() {
        let temp_dir = tempfile::tempdir().unwrap();
        let retriever = retriever(RetrievalConfig::dense_only(), temp_dir.path());

        let results = retriever.search(&mentions(&["influenza"]), 2).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[0][0].concept_id.as_deref(), Some("MESH:D007251"));
        assert!((results[0][0].score - 1.0).abs() < 1e-6);
        assert!(results[0][0].score >= results[0][1].score);
    }

    #[test]
    fn test_hybrid_scores_accumulate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let retriever = retriever(RetrievalConfig::hybrid(0.5), temp_dir.path());

        // Both sides rank the exact name first, so its scores add up.
        let results = retriever.search(&mentions(&["asthma"]), 3).unwrap();

        assert_eq!(results[0][0].canonical_name, "asthma");
        assert!(results[0][0].score > 1.0);
        assert!(results[0].len() <= 3);
        for pair in results[0].windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_top_k_clamped_to_dictionary_size() {
        let temp_dir = tempfile::tempdir().unwrap();
        let retriever = retriever(RetrievalConfig::default(), temp_dir.path());

        let results = retriever.search(&mentions(&["influenza"]), 50).unwrap();
        assert_eq!(results[0].len(), NAMES.len());
    }

    #[test]
    fn test_hybrid_without_sparse_encoder_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
        let result = HybridRetriever::build(
            RetrievalConfig::default(),
            dictionary(),
            &preprocessor,
            Box::new(VowelEncoder),
            None,
            temp_dir.path(),
        );
        assert!(matches!(result, Err(RetrievalError::SparseUnavailable(_))));
    }

    #[test]
    fn test_dense_only_retriever_rejects_sparse_search() {
        let temp_dir = tempfile::tempdir().unwrap();
        let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
        let retriever = HybridRetriever::build(
            RetrievalConfig::dense_only(),
            dictionary(),
            &preprocessor,
            Box::new(VowelEncoder),
            None,
            temp_dir.path(),
        )
        .unwrap();

        assert!(matches!(
            retriever.search_sparse(&mentions(&["asthma"]), 1, false),
            Err(RetrievalError::SparseUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
        let result = HybridRetriever::build(
            RetrievalConfig::hybrid(2.0),
            dictionary(),
            &preprocessor,
            Box::new(VowelEncoder),
            None,
            temp_dir.path(),
        );
        assert!(matches!(result, Err(RetrievalError::InvalidConfig(_))));
    }
}
