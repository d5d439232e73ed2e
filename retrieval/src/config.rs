use bionel_vector_store::SimilarityMetric;
use serde::{Deserialize, Serialize};

/// Fusion weight used when a sparse encoder is fitted on the fly
pub const DEFAULT_SPARSE_WEIGHT: f32 = 0.5;

/// Configuration for hybrid retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Fuse sparse lexical scores into the dense ranking
    #[serde(default = "default_true")]
    pub hybrid_search: bool,

    /// Similarity used for both dense and sparse search
    #[serde(default)]
    pub similarity_metric: SimilarityMetric,

    /// Weight of sparse scores during fusion (0.0 - 1.0)
    #[serde(default = "default_sparse_weight")]
    pub sparse_weight: f32,

    /// Names per dense encoder call while indexing the dictionary
    #[serde(default = "default_index_batch_size")]
    pub index_batch_size: usize,
}

fn default_true() -> bool {
    true
}

fn default_sparse_weight() -> f32 {
    DEFAULT_SPARSE_WEIGHT
}

fn default_index_batch_size() -> usize {
    bionel_embeddings::DEFAULT_BATCH_SIZE
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            hybrid_search: true,
            similarity_metric: SimilarityMetric::default(),
            sparse_weight: default_sparse_weight(),
            index_batch_size: default_index_batch_size(),
        }
    }
}

impl RetrievalConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.sparse_weight) {
            return Err(format!(
                "sparse_weight must be in [0.0, 1.0], got {}",
                self.sparse_weight
            ));
        }

        if self.index_batch_size == 0 {
            return Err("index_batch_size must be > 0".to_string());
        }

        Ok(())
    }

    /// Dense similarity only
    pub fn dense_only() -> Self {
        Self {
            hybrid_search: false,
            ..Default::default()
        }
    }

    /// Dense plus sparse with the given fusion weight
    pub fn hybrid(sparse_weight: f32) -> Self {
        Self {
            hybrid_search: true,
            sparse_weight,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_metric, SimilarityMetric::Cosine);
    }

    #[test]
    fn test_weight_validation() {
        let mut config = RetrievalConfig::default();
        config.sparse_weight = 1.0;
        assert!(config.validate().is_ok());

        config.sparse_weight = 1.1;
        assert!(config.validate().is_err());

        config.sparse_weight = -0.1;
        assert!(config.validate().is_err());

        config.sparse_weight = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_size_validation() {
        let mut config = RetrievalConfig::default();
        config.index_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_configs() {
        assert!(RetrievalConfig::dense_only().validate().is_ok());
        assert!(!RetrievalConfig::dense_only().hybrid_search);
        assert!(RetrievalConfig::hybrid(0.3).validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RetrievalConfig =
            serde_json::from_str(r#"{"similarity_metric": "inner_product"}"#).unwrap();
        assert_eq!(config.similarity_metric, SimilarityMetric::InnerProduct);
        assert!(config.hybrid_search);
        assert_eq!(config.sparse_weight, DEFAULT_SPARSE_WEIGHT);
    }
}
