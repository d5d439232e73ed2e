use crate::error::EmbeddingError;
use log::debug;
use std::sync::Arc;

/// Progress callback for batched embedding
pub type ProgressCallback = Arc<dyn Fn(EmbeddingProgress) + Send + Sync>;

/// Embedding progress information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingProgress {
    /// Texts embedded so far
    pub current: usize,
    pub total: usize,
}

/// A model mapping text to fixed-size dense vectors.
///
/// Implementations run inference only and never update model parameters.
pub trait DenseEncoder: Send + Sync {
    /// Identifier of the underlying model, used in cache keys
    fn model_id(&self) -> &str;

    /// Length of every produced vector
    fn dimension(&self) -> usize;

    /// Embed a single batch
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed `texts` in batches of `batch_size`, returning one vector per
    /// text in input order.
    fn embed(
        &self,
        texts: &[String],
        batch_size: usize,
        progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if batch_size == 0 {
            return Err(EmbeddingError::InvalidInput(
                "batch size must be > 0".to_string(),
            ));
        }

        let total = texts.len();
        let mut embeddings = Vec::with_capacity(total);

        for (batch_idx, batch) in texts.chunks(batch_size).enumerate() {
            debug!(
                "Embedding batch {}/{} ({} texts) with {}",
                batch_idx + 1,
                total.div_ceil(batch_size),
                batch.len(),
                self.model_id()
            );

            let vectors = self.embed_batch(batch)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::EmbeddingGeneration(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for vector in &vectors {
                if vector.len() != self.dimension() {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension(),
                        actual: vector.len(),
                    });
                }
            }
            embeddings.extend(vectors);

            if let Some(callback) = progress {
                callback(EmbeddingProgress {
                    current: embeddings.len(),
                    total,
                });
            }
        }

        Ok(embeddings)
    }
}
