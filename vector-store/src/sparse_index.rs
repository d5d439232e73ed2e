use crate::error::{Result, VectorStoreError};
use crate::matrix::SimilarityMetric;
use bionel_embeddings::SparseMatrix;
use log::debug;

/// Column-wise inverted index over the rows of a sparse matrix, used to
/// score queries against every row without densifying.
#[derive(Debug, Clone)]
pub struct SparseIndex {
    n_rows: usize,
    n_cols: usize,
    postings: Vec<Vec<(u32, f32)>>,
    row_norms: Vec<f32>,
}

impl SparseIndex {
    pub fn new(matrix: &SparseMatrix) -> Self {
        let mut postings: Vec<Vec<(u32, f32)>> = vec![Vec::new(); matrix.n_cols()];
        let mut row_norms = Vec::with_capacity(matrix.rows());

        for row in 0..matrix.rows() {
            let (indices, values) = matrix.row(row);
            for (&column, &value) in indices.iter().zip(values) {
                postings[column as usize].push((row as u32, value));
            }
            row_norms.push(values.iter().map(|v| v * v).sum::<f32>().sqrt());
        }

        Self {
            n_rows: matrix.rows(),
            n_cols: matrix.n_cols(),
            postings,
            row_norms,
        }
    }

    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Full `[queries × rows]` similarity matrix
    pub fn scores(
        &self,
        queries: &SparseMatrix,
        metric: SimilarityMetric,
    ) -> Result<Vec<Vec<f32>>> {
        if queries.n_cols() != self.n_cols {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.n_cols,
                actual: queries.n_cols(),
            });
        }

        debug!(
            "Sparse scoring: {} queries against {} rows ({metric})",
            queries.rows(),
            self.n_rows
        );

        Ok((0..queries.rows())
            .map(|query| {
                let (indices, values) = queries.row(query);
                let mut scores = vec![0.0f32; self.n_rows];
                for (&column, &value) in indices.iter().zip(values) {
                    for &(row, weight) in &self.postings[column as usize] {
                        scores[row as usize] += value * weight;
                    }
                }

                if metric == SimilarityMetric::Cosine {
                    let query_norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
                    for (score, row_norm) in scores.iter_mut().zip(&self.row_norms) {
                        let denominator = query_norm * row_norm;
                        *score = if denominator > 0.0 {
                            *score / denominator
                        } else {
                            0.0
                        };
                    }
                }
                scores
            })
            .collect())
    }
}
