use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How query and dictionary vectors are compared. Higher is more similar
/// for both metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    InnerProduct,
    #[default]
    Cosine,
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::InnerProduct => write!(f, "inner_product"),
            SimilarityMetric::Cosine => write!(f, "cosine"),
        }
    }
}

/// Row-major `[rows × dim]` matrix of `f32`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl DenseMatrix {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Stack `rows`, each of which must have `dim` entries
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self> {
        let mut matrix = Self {
            dim,
            data: Vec::with_capacity(rows.len() * dim),
        };
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dim {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Scale every row to unit length; all-zero rows stay zero
    pub fn l2_normalize_rows(&mut self) {
        for row in self.data.chunks_exact_mut(self.dim.max(1)) {
            let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|x| *x /= norm);
            }
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.dim > 0 && self.data.len() % self.dim == 0
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Highest-scoring `k` entries of `scores` as `(index, score)`, sorted
/// descending with ties broken by lower index.
///
/// Partial selection first (linear in `scores.len()`), then only the
/// selected `k` are sorted.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, descending);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(descending);
    candidates
}

fn descending(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
