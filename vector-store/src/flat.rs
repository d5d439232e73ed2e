use crate::error::{Result, VectorStoreError};
use crate::matrix::{DenseMatrix, dot, top_k};
use log::debug;

/// Exhaustive inner-product index over a dense matrix.
///
/// With L2-normalised rows and queries the inner product is the cosine
/// similarity.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    vectors: DenseMatrix,
}

impl FlatIpIndex {
    pub fn new(vectors: DenseMatrix) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    pub fn vectors(&self) -> &DenseMatrix {
        &self.vectors
    }

    /// `top_k` most similar rows for every query, best first
    pub fn search(
        &self,
        queries: &DenseMatrix,
        top_k_per_query: usize,
    ) -> Result<Vec<Vec<(usize, f32)>>> {
        if queries.dim() != self.dim() {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dim(),
                actual: queries.dim(),
            });
        }

        debug!(
            "Flat search: {} queries against {} vectors, top {}",
            queries.rows(),
            self.len(),
            top_k_per_query
        );

        Ok(queries
            .iter_rows()
            .map(|query| {
                let scores: Vec<f32> =
                    self.vectors.iter_rows().map(|row| dot(query, row)).collect();
                top_k(&scores, top_k_per_query)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot(a, b) / (norm(a) * norm(b))
    }

    #[test]
    fn test_top1_is_brute_force_nearest_neighbour() {
        let rows = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.6, 0.8, 0.0],
            vec![0.0, 0.6, 0.8],
        ];
        let mut vectors = DenseMatrix::from_rows(3, rows.clone()).unwrap();
        vectors.l2_normalize_rows();
        let index = FlatIpIndex::new(vectors);

        let raw_queries = vec![vec![0.9, 0.1, 0.0], vec![0.1, 0.5, 0.6], vec![0.0, 0.3, 0.1]];
        let mut queries = DenseMatrix::from_rows(3, raw_queries.clone()).unwrap();
        queries.l2_normalize_rows();

        let results = index.search(&queries, 1).unwrap();
        for (query, result) in raw_queries.iter().zip(&results) {
            let expected = rows
                .iter()
                .enumerate()
                .max_by(|a, b| cosine(query, a.1).total_cmp(&cosine(query, b.1)))
                .map(|(row, _)| row)
                .unwrap();
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].0, expected);
        }
    }

    #[test]
    fn test_top_k_clamped_to_index_size() {
        let vectors = DenseMatrix::from_rows(1, vec![vec![1.0], vec![2.0]]).unwrap();
        let index = FlatIpIndex::new(vectors);
        let queries = DenseMatrix::from_rows(1, vec![vec![1.0]]).unwrap();

        assert_eq!(
            index.search(&queries, 5).unwrap(),
            vec![vec![(1, 2.0), (0, 1.0)]]
        );
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = FlatIpIndex::new(DenseMatrix::from_rows(2, vec![vec![1.0, 0.0]]).unwrap());
        let queries = DenseMatrix::from_rows(3, vec![vec![1.0, 0.0, 0.0]]).unwrap();
        assert!(index.search(&queries, 1).is_err());
    }
}
