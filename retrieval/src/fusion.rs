use log::debug;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Merge sparse candidates into a dense ranking.
///
/// Candidates start as `dense`. Each sparse `(row, score)` adds
/// `sparse_weight * score` to the row's fused score, appending the row if
/// dense search did not return it. The result is stably sorted by fused
/// score, best first, and truncated to `top_k`.
pub fn fuse_candidates(
    dense: &[(usize, f32)],
    sparse: &[(usize, f32)],
    sparse_weight: f32,
    top_k: usize,
) -> Vec<(usize, f32)> {
    let mut fused: Vec<(usize, f32)> = Vec::with_capacity(dense.len() + sparse.len());
    let mut positions: HashMap<usize, usize> = HashMap::with_capacity(dense.len() + sparse.len());

    for &(row, score) in dense {
        match positions.entry(row) {
            Entry::Occupied(position) => fused[*position.get()].1 += score,
            Entry::Vacant(position) => {
                position.insert(fused.len());
                fused.push((row, score));
            }
        }
    }

    for &(row, score) in sparse {
        let weighted_score = sparse_weight * score;
        match positions.entry(row) {
            Entry::Occupied(position) => fused[*position.get()].1 += weighted_score,
            Entry::Vacant(position) => {
                position.insert(fused.len());
                fused.push((row, weighted_score));
            }
        }
    }

    debug!(
        "Fused {} dense + {} sparse candidates into {}",
        dense.len(),
        sparse.len(),
        fused.len()
    );

    // Stable: equal scores keep insertion order.
    fused.sort_by(|a, b| b.1.total_cmp(&a.1));
    fused.truncate(top_k);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sparse_scores_accumulate() {
        let dense = [(3, 0.9), (7, 0.5)];
        let sparse = [(7, 0.8), (9, 0.6)];

        let fused = fuse_candidates(&dense, &sparse, 0.5, 10);

        let rows: Vec<usize> = fused.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![3, 7, 9]);
        assert!((fused[0].1 - 0.9).abs() < 1e-6);
        assert!((fused[1].1 - 0.9).abs() < 1e-6);
        assert!((fused[2].1 - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let fused = fuse_candidates(&[(3, 0.9), (7, 0.5)], &[(7, 0.8), (9, 0.6)], 0.5, 2);
        assert_eq!(fused.len(), 2);
        assert!(fused.iter().all(|(row, _)| *row != 9));
    }

    #[test]
    fn test_sparse_can_overtake_dense() {
        let fused = fuse_candidates(&[(0, 0.4), (1, 0.3)], &[(1, 1.0)], 0.5, 2);
        assert_eq!(fused[0].0, 1);
        assert!((fused[0].1 - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weight_keeps_dense_order() {
        let fused = fuse_candidates(&[(5, 0.7), (2, 0.6)], &[(8, 0.99)], 0.0, 3);
        assert_eq!(fused, vec![(5, 0.7), (2, 0.6), (8, 0.0)]);
    }

    #[test]
    fn test_empty_sparse_is_dense() {
        let dense = [(4, 0.8), (1, 0.2)];
        assert_eq!(fuse_candidates(&dense, &[], 0.5, 5), dense.to_vec());
    }
}
