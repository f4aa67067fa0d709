use ndarray::{Array2, Zip};

/// Cross squared Euclidean distance matrix between the rows of `data` (n, d) and the rows
/// of `reference` (m, d), shape (n, m).
///
/// Every entry is summed from coordinate differences, so objectives sharing a large offset
/// keep their small gaps.
pub fn cross_euclidean_distances(data: &Array2<f64>, reference: &Array2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((data.nrows(), reference.nrows()), |(i, j)| {
        Zip::from(data.row(i))
            .and(reference.row(j))
            .fold(0.0, |acc, &x, &y| acc + (x - y) * (x - y))
    })
}

/// Pairwise Euclidean distances between the rows of `data`, zero on the diagonal.
pub fn pairwise_euclidean_distances(data: &Array2<f64>) -> Array2<f64> {
    let mut distances = cross_euclidean_distances(data, data).mapv(f64::sqrt);
    distances.diag_mut().fill(0.0);
    distances
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cross_euclidean_distances() {
        let data = array![[0.0, 0.0], [1.0, 1.0]];
        let reference = array![[0.0, 0.0], [2.0, 2.0]];

        // - [0,0] vs [0,0]: 0
        // - [0,0] vs [2,2]: 2²+2² = 8
        // - [1,1] vs [0,0]: 1²+1² = 2
        // - [1,1] vs [2,2]: 1²+1² = 2
        let expected = array![[0.0, 8.0], [2.0, 2.0]];
        assert_eq!(cross_euclidean_distances(&data, &reference), expected);
    }

    #[test]
    fn test_pairwise_euclidean_distances() {
        let data = array![[0.0, 0.0], [3.0, 4.0]];
        let distances = pairwise_euclidean_distances(&data);
        assert_eq!(distances, array![[0.0, 5.0], [5.0, 0.0]]);
    }

    #[test]
    fn test_distances_keep_small_gaps_under_large_offsets() {
        let data = array![[1e8, 1e8], [1e8 + 1.0, 1e8], [1e8 + 3.0, 1e8]];
        let distances = pairwise_euclidean_distances(&data);
        assert_eq!(
            distances,
            array![[0.0, 1.0, 3.0], [1.0, 0.0, 2.0], [3.0, 2.0, 0.0]]
        );
    }
}
