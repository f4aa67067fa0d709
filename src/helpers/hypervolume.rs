use ndarray::{Array2, ArrayView1};
use ordered_float::OrderedFloat;

/// Exact hypervolume (minimization) of the region dominated by `points` and bounded by
/// `reference`. Points that do not strictly dominate the reference contribute nothing.
pub fn hypervolume(points: &Array2<f64>, reference: &ArrayView1<f64>) -> f64 {
    let reference: Vec<f64> = reference.to_vec();
    let filtered: Vec<Vec<f64>> = points
        .rows()
        .into_iter()
        .filter(|p| p.iter().zip(reference.iter()).all(|(&v, &r)| v < r))
        .map(|p| p.to_vec())
        .collect();
    if filtered.is_empty() || reference.is_empty() {
        return 0.0;
    }
    hv_recursive(&filtered, &reference)
}

/// Slicing on the last objective. All points are strictly inside the reference box.
fn hv_recursive(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let d = reference.len();
    if d == 1 {
        let min_val = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        return (reference[0] - min_val).max(0.0);
    }
    if points.len() == 1 {
        return points[0]
            .iter()
            .zip(reference)
            .map(|(&p, &r)| (r - p).max(0.0))
            .product();
    }
    if d == 2 {
        return hv_2d(points, reference);
    }

    let mut sorted: Vec<&Vec<f64>> = points.iter().collect();
    sorted.sort_by_key(|p| OrderedFloat(p[d - 1]));

    let sub_reference = &reference[..d - 1];
    let mut result = 0.0;
    for i in 0..sorted.len() {
        let upper = if i + 1 < sorted.len() {
            sorted[i + 1][d - 1]
        } else {
            reference[d - 1]
        };
        let height = upper - sorted[i][d - 1];
        if height <= 0.0 {
            continue;
        }
        let projected: Vec<Vec<f64>> = sorted[..=i].iter().map(|p| p[..d - 1].to_vec()).collect();
        let non_dominated = non_dominated_subset(projected);
        result += height * hv_recursive(&non_dominated, sub_reference);
    }
    result
}

/// Sweep along the first objective.
fn hv_2d(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let mut sorted: Vec<&Vec<f64>> = points.iter().collect();
    sorted.sort_by_key(|p| (OrderedFloat(p[0]), OrderedFloat(p[1])));
    let mut area = 0.0;
    let mut best_second = reference[1];
    for p in sorted {
        if p[1] < best_second {
            area += (reference[0] - p[0]) * (best_second - p[1]);
            best_second = p[1];
        }
    }
    area
}

fn non_dominated_subset(points: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let weakly_dominates =
        |a: &[f64], b: &[f64]| a.iter().zip(b.iter()).all(|(&x, &y)| x <= y);
    let mut kept: Vec<Vec<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if kept.iter().any(|k| weakly_dominates(k, &p)) {
            continue;
        }
        kept.retain(|k| !weakly_dominates(&p, k));
        kept.push(p);
    }
    kept
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    #[rstest(
        points, reference, expected,
        case(array![[1.0, 3.0], [2.0, 2.0], [3.0, 1.0]], vec![4.0, 4.0], 6.0),
        case(array![[1.0, 1.0]], vec![3.0, 3.0], 4.0),
        case(array![[5.0, 5.0]], vec![5.0, 5.0], 0.0),
        case(array![[1.0, 1.0], [2.0, 2.0]], vec![3.0, 3.0], 4.0)
    )]
    fn test_hypervolume_2d(points: Array2<f64>, reference: Vec<f64>, expected: f64) {
        let reference = ndarray::Array1::from(reference);
        let hv = hypervolume(&points, &reference.view());
        assert!((hv - expected).abs() < 1e-10, "got {}", hv);
    }

    #[test]
    fn test_hypervolume_3d() {
        // Three unit corners of the [0, 2]^3 cube.
        let points = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let reference = array![2.0, 2.0, 2.0];
        // Union of three 1x2x2 boxes: 3 * 4 - 3 * 2 + 1 = 7.
        let hv = hypervolume(&points, &reference.view());
        assert!((hv - 7.0).abs() < 1e-10, "got {}", hv);
    }

    #[test]
    fn test_hypervolume_empty() {
        let points = Array2::<f64>::zeros((0, 2));
        let reference = array![1.0, 1.0];
        assert_eq!(hypervolume(&points, &reference.view()), 0.0);
    }
}
