use ndarray::Array2;

use crate::density::knn::kth_neighbour_distances;
use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    validate_positive,
};
use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::normalize_min_max;
use crate::operators::GeneticOperator;

const NAME: &str = "ShiftBasedDensity";

/// Shift-based density estimation (SDE, Li et al. 2014). Larger is preferred.
///
/// In min-max normalized space every other solution `j` is shifted onto `i` on the
/// objectives where `j` is better, so only the objectives where `j` is worse add to the
/// distance. A solution close to others that outperform it therefore looks crowded.
/// Sets with no more than `k` solutions score `INFINITY`.
#[derive(Clone, Debug)]
pub struct ShiftBasedDensity {
    k: usize,
}

impl ShiftBasedDensity {
    pub fn new(k: usize) -> Result<Self, DensityEstimatorError> {
        validate_positive(NAME, k, "k")?;
        Ok(Self { k })
    }
}

impl Default for ShiftBasedDensity {
    fn default() -> Self {
        Self { k: 1 }
    }
}

impl GeneticOperator for ShiftBasedDensity {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for ShiftBasedDensity {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Maximize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let normalized = normalize_min_max(fitness);
        let shifted = shifted_distances(&normalized);
        Ok(DensityScores::new(
            kth_neighbour_distances(&shifted, self.k),
            self.comparison(),
        ))
    }
}

/// `d[i][j] = || max(f_j - f_i, 0) ||`, the distance from `i` to `j` shifted onto `i`.
fn shifted_distances(fitness: &Array2<f64>) -> Array2<f64> {
    let n = fitness.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        fitness
            .row(j)
            .iter()
            .zip(fitness.row(i).iter())
            .map(|(&fj, &fi)| (fj - fi).max(0.0).powi(2))
            .sum::<f64>()
            .sqrt()
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sde_is_maximized() {
        assert_eq!(
            ShiftBasedDensity::default().comparison(),
            SurvivalScoringComparison::Maximize
        );
    }

    #[test]
    fn test_sde_penalizes_dominated_solutions() {
        // Solution 2 is dominated by 1, after the shift it sits right on top of it.
        let fitness = array![[0.0, 1.0], [0.5, 0.5], [0.5, 0.6], [1.0, 0.0]];
        let scores = ShiftBasedDensity::default().compute(&fitness).unwrap();
        assert_eq!(scores.value(2), 0.0);
        assert!(scores.value(1) > 0.0);
        assert_eq!(scores.least_preferred(), Some(2));
    }

    #[test]
    fn test_sde_distances_on_a_line() {
        // Normalized front: (0, 1), (0.5, 0.5), (1, 0).
        let fitness = array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0]];
        let scores = ShiftBasedDensity::default().compute(&fitness).unwrap();
        assert!((scores.value(0) - 0.5).abs() < 1e-12);
        assert!((scores.value(1) - 0.5).abs() < 1e-12);
        assert!((scores.value(2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sde_small_set_is_infinite() {
        let fitness = array![[0.0, 1.0]];
        let scores = ShiftBasedDensity::default().compute(&fitness).unwrap();
        assert_eq!(scores.value(0), f64::INFINITY);
    }
}
