use crate::density::knn::kth_neighbour_distances;
use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    validate_positive,
};
use crate::genetic::{Population, PopulationFitness};
use crate::helpers::linalg::pairwise_euclidean_distances;
use crate::non_dominated_sorting::{ParetoDominance, StrengthRanking};
use crate::operators::GeneticOperator;

const NAME: &str = "StrengthRawFitness";

/// SPEA2 fitness `R(i) + 1 / (sigma_k(i) + 2)`. Smaller is preferred.
///
/// `R(i)` is the raw strength fitness and `sigma_k(i)` the distance to the k-th nearest
/// neighbour. Without an explicit `k` the SPEA2 default `floor(sqrt(N))` is used. Every
/// non-dominated solution scores below `1.0`.
#[derive(Clone, Debug, Default)]
pub struct StrengthRawFitness {
    k: Option<usize>,
}

impl StrengthRawFitness {
    pub fn new(k: Option<usize>) -> Result<Self, DensityEstimatorError> {
        if let Some(k) = k {
            validate_positive(NAME, k, "k")?;
        }
        Ok(Self { k })
    }

    fn neighbour_rank(&self, n: usize) -> usize {
        let k = self.k.unwrap_or_else(|| (n as f64).sqrt().floor() as usize);
        k.clamp(1, n.saturating_sub(1).max(1))
    }
}

impl GeneticOperator for StrengthRawFitness {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for StrengthRawFitness {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Minimize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let n = fitness.nrows();
        let population = Population::from_fitness(fitness.clone());
        let raw = StrengthRanking::new(ParetoDominance)
            .raw_fitness(&population)
            .map_err(|e| DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: e.to_string(),
            })?;

        let distances = pairwise_euclidean_distances(fitness);
        let sigma = kth_neighbour_distances(&distances, self.neighbour_rank(n));
        let values = raw
            .iter()
            .zip(sigma.iter())
            .map(|(&r, &s)| {
                let density = if s.is_finite() { 1.0 / (s + 2.0) } else { 0.0 };
                r as f64 + density
            })
            .collect();
        Ok(DensityScores::new(values, self.comparison()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_strength_fitness_is_minimized() {
        assert_eq!(
            StrengthRawFitness::default().comparison(),
            SurvivalScoringComparison::Minimize
        );
    }

    #[test]
    fn test_strength_fitness_values() {
        // 0 and 1 are non-dominated, 2 is dominated by 0 only (S(0) = 1).
        let fitness = array![[0.0, 1.0], [1.0, 0.0], [0.5, 2.0]];
        let scores = StrengthRawFitness::new(Some(1)).unwrap().compute(&fitness).unwrap();

        let sigma_0 = 1.25_f64.sqrt();
        let sigma_1 = 2.0_f64.sqrt();
        assert!((scores.value(0) - 1.0 / (sigma_0 + 2.0)).abs() < 1e-12);
        assert!((scores.value(1) - 1.0 / (sigma_1 + 2.0)).abs() < 1e-12);
        assert!((scores.value(2) - (1.0 + 1.0 / (sigma_0 + 2.0))).abs() < 1e-12);
        assert!(scores.value(0) < 1.0);
        assert_eq!(scores.least_preferred(), Some(2));
    }

    #[test]
    fn test_strength_fitness_large_objective_offset() {
        // Raw fitness 0, 2, 3; nearest neighbour distances 1, 1, 2.
        let fitness = array![[1e8, 1e8], [1e8 + 1.0, 1e8], [1e8 + 3.0, 1e8]];
        let scores = StrengthRawFitness::new(Some(1)).unwrap().compute(&fitness).unwrap();
        let expected = [1.0 / 3.0, 2.0 + 1.0 / 3.0, 3.0 + 0.25];
        for (i, e) in expected.iter().enumerate() {
            assert!((scores.value(i) - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_strength_fitness_single_solution() {
        let fitness = array![[3.0, 4.0]];
        let scores = StrengthRawFitness::default().compute(&fitness).unwrap();
        assert_eq!(scores.value(0), 0.0);
    }

    #[test]
    fn test_strength_fitness_rejects_zero_k() {
        assert!(StrengthRawFitness::new(Some(0)).is_err());
    }
}
