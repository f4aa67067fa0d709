use ndarray::{Array1, Array2};
use ordered_float::OrderedFloat;

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    validate_positive,
};
use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::normalize_min_max;
use crate::helpers::linalg::pairwise_euclidean_distances;
use crate::operators::GeneticOperator;

const NAME: &str = "KNearestNeighbors";

/// Distance to the k-th nearest neighbour in objective space. Larger is preferred.
///
/// Requires strictly more than `k` solutions.
#[derive(Clone, Debug)]
pub struct KNearestNeighbors {
    k: usize,
    normalize: bool,
}

impl KNearestNeighbors {
    pub fn new(k: usize, normalize: bool) -> Result<Self, DensityEstimatorError> {
        validate_positive(NAME, k, "k")?;
        Ok(Self { k, normalize })
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl GeneticOperator for KNearestNeighbors {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for KNearestNeighbors {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Maximize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let n = fitness.nrows();
        if n <= self.k {
            return Err(DensityEstimatorError::NotEnoughSolutions {
                estimator: NAME,
                required: self.k,
                found: n,
            });
        }
        let distances = if self.normalize {
            pairwise_euclidean_distances(&normalize_min_max(fitness))
        } else {
            pairwise_euclidean_distances(fitness)
        };
        Ok(DensityScores::new(
            kth_neighbour_distances(&distances, self.k),
            self.comparison(),
        ))
    }
}

/// For every row of a square distance matrix, the k-th smallest distance to another row.
pub(crate) fn kth_neighbour_distances(distances: &Array2<f64>, k: usize) -> Array1<f64> {
    distances
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut others: Vec<OrderedFloat<f64>> = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &d)| OrderedFloat(d))
                .collect();
            if k == 0 || k > others.len() {
                return f64::INFINITY;
            }
            let (_, kth, _) = others.select_nth_unstable(k - 1);
            kth.into_inner()
        })
        .collect()
}
