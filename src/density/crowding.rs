use ndarray::Array1;
use ordered_float::OrderedFloat;

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
};
use crate::genetic::PopulationFitness;
use crate::operators::GeneticOperator;

/// NSGA-II crowding distance. Larger is preferred.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrowdingDistance;

impl GeneticOperator for CrowdingDistance {
    fn name(&self) -> String {
        "CrowdingDistance".to_string()
    }
}

impl DensityEstimator for CrowdingDistance {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Maximize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        Ok(DensityScores::new(crowding_distance(fitness), self.comparison()))
    }
}

/// Computes the crowding distance for a given population_fitness.
///
/// Sets of at most two solutions get `INFINITY` everywhere. Otherwise, for every objective
/// the solutions are sorted ascending, both ends get `INFINITY` and each interior solution
/// accumulates the normalized gap between its neighbours. An objective with `max == min`
/// is skipped entirely, ends included.
pub fn crowding_distance(population_fitness: &PopulationFitness) -> Array1<f64> {
    let num_individuals = population_fitness.nrows();
    if num_individuals <= 2 {
        return Array1::from_elem(num_individuals, f64::INFINITY);
    }

    let mut distances = Array1::zeros(num_individuals);
    for objective_values in population_fitness.columns() {
        let mut sorted_indices: Vec<usize> = (0..num_individuals).collect();
        sorted_indices.sort_by_key(|&i| OrderedFloat(objective_values[i]));

        let first = sorted_indices[0];
        let last = sorted_indices[num_individuals - 1];
        let range = objective_values[last] - objective_values[first];
        if range == 0.0 {
            continue;
        }

        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;
        for window in sorted_indices.windows(3) {
            let (prev, current, next) = (window[0], window[1], window[2]);
            distances[current] += (objective_values[next] - objective_values[prev]) / range;
        }
    }
    distances
}
