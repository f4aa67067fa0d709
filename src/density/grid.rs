use std::collections::HashMap;

use ndarray::{Array1, ArrayView1};

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    validate_positive,
};
use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::{get_ideal, get_nadir};
use crate::operators::GeneticOperator;

const NAME: &str = "AdaptiveGrid";
const MAX_BISECTIONS: usize = 30;

/// PAES adaptive grid. Smaller is preferred.
///
/// Each objective range of the scored set is split into `2^bisections` equal slices and
/// a solution scores the number of solutions sharing its hypercube. The grid bounds adapt
/// to the set on every call.
#[derive(Clone, Debug)]
pub struct AdaptiveGrid {
    bisections: usize,
}

impl AdaptiveGrid {
    pub fn new(bisections: usize) -> Result<Self, DensityEstimatorError> {
        validate_positive(NAME, bisections, "bisections")?;
        if bisections > MAX_BISECTIONS {
            return Err(DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: format!("bisections must be at most {}", MAX_BISECTIONS),
            });
        }
        Ok(Self { bisections })
    }

    pub fn bisections(&self) -> usize {
        self.bisections
    }

    /// Grid coordinates of every solution of `fitness`.
    pub fn locate(&self, fitness: &PopulationFitness) -> Vec<Vec<usize>> {
        if fitness.nrows() == 0 {
            return Vec::new();
        }
        let lower = get_ideal(fitness);
        let upper = get_nadir(fitness);
        let divisions = 1usize << self.bisections;
        fitness
            .rows()
            .into_iter()
            .map(|row| cell_of(&row, &lower, &upper, divisions))
            .collect()
    }
}

fn cell_of(
    row: &ArrayView1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    divisions: usize,
) -> Vec<usize> {
    row.iter()
        .zip(lower.iter().zip(upper.iter()))
        .map(|(&v, (&lo, &hi))| {
            let range = hi - lo;
            if range <= 0.0 {
                return 0;
            }
            let slot = ((v - lo) / range * divisions as f64).floor() as usize;
            // the upper bound belongs to the last slice
            slot.min(divisions - 1)
        })
        .collect()
}

impl GeneticOperator for AdaptiveGrid {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for AdaptiveGrid {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Minimize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let cells = self.locate(fitness);
        let mut occupancy: HashMap<&[usize], usize> = HashMap::with_capacity(cells.len());
        for cell in &cells {
            *occupancy.entry(cell.as_slice()).or_insert(0) += 1;
        }
        let values = cells
            .iter()
            .map(|cell| occupancy.get(cell.as_slice()).copied().unwrap_or(0) as f64)
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
    fn test_grid_is_minimized() {
        let grid = AdaptiveGrid::new(2).unwrap();
        assert_eq!(grid.comparison(), SurvivalScoringComparison::Minimize);
    }

    #[test]
    fn test_grid_occupancy() {
        // Bounds [0, 4] on both objectives, 2 bisections give slices of width 1.
        let fitness = array![[0.0, 4.0], [0.2, 3.9], [0.4, 3.8], [2.5, 1.5], [4.0, 0.0]];
        let grid = AdaptiveGrid::new(2).unwrap();
        assert_eq!(
            grid.locate(&fitness),
            vec![vec![0, 3], vec![0, 3], vec![0, 3], vec![2, 1], vec![3, 0]]
        );
        let scores = grid.compute(&fitness).unwrap();
        assert_eq!(scores.values(), &array![3.0, 3.0, 3.0, 1.0, 1.0]);
        // The crowded cell loses first, its first member in index order.
        assert_eq!(scores.least_preferred(), Some(0));
    }

    #[test]
    fn test_grid_degenerate_objective() {
        let fitness = array![[1.0, 5.0], [2.0, 5.0]];
        let grid = AdaptiveGrid::new(1).unwrap();
        assert_eq!(grid.locate(&fitness), vec![vec![0, 0], vec![1, 0]]);
    }

    #[test]
    fn test_grid_rejects_bad_bisections() {
        assert!(AdaptiveGrid::new(0).is_err());
        assert!(AdaptiveGrid::new(MAX_BISECTIONS + 1).is_err());
    }
}
