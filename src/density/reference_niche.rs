use ndarray::{Array1, Array2};
use ordered_float::OrderedFloat;

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    check_objectives, validate_finite,
};
use crate::genetic::PopulationFitness;
use crate::helpers::hyperplane::{AsfHyperPlaneNormalization, normalize_with_hyperplane};
use crate::operators::GeneticOperator;

const NAME: &str = "ReferencePointNiche";

/// Perpendicular distance to the closest reference direction (NSGA-III association).
/// Smaller is preferred.
///
/// With `normalize` the set is first translated by its ideal point and scaled by the
/// hyperplane intercepts; otherwise the raw objective vectors are associated.
#[derive(Clone, Debug)]
pub struct ReferencePointNiche {
    directions: Array2<f64>,
    normalize: bool,
}

impl ReferencePointNiche {
    pub fn new(directions: Array2<f64>, normalize: bool) -> Result<Self, DensityEstimatorError> {
        if directions.nrows() == 0 || directions.ncols() == 0 {
            return Err(DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: "at least one non-empty reference direction is required".to_string(),
            });
        }
        validate_finite(NAME, &directions.iter().copied().collect::<Vec<_>>(), "directions")?;
        if directions.rows().into_iter().any(|w| w.dot(&w) == 0.0) {
            return Err(DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: "reference directions must have a non-zero norm".to_string(),
            });
        }
        Ok(Self {
            directions,
            normalize,
        })
    }

    pub fn directions(&self) -> &Array2<f64> {
        &self.directions
    }

    /// Index of the closest reference direction of every solution, and the distance to it.
    pub fn associate(
        &self,
        fitness: &PopulationFitness,
    ) -> Result<(Vec<usize>, Array1<f64>), DensityEstimatorError> {
        check_objectives(NAME, self.directions.ncols(), fitness)?;
        let points = if self.normalize {
            normalize_with_hyperplane(&AsfHyperPlaneNormalization, fitness)
        } else {
            fitness.clone()
        };
        Ok(associate(&points, &self.directions))
    }
}

/// d⊥(s, w)² = ||s||² - (s · w)² / ||w||², clamped at zero against round-off.
fn associate(points: &Array2<f64>, directions: &Array2<f64>) -> (Vec<usize>, Array1<f64>) {
    let norm_w_sq: Vec<f64> = directions.rows().into_iter().map(|w| w.dot(&w)).collect();
    let dot = points.dot(&directions.t());

    let mut assignments = Vec::with_capacity(points.nrows());
    let mut distances = Array1::zeros(points.nrows());
    for (i, s) in points.rows().into_iter().enumerate() {
        let norm_s_sq = s.dot(&s);
        let (best, best_d2) = dot
            .row(i)
            .iter()
            .zip(norm_w_sq.iter())
            .map(|(&sw, &ww)| (norm_s_sq - sw * sw / ww).max(0.0))
            .enumerate()
            .min_by_key(|&(j, d2)| (OrderedFloat(d2), j))
            .unwrap_or((0, f64::INFINITY));
        assignments.push(best);
        distances[i] = best_d2.sqrt();
    }
    (assignments, distances)
}

impl GeneticOperator for ReferencePointNiche {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for ReferencePointNiche {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Minimize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let (_, distances) = self.associate(fitness)?;
        Ok(DensityScores::new(distances, self.comparison()))
    }
}
