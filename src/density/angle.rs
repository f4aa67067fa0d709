use ndarray::{Array1, Array2};

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    check_objectives, validate_finite,
};
use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::get_ideal;
use crate::operators::GeneticOperator;

const NAME: &str = "AngleBased";

/// Smallest angle (radians) between a solution and any other one, both seen from the
/// origin. Larger is preferred.
///
/// The origin is the ideal point of the scored set unless one is supplied. A zero-norm
/// vector makes an angle of `0` with everything; a lone solution scores `INFINITY`.
#[derive(Clone, Debug, Default)]
pub struct AngleBased {
    origin: Option<Array1<f64>>,
}

impl AngleBased {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(origin: Array1<f64>) -> Result<Self, DensityEstimatorError> {
        validate_finite(NAME, &origin.to_vec(), "origin")?;
        Ok(Self {
            origin: Some(origin),
        })
    }
}

impl GeneticOperator for AngleBased {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for AngleBased {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Maximize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        let n = fitness.nrows();
        let origin = match &self.origin {
            Some(origin) => {
                check_objectives(NAME, origin.len(), fitness)?;
                origin.clone()
            }
            None => get_ideal(fitness),
        };
        if n == 0 {
            return Ok(DensityScores::new(Array1::zeros(0), self.comparison()));
        }

        let translated: Array2<f64> = fitness - &origin;
        let norms: Vec<f64> = translated
            .rows()
            .into_iter()
            .map(|r| r.dot(&r).sqrt())
            .collect();

        let values = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        let denominator = norms[i] * norms[j];
                        if denominator == 0.0 {
                            return 0.0;
                        }
                        let cosine = translated.row(i).dot(&translated.row(j)) / denominator;
                        cosine.clamp(-1.0, 1.0).acos()
                    })
                    .fold(f64::INFINITY, f64::min)
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
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_angle_is_maximized() {
        assert_eq!(
            AngleBased::new().comparison(),
            SurvivalScoringComparison::Maximize
        );
    }

    #[test]
    fn test_angle_with_origin() {
        // Directions at 0, 45 and 90 degrees.
        let fitness = array![[1.0, 0.0], [1.0, 1.0], [0.0, 2.0]];
        let scores = AngleBased::with_origin(array![0.0, 0.0])
            .unwrap()
            .compute(&fitness)
            .unwrap();
        for &v in scores.values() {
            assert!((v - FRAC_PI_4).abs() < 1e-12);
        }
    }

    #[test]
    fn test_angle_crowded_direction_loses() {
        let fitness = array![[1.0, 0.0], [2.0, 0.1], [0.0, 1.0]];
        let scores = AngleBased::with_origin(array![0.0, 0.0])
            .unwrap()
            .compute(&fitness)
            .unwrap();
        assert!(scores.value(2) > scores.value(0));
        assert_eq!(scores.preference_order()[0], 2);
    }

    #[test]
    fn test_angle_zero_norm_and_single_member() {
        // Seen from the ideal point (0, 0), the first solution has zero norm.
        let fitness = array![[0.0, 0.0], [1.0, 1.0], [2.0, 0.5]];
        let scores = AngleBased::new().compute(&fitness).unwrap();
        assert_eq!(scores.value(0), 0.0);
        assert_eq!(scores.value(1), 0.0);
        assert_eq!(scores.value(2), 0.0);

        let single = AngleBased::new().compute(&array![[3.0, 1.0]]).unwrap();
        assert_eq!(single.value(0), f64::INFINITY);
    }
}
