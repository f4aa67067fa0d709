use log::trace;
use ndarray::{Array1, Axis};

use crate::density::{
    DensityEstimator, DensityEstimatorError, DensityScores, SurvivalScoringComparison,
    check_objectives, validate_finite,
};
use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::get_nadir;
use crate::helpers::hypervolume::hypervolume;
use crate::operators::GeneticOperator;

const NAME: &str = "HypervolumeContribution";

#[derive(Clone, Debug, PartialEq)]
enum Reference {
    Point(Array1<f64>),
    /// Added to the nadir point of the scored set.
    Offset(f64),
}

/// Exclusive hypervolume contribution: the volume lost if the solution were removed.
/// Larger is preferred.
#[derive(Clone, Debug, PartialEq)]
pub struct HypervolumeContribution {
    reference: Reference,
}

impl HypervolumeContribution {
    pub fn with_reference_point(
        reference_point: Array1<f64>,
    ) -> Result<Self, DensityEstimatorError> {
        if reference_point.is_empty() {
            return Err(DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: "reference point must not be empty".to_string(),
            });
        }
        validate_finite(NAME, &reference_point.to_vec(), "reference point")?;
        Ok(Self {
            reference: Reference::Point(reference_point),
        })
    }

    pub fn with_offset(offset: f64) -> Result<Self, DensityEstimatorError> {
        if !(offset.is_finite() && offset > 0.0) {
            return Err(DensityEstimatorError::InvalidParameter {
                estimator: NAME,
                message: format!("offset must be a positive finite number, got {}", offset),
            });
        }
        Ok(Self {
            reference: Reference::Offset(offset),
        })
    }

    fn reference_point(&self, fitness: &PopulationFitness) -> Array1<f64> {
        match &self.reference {
            Reference::Point(point) => point.clone(),
            Reference::Offset(offset) => get_nadir(fitness) + *offset,
        }
    }
}

impl Default for HypervolumeContribution {
    fn default() -> Self {
        Self {
            reference: Reference::Offset(1.0),
        }
    }
}

impl GeneticOperator for HypervolumeContribution {
    fn name(&self) -> String {
        NAME.to_string()
    }
}

impl DensityEstimator for HypervolumeContribution {
    fn comparison(&self) -> SurvivalScoringComparison {
        SurvivalScoringComparison::Maximize
    }

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError> {
        if let Reference::Point(point) = &self.reference {
            check_objectives(NAME, point.len(), fitness)?;
        }
        let n = fitness.nrows();
        if n == 0 {
            return Ok(DensityScores::new(Array1::zeros(0), self.comparison()));
        }

        let reference = self.reference_point(fitness);
        let total = hypervolume(fitness, &reference.view());
        let values: Array1<f64> = (0..n)
            .map(|i| {
                let others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
                let without = hypervolume(&fitness.select(Axis(0), &others), &reference.view());
                (total - without).max(0.0)
            })
            .collect();
        trace!("hypervolume contributions over {} solutions, total {}", n, total);
        Ok(DensityScores::new(values, self.comparison()))
    }
}
