//! Per-solution diversity scores computed over one set of solutions.
//!
//! Every estimator declares whether a higher or a lower score makes a solution more
//! worth keeping through [`DensityEstimator::comparison`]. Replacement selection and
//! archive eviction only ever read that direction, never the estimator type.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

use ndarray::Array1;
use ordered_float::OrderedFloat;

use crate::genetic::{Population, PopulationFitness};
use crate::operators::GeneticOperator;

mod angle;
mod crowding;
mod grid;
mod hypervolume;
mod knn;
mod reference_niche;
mod sde;
mod strength;

pub use angle::AngleBased;
pub use crowding::{CrowdingDistance, crowding_distance};
pub use grid::AdaptiveGrid;
pub use hypervolume::HypervolumeContribution;
pub use knn::KNearestNeighbors;
pub use reference_niche::ReferencePointNiche;
pub use sde::ShiftBasedDensity;
pub use strength::StrengthRawFitness;

/// Controls how the survival score is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurvivalScoringComparison {
    /// Larger survival scoring (e.g crowding distance) is preferred.
    Maximize,
    /// Smaller survival scoring (e.g grid occupancy) is preferred.
    Minimize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DensityEstimatorError {
    InvalidParameter {
        estimator: &'static str,
        message: String,
    },
    /// The estimator needs strictly more than `required` solutions.
    NotEnoughSolutions {
        estimator: &'static str,
        required: usize,
        found: usize,
    },
    DimensionMismatch {
        estimator: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for DensityEstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityEstimatorError::InvalidParameter { estimator, message } => {
                write!(f, "Invalid parameter for {}: {}", estimator, message)
            }
            DensityEstimatorError::NotEnoughSolutions {
                estimator,
                required,
                found,
            } => write!(
                f,
                "{} needs more than {} solutions, got {}",
                estimator, required, found
            ),
            DensityEstimatorError::DimensionMismatch {
                estimator,
                expected,
                found,
            } => write!(
                f,
                "{} expects {} objectives, got {}",
                estimator, expected, found
            ),
        }
    }
}

impl Error for DensityEstimatorError {}

/// Scores of one `compute` call, indexed by position in the set it was computed over.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityScores {
    values: Array1<f64>,
    comparison: SurvivalScoringComparison,
}

impl DensityScores {
    pub fn new(values: Array1<f64>, comparison: SurvivalScoringComparison) -> Self {
        Self { values, comparison }
    }

    /// Score of the solution at `index`, `0.0` when `index` is outside the computed set.
    pub fn value(&self, index: usize) -> f64 {
        self.get(index).unwrap_or(0.0)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array1<f64> {
        self.values
    }

    pub fn comparison(&self) -> SurvivalScoringComparison {
        self.comparison
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `Ordering::Less` when the solution at `i` is preferred to the one at `j`.
    pub fn compare(&self, i: usize, j: usize) -> Ordering {
        let (a, b) = (OrderedFloat(self.value(i)), OrderedFloat(self.value(j)));
        match self.comparison {
            SurvivalScoringComparison::Maximize => b.cmp(&a),
            SurvivalScoringComparison::Minimize => a.cmp(&b),
        }
    }

    /// Index comparator usable with `sort_by`, most preferred first.
    pub fn comparator(&self) -> impl Fn(&usize, &usize) -> Ordering + '_ {
        move |&i, &j| self.compare(i, j)
    }

    /// All indices, most preferred first. Ties keep index order.
    pub fn preference_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(self.comparator());
        order
    }

    /// The least preferred index, the first one in index order among equals.
    pub fn least_preferred(&self) -> Option<usize> {
        let mut indices = 0..self.len();
        let first = indices.next()?;
        Some(indices.fold(first, |worst, i| {
            if self.compare(i, worst) == Ordering::Greater {
                i
            } else {
                worst
            }
        }))
    }
}

/// A diversity estimator over the objective vectors of a set of solutions.
pub trait DensityEstimator: GeneticOperator + Send + Sync {
    /// Preference direction of the scores. This is part of the estimator contract.
    fn comparison(&self) -> SurvivalScoringComparison;

    fn compute(&self, fitness: &PopulationFitness) -> Result<DensityScores, DensityEstimatorError>;

    /// Computes the scores and stores them as the population's `survival_score`.
    fn compute_population(
        &self,
        population: &mut Population,
    ) -> Result<DensityScores, DensityEstimatorError> {
        let scores = self.compute(&population.fitness)?;
        population.survival_score = Some(scores.values().clone());
        Ok(scores)
    }
}

pub(crate) fn validate_positive(
    estimator: &'static str,
    value: usize,
    name: &str,
) -> Result<(), DensityEstimatorError> {
    if value == 0 {
        return Err(DensityEstimatorError::InvalidParameter {
            estimator,
            message: format!("{} must be greater than 0", name),
        });
    }
    Ok(())
}

pub(crate) fn validate_finite(
    estimator: &'static str,
    values: &[f64],
    name: &str,
) -> Result<(), DensityEstimatorError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DensityEstimatorError::InvalidParameter {
            estimator,
            message: format!("{} must only contain finite values", name),
        });
    }
    Ok(())
}

pub(crate) fn check_objectives(
    estimator: &'static str,
    expected: usize,
    fitness: &PopulationFitness,
) -> Result<(), DensityEstimatorError> {
    if fitness.nrows() > 0 && fitness.ncols() != expected {
        return Err(DensityEstimatorError::DimensionMismatch {
            estimator,
            expected,
            found: fitness.ncols(),
        });
    }
    Ok(())
}
