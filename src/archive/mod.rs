//! External archives fed with every evaluated solution.
//!
//! Members of both archives are pairwise non-dominated after every `add`.

use std::error::Error;
use std::fmt;

use ndarray::{Array2, ArrayView1, Axis, stack};

use crate::density::DensityEstimatorError;
use crate::genetic::{Individual, Population, PopulationError};
use crate::non_dominated_sorting::DominanceError;

mod bounded;
mod non_dominated;

pub use bounded::BoundedArchive;
pub use non_dominated::NonDominatedArchive;

#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveError {
    InvalidCapacity(usize),
    Dominance(DominanceError),
    Density(DensityEstimatorError),
    Population(PopulationError),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::InvalidCapacity(capacity) => write!(
                f,
                "Archive capacity must be greater than 0, got {}",
                capacity
            ),
            ArchiveError::Dominance(e) => write!(f, "Cannot compare with archive members: {}", e),
            ArchiveError::Density(e) => write!(f, "Error during archive eviction: {}", e),
            ArchiveError::Population(e) => write!(f, "Error exporting archive: {}", e),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ArchiveError::Dominance(e) => Some(e),
            ArchiveError::Density(e) => Some(e),
            ArchiveError::Population(e) => Some(e),
            ArchiveError::InvalidCapacity(_) => None,
        }
    }
}

impl From<DominanceError> for ArchiveError {
    fn from(e: DominanceError) -> Self {
        ArchiveError::Dominance(e)
    }
}

impl From<DensityEstimatorError> for ArchiveError {
    fn from(e: DensityEstimatorError) -> Self {
        ArchiveError::Density(e)
    }
}

impl From<PopulationError> for ArchiveError {
    fn from(e: PopulationError) -> Self {
        ArchiveError::Population(e)
    }
}

pub trait Archive {
    /// Offers a solution. Returns whether it is a member once the call returns.
    fn add(&mut self, individual: Individual) -> Result<bool, ArchiveError>;

    fn solutions(&self) -> &[Individual];

    fn len(&self) -> usize {
        self.solutions().len()
    }

    fn is_empty(&self) -> bool {
        self.solutions().is_empty()
    }

    /// Members stacked into a population, in insertion order.
    fn to_population(&self) -> Result<Population, ArchiveError> {
        Ok(Population::from_individuals(self.solutions())?)
    }
}

/// Stacks objective vectors into one matrix, one row per vector.
pub(crate) fn fitness_matrix(rows: &[ArrayView1<f64>]) -> Result<Array2<f64>, ArchiveError> {
    let n_objectives = rows.first().map_or(0, |r| r.len());
    if rows.is_empty() {
        return Ok(Array2::zeros((0, n_objectives)));
    }
    stack(Axis(0), rows).map_err(|_| {
        ArchiveError::Population(PopulationError::RaggedRows {
            field: "fitness",
            expected: n_objectives,
            found: rows
                .iter()
                .map(|r| r.len())
                .find(|&len| len != n_objectives)
                .unwrap_or(n_objectives),
        })
    })
}
