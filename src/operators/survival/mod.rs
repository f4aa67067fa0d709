use std::error::Error;
use std::fmt;

use crate::density::DensityEstimatorError;
use crate::genetic::{Population, PopulationError};
use crate::non_dominated_sorting::DominanceError;
use crate::operators::GeneticOperator;

mod rank_and_density;

pub use rank_and_density::{RankAndDensitySurvival, RemovalPolicy};

#[derive(Debug, Clone, PartialEq)]
pub enum SurvivalError {
    NotEnoughIndividuals { requested: usize, available: usize },
    Dominance(DominanceError),
    Density(DensityEstimatorError),
    Population(PopulationError),
}

impl fmt::Display for SurvivalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurvivalError::NotEnoughIndividuals {
                requested,
                available,
            } => write!(
                f,
                "Cannot select {} survivors from a population of {}",
                requested, available
            ),
            SurvivalError::Dominance(e) => write!(f, "Error during ranking: {}", e),
            SurvivalError::Density(e) => write!(f, "Error during density estimation: {}", e),
            SurvivalError::Population(e) => write!(f, "Error building survivors: {}", e),
        }
    }
}

impl Error for SurvivalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SurvivalError::Dominance(e) => Some(e),
            SurvivalError::Density(e) => Some(e),
            SurvivalError::Population(e) => Some(e),
            SurvivalError::NotEnoughIndividuals { .. } => None,
        }
    }
}

impl From<DominanceError> for SurvivalError {
    fn from(e: DominanceError) -> Self {
        SurvivalError::Dominance(e)
    }
}

impl From<DensityEstimatorError> for SurvivalError {
    fn from(e: DensityEstimatorError) -> Self {
        SurvivalError::Density(e)
    }
}

impl From<PopulationError> for SurvivalError {
    fn from(e: PopulationError) -> Self {
        SurvivalError::Population(e)
    }
}

/// Environmental selection: reduces a (parents + offspring) population to `n_survive`
/// individuals.
pub trait SurvivalOperator: GeneticOperator {
    fn operate(
        &self,
        population: Population,
        n_survive: usize,
    ) -> Result<Population, SurvivalError>;
}
