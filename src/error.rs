use std::error::Error;
use std::fmt;

use crate::archive::ArchiveError;
use crate::density::DensityEstimatorError;
use crate::genetic::PopulationError;
use crate::non_dominated_sorting::DominanceError;
use crate::operators::survival::SurvivalError;

/// Any error raised by the crate, for callers that drive several components.
#[derive(Debug, Clone, PartialEq)]
pub enum MoeaError {
    Population(PopulationError),
    Dominance(DominanceError),
    Density(DensityEstimatorError),
    Survival(SurvivalError),
    Archive(ArchiveError),
}

impl fmt::Display for MoeaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoeaError::Population(e) => write!(f, "Population error: {}", e),
            MoeaError::Dominance(e) => write!(f, "Dominance error: {}", e),
            MoeaError::Density(e) => write!(f, "Density estimation error: {}", e),
            MoeaError::Survival(e) => write!(f, "Survival error: {}", e),
            MoeaError::Archive(e) => write!(f, "Archive error: {}", e),
        }
    }
}

impl Error for MoeaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MoeaError::Population(e) => Some(e),
            MoeaError::Dominance(e) => Some(e),
            MoeaError::Density(e) => Some(e),
            MoeaError::Survival(e) => Some(e),
            MoeaError::Archive(e) => Some(e),
        }
    }
}

impl From<PopulationError> for MoeaError {
    fn from(e: PopulationError) -> Self {
        MoeaError::Population(e)
    }
}

impl From<DominanceError> for MoeaError {
    fn from(e: DominanceError) -> Self {
        MoeaError::Dominance(e)
    }
}

impl From<DensityEstimatorError> for MoeaError {
    fn from(e: DensityEstimatorError) -> Self {
        MoeaError::Density(e)
    }
}

impl From<SurvivalError> for MoeaError {
    fn from(e: SurvivalError) -> Self {
        MoeaError::Survival(e)
    }
}

impl From<ArchiveError> for MoeaError {
    fn from(e: ArchiveError) -> Self {
        MoeaError::Archive(e)
    }
}
