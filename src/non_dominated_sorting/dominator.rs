use std::error::Error;
use std::fmt::{self, Debug};

use ndarray::ArrayView1;

use crate::genetic::{Population, SolutionView};

/// Outcome of a pairwise dominance check between a left and a right solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dominance {
    LeftDominates,
    RightDominates,
    NonDominated,
}

/// Precondition violations detected before comparing two solutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DominanceError {
    EmptyObjectives,
    ObjectiveLengthMismatch { left: usize, right: usize },
    ConstraintLengthMismatch { left: usize, right: usize },
}

impl fmt::Display for DominanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DominanceError::EmptyObjectives => {
                write!(f, "Dominance comparison requires at least one objective")
            }
            DominanceError::ObjectiveLengthMismatch { left, right } => write!(
                f,
                "Cannot compare objective vectors of different lengths ({} vs {})",
                left, right
            ),
            DominanceError::ConstraintLengthMismatch { left, right } => write!(
                f,
                "Cannot compare constraint vectors of different lengths ({} vs {})",
                left, right
            ),
        }
    }
}

impl Error for DominanceError {}

/// Single pass Pareto comparison of two objective vectors of equal length.
#[inline]
pub fn pareto_dominance(f1: &ArrayView1<f64>, f2: &ArrayView1<f64>) -> Dominance {
    let mut left_better = false;
    let mut right_better = false;
    for (&a, &b) in f1.iter().zip(f2.iter()) {
        if a < b {
            left_better = true;
        } else if b < a {
            right_better = true;
        }
        if left_better && right_better {
            return Dominance::NonDominated;
        }
    }
    match (left_better, right_better) {
        (true, false) => Dominance::LeftDominates,
        (false, true) => Dominance::RightDominates,
        _ => Dominance::NonDominated,
    }
}

/// Checks that two solutions can be compared: non-empty objective vectors of the same
/// length, and constraint vectors that are either both absent or of the same length.
/// A missing constraint vector counts as a vector of length zero.
pub fn check_compatible(a: &SolutionView, b: &SolutionView) -> Result<(), DominanceError> {
    let (left, right) = (a.fitness.len(), b.fitness.len());
    if left == 0 || right == 0 {
        return Err(DominanceError::EmptyObjectives);
    }
    if left != right {
        return Err(DominanceError::ObjectiveLengthMismatch { left, right });
    }
    let left_c = a.constraints.as_ref().map_or(0, |c| c.len());
    let right_c = b.constraints.as_ref().map_or(0, |c| c.len());
    if left_c != right_c {
        return Err(DominanceError::ConstraintLengthMismatch {
            left: left_c,
            right: right_c,
        });
    }
    Ok(())
}

/// A population stores its rows in matrices, so only the column counts need checking.
pub fn check_population(population: &Population) -> Result<(), DominanceError> {
    if population.is_empty() {
        return Ok(());
    }
    if population.n_objectives() == 0 {
        return Err(DominanceError::EmptyObjectives);
    }
    Ok(())
}

/// Pairwise ordering of two solutions.
pub trait DominanceComparator: Debug + Send + Sync {
    /// Compares two solutions assuming `check_compatible` already holds.
    fn dominance(&self, a: &SolutionView, b: &SolutionView) -> Dominance;

    /// Validates the preconditions and compares.
    fn compare(&self, a: &SolutionView, b: &SolutionView) -> Result<Dominance, DominanceError> {
        check_compatible(a, b)?;
        Ok(self.dominance(a, b))
    }
}

/// Classic Pareto dominance over the objective vectors. Constraints are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoDominance;

impl DominanceComparator for ParetoDominance {
    fn dominance(&self, a: &SolutionView, b: &SolutionView) -> Dominance {
        pareto_dominance(&a.fitness, &b.fitness)
    }
}

/// Constraint-aware dominance: lower total violation wins, so a feasible solution
/// dominates any infeasible one. Ties in violation fall back to Pareto dominance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedDominance;

impl DominanceComparator for ConstrainedDominance {
    fn dominance(&self, a: &SolutionView, b: &SolutionView) -> Dominance {
        let violation_a = a.constraint_violation();
        let violation_b = b.constraint_violation();
        if violation_a < violation_b {
            Dominance::LeftDominates
        } else if violation_b < violation_a {
            Dominance::RightDominates
        } else {
            pareto_dominance(&a.fitness, &b.fitness)
        }
    }
}
