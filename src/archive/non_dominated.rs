use log::trace;

use crate::archive::{Archive, ArchiveError};
use crate::genetic::Individual;
use crate::non_dominated_sorting::{
    Dominance, DominanceComparator, DominanceError, ParetoDominance,
};

/// Unbounded archive of mutually non-dominated solutions.
#[derive(Debug, Clone, Default)]
pub struct NonDominatedArchive<C: DominanceComparator = ParetoDominance> {
    comparator: C,
    members: Vec<Individual>,
}

impl<C: DominanceComparator> NonDominatedArchive<C> {
    pub fn new(comparator: C) -> Self {
        Self {
            comparator,
            members: Vec::new(),
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Indices of the members dominated by `individual`, or `None` when a member
    /// dominates it.
    pub(crate) fn dominated_by(
        &self,
        individual: &Individual,
    ) -> Result<Option<Vec<usize>>, ArchiveError> {
        if individual.fitness.is_empty() {
            return Err(DominanceError::EmptyObjectives.into());
        }
        let candidate = individual.view();
        let mut dominated = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            match self.comparator.compare(&member.view(), &candidate)? {
                Dominance::LeftDominates => return Ok(None),
                Dominance::RightDominates => dominated.push(i),
                Dominance::NonDominated => {}
            }
        }
        Ok(Some(dominated))
    }

    /// Keeps the members at the sorted indices `keep`, then appends `newcomer`.
    pub(crate) fn retain_indices(&mut self, keep: &[usize], newcomer: Option<Individual>) {
        let members = std::mem::take(&mut self.members);
        self.members = members
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep.binary_search(i).is_ok())
            .map(|(_, member)| member)
            .collect();
        self.members.extend(newcomer);
    }
}

impl<C: DominanceComparator> Archive for NonDominatedArchive<C> {
    /// Rejects the solution when a member dominates it, otherwise drops every member it
    /// dominates and appends it. Solutions equal to a member are kept.
    fn add(&mut self, individual: Individual) -> Result<bool, ArchiveError> {
        let Some(dominated) = self.dominated_by(&individual)? else {
            return Ok(false);
        };
        if !dominated.is_empty() {
            trace!("archive: newcomer dominates {} members", dominated.len());
            let keep: Vec<usize> = (0..self.members.len())
                .filter(|i| dominated.binary_search(i).is_err())
                .collect();
            self.retain_indices(&keep, Some(individual));
        } else {
            self.members.push(individual);
        }
        Ok(true)
    }

    fn solutions(&self) -> &[Individual] {
        &self.members
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::non_dominated_sorting::ConstrainedDominance;
    use ndarray::array;

    #[test]
    fn test_dominated_members_are_removed() {
        let mut archive = NonDominatedArchive::new(ParetoDominance);
        assert!(archive.add(Individual::from_fitness(array![1.0, 1.0])).unwrap());
        assert!(archive.add(Individual::from_fitness(array![0.0, 3.0])).unwrap());
        assert!(archive.add(Individual::from_fitness(array![0.5, 0.5])).unwrap());
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.solutions()[0].fitness, array![0.0, 3.0]);
        assert_eq!(archive.solutions()[1].fitness, array![0.5, 0.5]);
    }

    #[test]
    fn test_dominated_newcomer_is_rejected() {
        let mut archive = NonDominatedArchive::new(ParetoDominance);
        archive.add(Individual::from_fitness(array![0.0, 0.0])).unwrap();
        assert!(!archive.add(Individual::from_fitness(array![0.0, 5.0])).unwrap());
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_equal_solutions_are_kept() {
        let mut archive = NonDominatedArchive::new(ParetoDominance);
        archive.add(Individual::from_fitness(array![1.0, 2.0])).unwrap();
        assert!(archive.add(Individual::from_fitness(array![1.0, 2.0])).unwrap());
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_constrained_archive_prefers_feasible() {
        let mut archive = NonDominatedArchive::new(ConstrainedDominance);
        let infeasible = Individual::new(array![], array![0.0, 0.0], Some(array![1.0]), None, None);
        let feasible = Individual::new(array![], array![5.0, 5.0], Some(array![0.0]), None, None);
        archive.add(infeasible).unwrap();
        assert!(archive.add(feasible).unwrap());
        assert_eq!(archive.len(), 1);
        assert!(archive.solutions()[0].is_feasible());
    }

    #[test]
    fn test_mismatched_objectives_error() {
        let mut archive = NonDominatedArchive::new(ParetoDominance);
        archive.add(Individual::from_fitness(array![1.0, 2.0])).unwrap();
        assert_eq!(
            archive.add(Individual::from_fitness(array![1.0])),
            Err(ArchiveError::Dominance(
                DominanceError::ObjectiveLengthMismatch { left: 2, right: 1 }
            ))
        );
    }

    #[test]
    fn test_to_population() {
        let mut archive = NonDominatedArchive::new(ParetoDominance);
        archive.add(Individual::from_fitness(array![1.0, 2.0])).unwrap();
        archive.add(Individual::from_fitness(array![2.0, 1.0])).unwrap();
        let population = archive.to_population().unwrap();
        assert_eq!(population.fitness, array![[1.0, 2.0], [2.0, 1.0]]);
    }
}
