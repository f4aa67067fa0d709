use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::archive::{Archive, ArchiveError, NonDominatedArchive, fitness_matrix};
use crate::density::{
    AdaptiveGrid, CrowdingDistance, DensityEstimator, DensityScores, HypervolumeContribution,
};
use crate::genetic::Individual;
use crate::non_dominated_sorting::{DominanceComparator, ParetoDominance};

/// Non-dominated archive holding at most `capacity` solutions.
///
/// When an accepted solution pushes the archive over capacity the density estimator is
/// recomputed over all members and the least preferred one is evicted, repeatedly, until
/// the capacity holds again. Among equally least preferred members the earliest inserted
/// one goes.
#[derive(Debug, Clone)]
pub struct BoundedArchive<C: DominanceComparator, D: DensityEstimator> {
    archive: NonDominatedArchive<C>,
    estimator: D,
    capacity: usize,
}

impl BoundedArchive<ParetoDominance, CrowdingDistance> {
    /// Crowding distance archive (NSGA-II, MOCell, AbYSS).
    pub fn crowding(capacity: usize) -> Result<Self, ArchiveError> {
        Self::new(capacity, ParetoDominance, CrowdingDistance)
    }
}

impl BoundedArchive<ParetoDominance, HypervolumeContribution> {
    /// Evicts the smallest hypervolume contributor, reference point at nadir + 1.
    pub fn hypervolume(capacity: usize) -> Result<Self, ArchiveError> {
        Self::new(capacity, ParetoDominance, HypervolumeContribution::default())
    }
}

impl BoundedArchive<ParetoDominance, AdaptiveGrid> {
    /// PAES archive: evicts from the most crowded grid cell.
    pub fn adaptive_grid(capacity: usize, bisections: usize) -> Result<Self, ArchiveError> {
        Self::new(capacity, ParetoDominance, AdaptiveGrid::new(bisections)?)
    }
}

impl<C: DominanceComparator, D: DensityEstimator> BoundedArchive<C, D> {
    pub fn new(capacity: usize, comparator: C, estimator: D) -> Result<Self, ArchiveError> {
        if capacity == 0 {
            return Err(ArchiveError::InvalidCapacity(capacity));
        }
        Ok(Self {
            archive: NonDominatedArchive::new(comparator),
            estimator,
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn estimator(&self) -> &D {
        &self.estimator
    }

    /// The current members, the optimization result of archive based algorithms.
    pub fn solution_list(&self) -> &[Individual] {
        self.archive.solutions()
    }

    /// Density scores of the current members, in member order.
    pub fn density(&self) -> Result<DensityScores, ArchiveError> {
        let rows: Vec<_> = self.archive.solutions().iter().map(|s| s.fitness.view()).collect();
        Ok(self.estimator.compute(&fitness_matrix(&rows)?)?)
    }

    /// A uniformly random member, `None` when the archive is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Individual> {
        self.archive.solutions().choose(rng)
    }
}

impl<C: DominanceComparator, D: DensityEstimator> Archive for BoundedArchive<C, D> {
    /// Evictions are planned on the candidate member list before the archive changes, so
    /// an estimator error leaves the archive untouched.
    fn add(&mut self, individual: Individual) -> Result<bool, ArchiveError> {
        let Some(dominated) = self.archive.dominated_by(&individual)? else {
            return Ok(false);
        };

        // Member indices that survive the insertion, the newcomer last under index `len`.
        let newcomer = self.archive.len();
        let mut candidates: Vec<usize> = (0..newcomer)
            .filter(|i| dominated.binary_search(i).is_err())
            .collect();
        candidates.push(newcomer);

        let members = self.archive.solutions();
        while candidates.len() > self.capacity {
            let rows: Vec<_> = candidates
                .iter()
                .map(|&i| {
                    if i == newcomer {
                        individual.fitness.view()
                    } else {
                        members[i].fitness.view()
                    }
                })
                .collect();
            let scores = self.estimator.compute(&fitness_matrix(&rows)?)?;
            let Some(worst) = scores.least_preferred() else {
                break;
            };
            let evicted = candidates.remove(worst);
            debug!(
                "bounded archive: evicted {} ({} left, capacity {})",
                if evicted == newcomer {
                    "newcomer".to_string()
                } else {
                    format!("member {}", evicted)
                },
                candidates.len(),
                self.capacity
            );
        }

        let accepted = candidates.last() == Some(&newcomer);
        if accepted {
            candidates.pop();
        }
        self.archive
            .retain_indices(&candidates, accepted.then_some(individual));
        Ok(accepted)
    }

    fn solutions(&self) -> &[Individual] {
        self.archive.solutions()
    }
}
