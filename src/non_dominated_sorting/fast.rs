use log::trace;
use rayon::prelude::*;

use crate::genetic::Population;
use crate::non_dominated_sorting::dominator::{
    Dominance, DominanceComparator, DominanceError, ParetoDominance, check_population,
};
use crate::non_dominated_sorting::{NonDominatedSorting, Ranking};
use crate::operators::GeneticOperator;

/// Deb's fast non-dominated sort, `O(M * N^2)`.
///
/// The pairwise comparison pass runs on the rayon pool. Every worker only produces the
/// dominance pairs of its own row and the pairs are applied in row order afterwards,
/// so the result does not depend on scheduling.
#[derive(Debug, Clone, Default)]
pub struct FastNonDominatedSorting<C: DominanceComparator = ParetoDominance> {
    comparator: C,
}

impl<C: DominanceComparator> FastNonDominatedSorting<C> {
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Sorts until the cumulative number of individuals in the emitted fronts reaches
    /// `min_survivors`. The front that reaches it is included entirely and no further
    /// fronts are built; individuals left out have no rank.
    pub fn compute_until(
        &self,
        population: &Population,
        min_survivors: usize,
    ) -> Result<Ranking, DominanceError> {
        check_population(population)?;
        let fronts = sort_fronts(population, &self.comparator, min_survivors);
        Ok(Ranking::from_fronts(fronts, population.len()))
    }
}

impl<C: DominanceComparator> GeneticOperator for FastNonDominatedSorting<C> {
    fn name(&self) -> String {
        "FastNonDominatedSorting".to_string()
    }
}

impl<C: DominanceComparator> NonDominatedSorting for FastNonDominatedSorting<C> {
    fn compute(&self, population: &Population) -> Result<Ranking, DominanceError> {
        self.compute_until(population, population.len())
    }
}

/// Fast non-dominated sorting of a population with Pareto dominance.
/// Returns a vector of fronts, each front is a sorted list of indices.
pub fn fast_non_dominated_sorting(
    population: &Population,
    min_survivors: usize,
) -> Result<Vec<Vec<usize>>, DominanceError> {
    FastNonDominatedSorting::new(ParetoDominance)
        .compute_until(population, min_survivors)
        .map(Ranking::into_fronts)
}

fn sort_fronts<C: DominanceComparator>(
    population: &Population,
    comparator: &C,
    min_survivors: usize,
) -> Vec<Vec<usize>> {
    let population_size = population.len();
    if population_size == 0 {
        return Vec::new();
    }

    // For each row p, the (dominator, dominated) pairs found against rows q > p.
    let pairs: Vec<Vec<(usize, usize)>> = (0..population_size)
        .into_par_iter()
        .map(|p| {
            let view_p = population.view(p);
            let mut local_updates = Vec::new();
            for q in (p + 1)..population_size {
                match comparator.dominance(&view_p, &population.view(q)) {
                    Dominance::LeftDominates => local_updates.push((p, q)),
                    Dominance::RightDominates => local_updates.push((q, p)),
                    Dominance::NonDominated => {}
                }
            }
            local_updates
        })
        .collect();

    let mut domination_count = vec![0usize; population_size];
    let mut dominated_sets: Vec<Vec<usize>> = vec![Vec::new(); population_size];
    for (dominator, dominated) in pairs.into_iter().flatten() {
        dominated_sets[dominator].push(dominated);
        domination_count[dominated] += 1;
    }

    let first_front: Vec<usize> = (0..population_size)
        .filter(|&i| domination_count[i] == 0)
        .collect();
    let mut count = first_front.len();
    let mut fronts = vec![first_front];

    while count < min_survivors {
        let mut next_front = Vec::new();
        if let Some(current_front) = fronts.last() {
            for &p in current_front {
                for &q in &dominated_sets[p] {
                    domination_count[q] -= 1;
                    if domination_count[q] == 0 {
                        next_front.push(q);
                    }
                }
            }
        }
        if next_front.is_empty() {
            break;
        }
        count += next_front.len();
        fronts.push(next_front);
    }

    trace!(
        "fast non-dominated sort: {} individuals in {} fronts",
        count,
        fronts.len()
    );
    fronts
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::non_dominated_sorting::ConstrainedDominance;
    use ndarray::{Array2, array};

    #[test]
    fn test_fast_non_dominated_sorting() {
        let population = Population::from_fitness(array![
            [1.0, 2.0], // Individual 0
            [2.0, 1.0], // Individual 1
            [1.5, 1.5], // Individual 2
            [3.0, 4.0], // Individual 3 (dominated by everyone)
            [4.0, 3.0]  // Individual 4 (dominated by everyone)
        ]);

        let fronts = fast_non_dominated_sorting(&population, 5).unwrap();
        assert_eq!(fronts, vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_fast_non_dominated_sorting_single_front() {
        let population = Population::from_fitness(array![[1.0, 2.0], [2.0, 1.0], [1.5, 1.5]]);
        let fronts = fast_non_dominated_sorting(&population, 3).unwrap();
        assert_eq!(fronts, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_fast_non_dominated_sorting_empty_population() {
        let population = Population::from_fitness(Array2::zeros((0, 2)));
        let ranking = FastNonDominatedSorting::new(ParetoDominance)
            .compute(&population)
            .unwrap();
        assert!(ranking.is_empty());
        assert_eq!(ranking.number_of_fronts(), 0);
    }

    #[test]
    fn test_fast_non_dominated_sorting_n_survive_cut() {
        let population = Population::from_fitness(array![
            [1.0, 1.0], // Individual 0: best
            [2.0, 2.0], // Individual 1: dominated by 0
            [2.0, 2.0], // Individual 2: duplicate of 1, same front as 1
            [3.0, 3.0], // Individual 3
            [4.0, 4.0]  // Individual 4
        ]);

        // The second front reaches the requested count, it is included entirely.
        let fronts = fast_non_dominated_sorting(&population, 2).unwrap();
        assert_eq!(fronts, vec![vec![0], vec![1, 2]]);

        let ranking = FastNonDominatedSorting::new(ParetoDominance)
            .compute_until(&population, 2)
            .unwrap();
        assert_eq!(ranking.rank_of(2), Some(1));
        assert_eq!(ranking.rank_of(3), None);
    }

    #[test]
    fn test_identical_vectors_share_a_front() {
        let population = Population::from_fitness(Array2::from_elem((4, 3), 0.5));
        let ranking = FastNonDominatedSorting::new(ParetoDominance)
            .compute(&population)
            .unwrap();
        assert_eq!(ranking.fronts(), &[vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_constrained_sorting_puts_feasible_first() {
        // The infeasible individual has the best objectives but still ends up last.
        let fitness = array![[0.0, 0.0], [1.0, 2.0], [2.0, 1.0]];
        let constraints = Some(array![[1.0], [-1.0], [0.0]]);
        let population = Population::new(Array2::zeros((3, 0)), fitness, constraints, None);

        let ranking = FastNonDominatedSorting::new(ConstrainedDominance)
            .compute(&population)
            .unwrap();
        assert_eq!(ranking.fronts(), &[vec![1, 2], vec![0]]);

        let unconstrained = FastNonDominatedSorting::new(ParetoDominance)
            .compute(&population)
            .unwrap();
        assert_eq!(unconstrained.fronts(), &[vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_zero_objectives_is_rejected() {
        let population = Population::from_fitness(Array2::zeros((3, 0)));
        assert_eq!(
            FastNonDominatedSorting::new(ParetoDominance).compute(&population),
            Err(DominanceError::EmptyObjectives)
        );
    }
}
