use log::debug;
use ndarray::{Array1, Axis};

use crate::density::{CrowdingDistance, DensityEstimator, DensityScores};
use crate::genetic::Population;
use crate::non_dominated_sorting::{
    ConstrainedDominance, FastNonDominatedSorting, NonDominatedSorting,
};
use crate::operators::GeneticOperator;
use crate::operators::survival::{SurvivalError, SurvivalOperator};

/// How the boundary front is truncated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Score the boundary front once and keep its most preferred members.
    #[default]
    OneShot,
    /// Drop the least preferred member one at a time, rescoring the front after
    /// every removal.
    Sequential,
}

/// Ranking based replacement: whole fronts are accepted while they fit and the first
/// front that overflows is truncated with a density estimator.
///
/// The truncation is greedy, not a subset maximizing diversity.
#[derive(Clone, Debug)]
pub struct RankAndDensitySurvival<S, D> {
    sorter: S,
    estimator: D,
    removal_policy: RemovalPolicy,
    score_all_fronts: bool,
}

/// Survivor indices with their rank and, when every survivor was scored, their score.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    indices: Vec<usize>,
    ranks: Vec<usize>,
    scores: Vec<f64>,
}

impl RankAndDensitySurvival<FastNonDominatedSorting<ConstrainedDominance>, CrowdingDistance> {
    /// NSGA-II replacement: constrained fast non-dominated sort and crowding distance,
    /// with every survivor carrying its crowding distance.
    pub fn nsga2() -> Self {
        Self::new(
            FastNonDominatedSorting::new(ConstrainedDominance),
            CrowdingDistance,
        )
        .with_score_all_fronts(true)
    }
}

impl<S, D> RankAndDensitySurvival<S, D>
where
    S: NonDominatedSorting,
    D: DensityEstimator,
{
    pub fn new(sorter: S, estimator: D) -> Self {
        Self {
            sorter,
            estimator,
            removal_policy: RemovalPolicy::OneShot,
            score_all_fronts: false,
        }
    }

    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    /// Also score the fronts accepted whole, so every survivor carries a survival score.
    pub fn with_score_all_fronts(mut self, score_all_fronts: bool) -> Self {
        self.score_all_fronts = score_all_fronts;
        self
    }

    pub fn estimator(&self) -> &D {
        &self.estimator
    }

    pub fn sorter(&self) -> &S {
        &self.sorter
    }

    /// Indices into `population` of the `n_survive` survivors, whole fronts first and then
    /// the chosen boundary members, most preferred first.
    pub fn select_indices(
        &self,
        population: &Population,
        n_survive: usize,
    ) -> Result<Vec<usize>, SurvivalError> {
        Ok(self.select(population, n_survive)?.indices)
    }

    fn select(
        &self,
        population: &Population,
        n_survive: usize,
    ) -> Result<Selection, SurvivalError> {
        if n_survive > population.len() {
            return Err(SurvivalError::NotEnoughIndividuals {
                requested: n_survive,
                available: population.len(),
            });
        }

        let ranking = self.sorter.compute(population)?;
        let mut selection = Selection {
            indices: Vec::with_capacity(n_survive),
            ranks: Vec::with_capacity(n_survive),
            scores: Vec::with_capacity(n_survive),
        };

        for (front_index, front) in ranking.iter().enumerate() {
            let remaining = n_survive - selection.indices.len();
            if remaining == 0 {
                break;
            }

            if front.len() <= remaining {
                // The entire front fits.
                if self.score_all_fronts {
                    let scores = self.score(population, front)?;
                    selection.scores.extend(scores.values().iter());
                }
                selection.indices.extend_from_slice(front);
                selection.ranks.extend(std::iter::repeat_n(front_index, front.len()));
                continue;
            }

            debug!(
                "{}: boundary front {} of size {} truncated to {}",
                self.name(),
                front_index,
                front.len(),
                remaining
            );
            let (chosen, scores) = match self.removal_policy {
                RemovalPolicy::OneShot => self.truncate_one_shot(population, front, remaining)?,
                RemovalPolicy::Sequential => {
                    self.truncate_sequential(population, front, remaining)?
                }
            };
            selection.indices.extend_from_slice(&chosen);
            selection.ranks.extend(std::iter::repeat_n(front_index, chosen.len()));
            selection.scores.extend(scores);
            break;
        }

        debug!(
            "{}: {} survivors out of {} across {} fronts",
            self.name(),
            selection.indices.len(),
            population.len(),
            ranking.number_of_fronts()
        );
        Ok(selection)
    }

    fn score(
        &self,
        population: &Population,
        members: &[usize],
    ) -> Result<DensityScores, SurvivalError> {
        let fitness = population.fitness.select(Axis(0), members);
        Ok(self.estimator.compute(&fitness)?)
    }

    fn truncate_one_shot(
        &self,
        population: &Population,
        front: &[usize],
        keep: usize,
    ) -> Result<(Vec<usize>, Vec<f64>), SurvivalError> {
        let scores = self.score(population, front)?;
        let order: Vec<usize> = scores.preference_order().into_iter().take(keep).collect();
        let chosen = order.iter().map(|&i| front[i]).collect();
        let chosen_scores = order.iter().map(|&i| scores.value(i)).collect();
        Ok((chosen, chosen_scores))
    }

    fn truncate_sequential(
        &self,
        population: &Population,
        front: &[usize],
        keep: usize,
    ) -> Result<(Vec<usize>, Vec<f64>), SurvivalError> {
        let mut members = front.to_vec();
        while members.len() > keep {
            let scores = self.score(population, &members)?;
            match scores.least_preferred() {
                Some(worst) => {
                    members.remove(worst);
                }
                None => break,
            }
        }
        let scores = self.score(population, &members)?;
        let order = scores.preference_order();
        let chosen = order.iter().map(|&i| members[i]).collect();
        let chosen_scores = order.iter().map(|&i| scores.value(i)).collect();
        Ok((chosen, chosen_scores))
    }
}

impl<S, D> GeneticOperator for RankAndDensitySurvival<S, D>
where
    S: NonDominatedSorting,
    D: DensityEstimator,
{
    fn name(&self) -> String {
        format!("RankAndDensitySurvival({})", self.estimator.name())
    }
}

impl<S, D> SurvivalOperator for RankAndDensitySurvival<S, D>
where
    S: NonDominatedSorting,
    D: DensityEstimator,
{
    fn operate(
        &self,
        population: Population,
        n_survive: usize,
    ) -> Result<Population, SurvivalError> {
        let selection = self.select(&population, n_survive)?;
        let mut survivors = population.selected(&selection.indices);
        survivors.set_rank(Array1::from(selection.ranks))?;
        survivors.survival_score = None;
        if selection.scores.len() == selection.indices.len() {
            survivors.set_survival_score(Array1::from(selection.scores))?;
        }
        Ok(survivors)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::density::{AdaptiveGrid, HypervolumeContribution, KNearestNeighbors};
    use crate::non_dominated_sorting::{EfficientNonDominatedSorting, ParetoDominance};
    use ndarray::{Array2, array};
    use rstest::rstest;

    fn crowding_survival() -> RankAndDensitySurvival<FastNonDominatedSorting, CrowdingDistance> {
        RankAndDensitySurvival::new(FastNonDominatedSorting::new(ParetoDominance), CrowdingDistance)
    }

    #[test]
    fn test_survival_multiple_fronts() {
        //   front 0: (0, 2), (1, 1), (2, 0)
        //   front 1: (1, 3), (2, 2), (3, 1)
        //   front 2: (4, 4)
        let fitness = array![
            [0.0, 2.0],
            [1.0, 1.0],
            [2.0, 0.0],
            [1.0, 3.0],
            [2.0, 2.0],
            [3.0, 1.0],
            [4.0, 4.0]
        ];
        let population = Population::from_fitness(fitness);

        let survivors = crowding_survival().operate(population, 5).unwrap();
        assert_eq!(survivors.len(), 5);
        // Front 0 fits whole; from front 1 the two extremes win over (2, 2).
        assert_eq!(
            survivors.fitness,
            array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0], [1.0, 3.0], [3.0, 1.0]]
        );
        assert_eq!(survivors.rank, Some(array![0, 0, 0, 1, 1]));
        assert!(survivors.survival_score.is_none());
    }

    #[rstest(
        n_survive,
        case(0),
        case(1),
        case(3),
        case(4),
        case(7)
    )]
    fn test_survival_returns_exactly_n(n_survive: usize) {
        let fitness = array![
            [0.0, 2.0],
            [1.0, 1.0],
            [2.0, 0.0],
            [1.0, 3.0],
            [2.0, 2.0],
            [3.0, 1.0],
            [4.0, 4.0]
        ];
        let population = Population::from_fitness(fitness);
        let indices = crowding_survival()
            .select_indices(&population, n_survive)
            .unwrap();
        assert_eq!(indices.len(), n_survive);
        if n_survive >= 3 {
            assert_eq!(&indices[..3], &[0, 1, 2]);
        }
    }

    #[test]
    fn test_survival_not_enough_individuals() {
        let population = Population::from_fitness(array![[1.0, 1.0]]);
        assert_eq!(
            crowding_survival().operate(population, 2),
            Err(SurvivalError::NotEnoughIndividuals {
                requested: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_nsga2_scores_every_survivor() {
        let population = Population::from_fitness(array![
            [1.0, 5.0],
            [2.0, 4.0],
            [3.0, 3.0],
            [4.0, 2.0],
            [5.0, 1.0],
            [6.0, 6.0]
        ]);
        let survivors = RankAndDensitySurvival::nsga2().operate(population, 5).unwrap();
        assert_eq!(survivors.rank, Some(Array1::zeros(5)));
        assert_eq!(
            survivors.survival_score,
            Some(array![f64::INFINITY, 1.0, 1.0, 1.0, f64::INFINITY])
        );
    }

    #[test]
    fn test_nsga2_puts_feasible_first() {
        let fitness = array![[0.0, 0.0], [1.0, 2.0], [2.0, 1.0]];
        let constraints = Some(array![[1.0], [-1.0], [0.0]]);
        let population = Population::new(Array2::zeros((3, 0)), fitness, constraints, None);
        let indices = RankAndDensitySurvival::nsga2()
            .select_indices(&population, 2)
            .unwrap();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_minimized_estimator_keeps_lowest_scores() {
        // One front; the grid puts 0, 1 and 2 in one cell and 3, 4 alone.
        let population = Population::from_fitness(array![
            [0.0, 4.0],
            [0.2, 3.9],
            [0.4, 3.8],
            [2.5, 1.5],
            [4.0, 0.0]
        ]);
        let survival = RankAndDensitySurvival::new(
            EfficientNonDominatedSorting::new(ParetoDominance),
            AdaptiveGrid::new(2).unwrap(),
        );
        let indices = survival.select_indices(&population, 3).unwrap();
        assert_eq!(indices, vec![3, 4, 0]);
    }

    #[test]
    fn test_sequential_removal() {
        // (1.5, 3.5) owns the smallest exclusive box and is dropped.
        let population = Population::from_fitness(array![
            [1.0, 4.0],
            [1.5, 3.5],
            [2.0, 3.0],
            [4.0, 1.0]
        ]);
        let survival = RankAndDensitySurvival::new(
            FastNonDominatedSorting::new(ParetoDominance),
            HypervolumeContribution::with_reference_point(array![5.0, 5.0]).unwrap(),
        )
        .with_removal_policy(RemovalPolicy::Sequential);
        let mut indices = survival.select_indices(&population, 3).unwrap();
        assert_eq!(indices.len(), 3);
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_estimator_error_is_reported() {
        // A 3-NN estimator cannot score a boundary front of three.
        let population = Population::from_fitness(array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0]]);
        let survival = RankAndDensitySurvival::new(
            FastNonDominatedSorting::new(ParetoDominance),
            KNearestNeighbors::new(3, false).unwrap(),
        );
        assert!(matches!(
            survival.operate(population, 2),
            Err(SurvivalError::Density(_))
        ));
    }
}
