use std::collections::BTreeMap;

use crate::genetic::Population;
use crate::non_dominated_sorting::dominator::{
    Dominance, DominanceComparator, DominanceError, ParetoDominance, check_population,
};
use crate::non_dominated_sorting::{NonDominatedSorting, Ranking};
use crate::operators::GeneticOperator;

/// SPEA2 strength ranking.
///
/// The strength `S(i)` of an individual is the number of individuals it dominates and its
/// raw fitness `R(i)` is the sum of the strengths of its dominators. Fronts group equal raw
/// fitness values in ascending order, so front 0 is still the non-dominated set but later
/// fronts do not follow Pareto depth.
#[derive(Debug, Clone, Default)]
pub struct StrengthRanking<C: DominanceComparator = ParetoDominance> {
    comparator: C,
}

impl<C: DominanceComparator> StrengthRanking<C> {
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    /// Raw fitness of every individual, `0` for the non-dominated ones.
    pub fn raw_fitness(&self, population: &Population) -> Result<Vec<usize>, DominanceError> {
        check_population(population)?;
        let n = population.len();
        let mut strength = vec![0usize; n];
        let mut dominators: Vec<Vec<usize>> = vec![Vec::new(); n];

        for p in 0..n {
            for q in (p + 1)..n {
                match self
                    .comparator
                    .dominance(&population.view(p), &population.view(q))
                {
                    Dominance::LeftDominates => {
                        strength[p] += 1;
                        dominators[q].push(p);
                    }
                    Dominance::RightDominates => {
                        strength[q] += 1;
                        dominators[p].push(q);
                    }
                    Dominance::NonDominated => {}
                }
            }
        }

        Ok(dominators
            .iter()
            .map(|ds| ds.iter().map(|&d| strength[d]).sum())
            .collect())
    }
}

impl<C: DominanceComparator> GeneticOperator for StrengthRanking<C> {
    fn name(&self) -> String {
        "StrengthRanking".to_string()
    }
}

impl<C: DominanceComparator> NonDominatedSorting for StrengthRanking<C> {
    fn compute(&self, population: &Population) -> Result<Ranking, DominanceError> {
        let raw = self.raw_fitness(population)?;
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &r) in raw.iter().enumerate() {
            groups.entry(r).or_default().push(i);
        }
        Ok(Ranking::from_fronts(
            groups.into_values().collect(),
            population.len(),
        ))
    }
}
