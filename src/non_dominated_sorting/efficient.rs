use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::genetic::Population;
use crate::non_dominated_sorting::dominator::{
    Dominance, DominanceComparator, DominanceError, ParetoDominance, check_population,
};
use crate::non_dominated_sorting::{NonDominatedSorting, Ranking};
use crate::operators::GeneticOperator;

/// Efficient non-dominated sort with sequential search (ENS-SS, Zhang et al. 2015).
///
/// Individuals are presorted by total constraint violation and then lexicographically by
/// their objectives, so a solution can only be dominated by solutions placed before it.
/// Each solution then joins the first front holding no member that dominates it.
/// For comparators consistent with that presort (both `ParetoDominance` and
/// `ConstrainedDominance` are) the partition equals the one of the fast sort.
#[derive(Debug, Clone, Default)]
pub struct EfficientNonDominatedSorting<C: DominanceComparator = ParetoDominance> {
    comparator: C,
}

impl<C: DominanceComparator> EfficientNonDominatedSorting<C> {
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }
}

impl<C: DominanceComparator> GeneticOperator for EfficientNonDominatedSorting<C> {
    fn name(&self) -> String {
        "EfficientNonDominatedSorting".to_string()
    }
}

impl<C: DominanceComparator> NonDominatedSorting for EfficientNonDominatedSorting<C> {
    fn compute(&self, population: &Population) -> Result<Ranking, DominanceError> {
        check_population(population)?;
        let n = population.len();

        let violations: Vec<f64> = (0..n)
            .map(|i| population.view(i).constraint_violation())
            .collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| presort(population, &violations, a, b));

        let mut fronts: Vec<Vec<usize>> = Vec::new();
        for &candidate in &order {
            let view = population.view(candidate);
            let position = fronts.iter().position(|front| {
                !front.iter().any(|&member| {
                    self.comparator.dominance(&population.view(member), &view)
                        == Dominance::LeftDominates
                })
            });
            match position {
                Some(k) => fronts[k].push(candidate),
                None => fronts.push(vec![candidate]),
            }
        }

        Ok(Ranking::from_fronts(fronts, n))
    }
}

fn presort(population: &Population, violations: &[f64], a: usize, b: usize) -> Ordering {
    OrderedFloat(violations[a])
        .cmp(&OrderedFloat(violations[b]))
        .then_with(|| {
            population
                .fitness
                .row(a)
                .iter()
                .zip(population.fitness.row(b).iter())
                .map(|(&x, &y)| OrderedFloat(x).cmp(&OrderedFloat(y)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(&b))
}
