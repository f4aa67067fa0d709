use ndarray::Array1;

use crate::genetic::{Fronts, Population};
use crate::operators::GeneticOperator;

pub mod dominator;
mod efficient;
mod fast;
mod strength;

pub use dominator::{
    ConstrainedDominance, Dominance, DominanceComparator, DominanceError, ParetoDominance,
};
pub use efficient::EfficientNonDominatedSorting;
pub use fast::{FastNonDominatedSorting, fast_non_dominated_sorting};
pub use strength::StrengthRanking;

/// Ordered fronts produced by one sorting call. Each front lists indices into the
/// population that was sorted, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    fronts: Vec<Vec<usize>>,
    rank: Vec<usize>,
}

impl Ranking {
    /// Builds a ranking from fronts covering `0..population_size` exactly once.
    /// Individuals not covered by any front (early stop) get `usize::MAX` as rank.
    pub(crate) fn from_fronts(mut fronts: Vec<Vec<usize>>, population_size: usize) -> Self {
        let mut rank = vec![usize::MAX; population_size];
        for (front_index, front) in fronts.iter_mut().enumerate() {
            front.sort_unstable();
            for &i in front.iter() {
                rank[i] = front_index;
            }
        }
        Self { fronts, rank }
    }

    /// Returns the i-th front, `None` when the ranking has fewer fronts.
    pub fn front(&self, i: usize) -> Option<&[usize]> {
        self.fronts.get(i).map(|f| f.as_slice())
    }

    pub fn fronts(&self) -> &[Vec<usize>] {
        &self.fronts
    }

    pub fn number_of_fronts(&self) -> usize {
        self.fronts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fronts.is_empty()
    }

    /// Rank of the individual at `index`, `None` when it was not assigned to a front.
    pub fn rank_of(&self, index: usize) -> Option<usize> {
        self.rank.get(index).copied().filter(|&r| r != usize::MAX)
    }

    /// Per-individual ranks, only meaningful when every individual was assigned.
    pub fn ranks(&self) -> Array1<usize> {
        Array1::from(self.rank.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.fronts.iter().map(|f| f.as_slice())
    }

    pub fn into_fronts(self) -> Vec<Vec<usize>> {
        self.fronts
    }
}

/// Partitions a population into ordered fronts.
pub trait NonDominatedSorting: GeneticOperator + Send + Sync {
    fn compute(&self, population: &Population) -> Result<Ranking, DominanceError>;

    /// Builds one sub-population per front, with the rank of every member filled in.
    fn split(&self, population: &Population) -> Result<Fronts, DominanceError> {
        let ranking = self.compute(population)?;
        Ok(build_fronts(population, &ranking))
    }
}

/// Extracts the sub-population of every front of `ranking`.
pub fn build_fronts(population: &Population, ranking: &Ranking) -> Fronts {
    ranking
        .iter()
        .enumerate()
        .map(|(front_index, indices)| {
            let mut front = population.selected(indices);
            front.rank = Some(Array1::from_elem(indices.len(), front_index));
            front
        })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    fn test_ranking_accessors() {
        let ranking = Ranking::from_fronts(vec![vec![2, 0], vec![1]], 3);
        assert_eq!(ranking.number_of_fronts(), 2);
        assert_eq!(ranking.front(0), Some(&[0, 2][..]));
        assert_eq!(ranking.front(1), Some(&[1][..]));
        assert_eq!(ranking.front(2), None);
        assert_eq!(ranking.rank_of(1), Some(1));
        assert_eq!(ranking.rank_of(7), None);
        assert_eq!(ranking.ranks(), array![0, 1, 0]);
    }

    #[test]
    fn test_build_fronts_behavior() {
        //   [1.0, 1.0] -> best, front 0.
        //   [2.0, 2.0], [1.5, 2.5], [2.5, 1.5] -> mutually non-dominated, front 1.
        //   [3.0, 3.0] -> front 2.
        let fitness = array![[1.0, 1.0], [2.0, 2.0], [1.5, 2.5], [2.5, 1.5], [3.0, 3.0]];
        let genes = fitness.clone();
        let constraints = Some(Array2::from_elem((5, 2), -1.0));
        let population = Population::new(genes, fitness, constraints, None);

        let fronts = FastNonDominatedSorting::new(ParetoDominance)
            .split(&population)
            .unwrap();

        assert_eq!(fronts.len(), 3);
        assert_eq!(fronts[0].len(), 1);
        assert_eq!(fronts[1].len(), 3);
        assert_eq!(fronts[2].len(), 1);

        for (front_index, front) in fronts.iter().enumerate() {
            let rank = front.rank.as_ref().expect("Each front should have a rank array.");
            assert_eq!(rank.len(), front.len());
            assert!(rank.iter().all(|&r| r == front_index));
            assert!(front.constraints.is_some());
        }
    }
}
