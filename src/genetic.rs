use std::error::Error;
use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, Axis, concatenate};

/// Represents the decision vector of an individual.
/// Each `IndividualGenes` is an `Array1<f64>`.
pub type IndividualGenes = Array1<f64>;

/// Type aliases to work with populations.
pub type PopulationGenes = Array2<f64>;
pub type PopulationFitness = Array2<f64>;
pub type PopulationConstraints = Array2<f64>;

/// Errors raised when the row-aligned arrays of a population disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationError {
    /// An array that must have one entry per individual has the wrong length.
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// Two populations (or individuals) disagree on whether an optional field is set.
    OptionalFieldMismatch { field: &'static str },
    /// Individuals with vectors of different lengths cannot share a matrix.
    RaggedRows {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationError::LengthMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "The {} vector has length {} but the population contains {} individuals.",
                field, found, expected
            ),
            PopulationError::OptionalFieldMismatch { field } => {
                write!(f, "Mismatched population {}: one is set and the other is None", field)
            }
            PopulationError::RaggedRows {
                field,
                expected,
                found,
            } => write!(
                f,
                "Individuals have {} vectors of different lengths ({} vs {})",
                field, expected, found
            ),
        }
    }
}

impl Error for PopulationError {}

/// Sum of the positive parts of a constraint vector. A value `<= 0` is a satisfied constraint.
pub fn constraint_violation(constraints: &ArrayView1<f64>) -> f64 {
    constraints.iter().map(|&c| c.max(0.0)).sum()
}

/// Borrowed objective/constraint rows of one solution. This is all the dominance
/// comparators ever look at.
#[derive(Debug, Clone, Copy)]
pub struct SolutionView<'a> {
    pub fitness: ArrayView1<'a, f64>,
    pub constraints: Option<ArrayView1<'a, f64>>,
}

impl<'a> SolutionView<'a> {
    pub fn new(fitness: ArrayView1<'a, f64>, constraints: Option<ArrayView1<'a, f64>>) -> Self {
        Self {
            fitness,
            constraints,
        }
    }

    /// Total constraint violation, `0.0` when there are no constraints.
    pub fn constraint_violation(&self) -> f64 {
        self.constraints
            .as_ref()
            .map_or(0.0, |c| constraint_violation(c))
    }

    pub fn is_feasible(&self) -> bool {
        self.constraint_violation() == 0.0
    }
}

/// Represents an individual with genes, fitness, constraints (if any),
/// rank, and an optional survival score.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genes: IndividualGenes,
    pub fitness: Array1<f64>,
    pub constraints: Option<Array1<f64>>,
    pub rank: Option<usize>,
    pub survival_score: Option<f64>,
}

impl Individual {
    pub fn new(
        genes: IndividualGenes,
        fitness: Array1<f64>,
        constraints: Option<Array1<f64>>,
        rank: Option<usize>,
        survival_score: Option<f64>,
    ) -> Self {
        Self {
            genes,
            fitness,
            constraints,
            rank,
            survival_score,
        }
    }

    /// Builds an individual that only carries objective values. Handy for archives fed
    /// from an external evaluator that keeps the decision vector elsewhere.
    pub fn from_fitness(fitness: Array1<f64>) -> Self {
        Self::new(Array1::zeros(0), fitness, None, None, None)
    }

    pub fn view(&self) -> SolutionView<'_> {
        SolutionView::new(
            self.fitness.view(),
            self.constraints.as_ref().map(|c| c.view()),
        )
    }

    pub fn constraint_violation(&self) -> f64 {
        self.view().constraint_violation()
    }

    pub fn is_feasible(&self) -> bool {
        self.view().is_feasible()
    }
}

/// The `Population` struct contains genes, fitness, constraints (if any),
/// rank (optional), and optionally a survival score vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub genes: PopulationGenes,
    pub fitness: PopulationFitness,
    pub constraints: Option<PopulationConstraints>,
    pub rank: Option<Array1<usize>>,
    pub survival_score: Option<Array1<f64>>,
}

impl Population {
    /// Creates a new `Population` instance with the given genes, fitness, constraints, and rank.
    /// The `survival_score` field is set to `None` by default.
    pub fn new(
        genes: PopulationGenes,
        fitness: PopulationFitness,
        constraints: Option<PopulationConstraints>,
        rank: Option<Array1<usize>>,
    ) -> Self {
        debug_assert_eq!(genes.nrows(), fitness.nrows());
        Self {
            genes,
            fitness,
            constraints,
            rank,
            survival_score: None,
        }
    }

    /// A population whose individuals carry only objective values.
    pub fn from_fitness(fitness: PopulationFitness) -> Self {
        let genes = Array2::zeros((fitness.nrows(), 0));
        Self::new(genes, fitness, None, None)
    }

    /// Stacks individuals into a population. Every individual must have vectors of the
    /// same lengths and either all or none of them must carry constraints.
    pub fn from_individuals(individuals: &[Individual]) -> Result<Population, PopulationError> {
        let n = individuals.len();
        let (n_vars, n_objectives, n_constraints) = match individuals.first() {
            Some(first) => (
                first.genes.len(),
                first.fitness.len(),
                first.constraints.as_ref().map(|c| c.len()),
            ),
            None => (0, 0, None),
        };

        let mut genes = Array2::zeros((n, n_vars));
        let mut fitness = Array2::zeros((n, n_objectives));
        let mut constraints = n_constraints.map(|m| Array2::zeros((n, m)));
        let mut rank = Array1::zeros(n);
        let mut has_rank = n > 0;

        for (i, individual) in individuals.iter().enumerate() {
            check_row_len("genes", n_vars, individual.genes.len())?;
            check_row_len("fitness", n_objectives, individual.fitness.len())?;
            genes.row_mut(i).assign(&individual.genes);
            fitness.row_mut(i).assign(&individual.fitness);
            match (&mut constraints, &individual.constraints) {
                (Some(all), Some(c)) => {
                    check_row_len("constraints", all.ncols(), c.len())?;
                    all.row_mut(i).assign(c);
                }
                (None, None) => {}
                _ => {
                    return Err(PopulationError::OptionalFieldMismatch {
                        field: "constraints",
                    });
                }
            }
            match individual.rank {
                Some(r) => rank[i] = r,
                None => has_rank = false,
            }
        }

        let rank = if has_rank { Some(rank) } else { None };
        Ok(Population::new(genes, fitness, constraints, rank))
    }

    /// Retrieves an `Individual` from the population by index.
    pub fn get(&self, idx: usize) -> Individual {
        let constraints = self.constraints.as_ref().map(|c| c.row(idx).to_owned());
        let survival_score = self.survival_score.as_ref().map(|ss| ss[idx]);
        let rank = self.rank.as_ref().map(|r| r[idx]);
        Individual::new(
            self.genes.row(idx).to_owned(),
            self.fitness.row(idx).to_owned(),
            constraints,
            rank,
            survival_score,
        )
    }

    /// Borrowed view of the objective and constraint rows of one individual.
    pub fn view(&self, idx: usize) -> SolutionView<'_> {
        SolutionView::new(
            self.fitness.row(idx),
            self.constraints.as_ref().map(|c| c.row(idx)),
        )
    }

    /// Returns a new `Population` containing only the individuals at the specified indices.
    pub fn selected(&self, indices: &[usize]) -> Population {
        let genes = self.genes.select(Axis(0), indices);
        let fitness = self.fitness.select(Axis(0), indices);
        let rank = self.rank.as_ref().map(|r| r.select(Axis(0), indices));
        let constraints = self
            .constraints
            .as_ref()
            .map(|c| c.select(Axis(0), indices));

        let mut selected_population = Population::new(genes, fitness, constraints, rank);
        selected_population.survival_score = self
            .survival_score
            .as_ref()
            .map(|ss| ss.select(Axis(0), indices));
        selected_population
    }

    /// Returns the number of individuals in the population.
    pub fn len(&self) -> usize {
        self.fitness.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_objectives(&self) -> usize {
        self.fitness.ncols()
    }

    /// Returns a new `Population` containing only the individuals with rank = 0.
    /// If no ranking information is available, the entire population is returned.
    pub fn best(&self) -> Population {
        if let Some(ranks) = &self.rank {
            let indices: Vec<usize> = ranks
                .iter()
                .enumerate()
                .filter_map(|(i, &r)| if r == 0 { Some(i) } else { None })
                .collect();
            self.selected(&indices)
        } else {
            self.clone()
        }
    }

    /// Updates the population's `rank` field, validating its length.
    pub fn set_rank(&mut self, rank: Array1<usize>) -> Result<(), PopulationError> {
        check_len("rank", self.len(), rank.len())?;
        self.rank = Some(rank);
        Ok(())
    }

    /// Updates the population's `survival_score` field.
    ///
    /// The score vector must have one entry per individual.
    pub fn set_survival_score(&mut self, score: Array1<f64>) -> Result<(), PopulationError> {
        check_len("survival score", self.len(), score.len())?;
        self.survival_score = Some(score);
        Ok(())
    }

    /// Merges two populations into one. Optional fields must be set on both or on neither.
    pub fn merge(
        population1: &Population,
        population2: &Population,
    ) -> Result<Population, PopulationError> {
        let merged_genes = concatenate(
            Axis(0),
            &[population1.genes.view(), population2.genes.view()],
        )
        .map_err(|_| PopulationError::RaggedRows {
            field: "genes",
            expected: population1.genes.ncols(),
            found: population2.genes.ncols(),
        })?;

        let merged_fitness = concatenate(
            Axis(0),
            &[population1.fitness.view(), population2.fitness.view()],
        )
        .map_err(|_| PopulationError::RaggedRows {
            field: "fitness",
            expected: population1.fitness.ncols(),
            found: population2.fitness.ncols(),
        })?;

        let merged_rank = match (&population1.rank, &population2.rank) {
            (Some(r1), Some(r2)) => Some(r1.iter().chain(r2.iter()).copied().collect()),
            (None, None) => None,
            _ => return Err(PopulationError::OptionalFieldMismatch { field: "rank" }),
        };

        let merged_constraints = match (&population1.constraints, &population2.constraints) {
            (Some(c1), Some(c2)) => Some(concatenate(Axis(0), &[c1.view(), c2.view()]).map_err(
                |_| PopulationError::RaggedRows {
                    field: "constraints",
                    expected: c1.ncols(),
                    found: c2.ncols(),
                },
            )?),
            (None, None) => None,
            _ => {
                return Err(PopulationError::OptionalFieldMismatch {
                    field: "constraints",
                });
            }
        };

        let merged_survival_score =
            match (&population1.survival_score, &population2.survival_score) {
                (Some(s1), Some(s2)) => Some(s1.iter().chain(s2.iter()).copied().collect()),
                (None, None) => None,
                _ => {
                    return Err(PopulationError::OptionalFieldMismatch {
                        field: "survival scores",
                    });
                }
            };

        let mut merged_population = Population::new(
            merged_genes,
            merged_fitness,
            merged_constraints,
            merged_rank,
        );
        merged_population.survival_score = merged_survival_score;
        Ok(merged_population)
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), PopulationError> {
    if expected != found {
        return Err(PopulationError::LengthMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_row_len(
    field: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), PopulationError> {
    if expected != found {
        return Err(PopulationError::RaggedRows {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

/// Type alias for a vector of `Population` representing multiple fronts.
pub type Fronts = Vec<Population>;

/// An extension trait for `Fronts` that adds a `.to_population()` method
/// which flattens multiple fronts into a single `Population`.
pub trait FrontsExt {
    fn to_population(self) -> Result<Option<Population>, PopulationError>;
}

impl FrontsExt for Vec<Population> {
    fn to_population(self) -> Result<Option<Population>, PopulationError> {
        let mut fronts = self.into_iter();
        let Some(mut merged) = fronts.next() else {
            return Ok(None);
        };
        for front in fronts {
            merged = Population::merge(&merged, &front)?;
        }
        Ok(Some(merged))
    }
}
