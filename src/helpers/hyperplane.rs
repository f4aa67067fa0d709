use faer::linalg::solvers::Solve;
use faer::prelude::*;
use faer_ext::{IntoFaer, IntoNdarray};
use ndarray::{Array1, Array2, ArrayView1, s};
use ndarray_stats::QuantileExt;

use crate::genetic::PopulationFitness;
use crate::helpers::extreme_points::{get_ideal, get_nadir};

pub trait HyperPlaneNormalization {
    /// This corresponds to the Z_max defined in the NSGA3 referenced paper.
    fn compute_extreme_points(&self, population_fitness: &PopulationFitness) -> Array2<f64>;

    /// Computes the intercepts vector `a` by solving the linear system:
    /// Z_max * b = 1, where 1 is a vector of ones.
    /// then the intercepts in the objective axis are given by a = 1/b
    fn compute_hyperplane_intercepts(&self, population_fitness: &PopulationFitness) -> Array1<f64> {
        let m = population_fitness.ncols();
        let fallback = get_nadir(population_fitness);
        let z_max = self.compute_extreme_points(population_fitness);
        if z_max.nrows() != m || m == 0 {
            return fallback;
        }

        let z_max_faer = z_max.view().into_faer();
        let ones = Mat::<f64>::from_fn(m, 1, |_, _| 1.0);
        let plu = z_max_faer.partial_piv_lu();
        let solution = plu.solve(&ones);
        // faer answers with an (m, 1) matrix.
        let solution = solution.as_ref().into_ndarray().column(0).to_owned();

        if solution.iter().any(|&x| !x.is_finite() || x == 0.0) {
            // singular extreme point matrix
            return fallback;
        }
        // An intercept below the observed maximum falls back to that maximum.
        solution
            .iter()
            .zip(fallback.iter())
            .map(|(&b, &fb)| {
                let intercept = 1.0 / b;
                if intercept < fb { fb } else { intercept }
            })
            .collect()
    }
}

/// Extreme points chosen by the achievement scalarizing function, one per objective axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsfHyperPlaneNormalization;

impl HyperPlaneNormalization for AsfHyperPlaneNormalization {
    /// For each objective j, constructs a weight vector
    ///   w^j = [eps, ..., 1.0 (at position j), ..., eps],
    /// and selects the solution that minimizes ASF(s, w^j).
    fn compute_extreme_points(&self, translated_population: &PopulationFitness) -> Array2<f64> {
        let n_objectives = translated_population.ncols();
        let mut extreme_points = Array2::<f64>::zeros((n_objectives, n_objectives));
        if translated_population.nrows() == 0 {
            return extreme_points;
        }

        for j in 0..n_objectives {
            let mut weight = Array1::<f64>::from_elem(n_objectives, 1e-6);
            weight[j] = 1.0;

            let asf_values: Array1<f64> = translated_population
                .rows()
                .into_iter()
                .map(|solution| asf(&solution, &weight.view()))
                .collect();
            let best_idx = asf_values.argmin().unwrap_or(0);
            extreme_points
                .slice_mut(s![j, ..])
                .assign(&translated_population.row(best_idx));
        }
        extreme_points
    }
}

/// Achievement scalarizing function: the largest ratio `f'_i(x) / w_i`.
pub fn asf(x: &ArrayView1<f64>, w: &ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(w.iter())
        .map(|(&xi, &wi)| xi / wi)
        .fold(f64::MIN, f64::max)
}

/// Translates the fitness by its ideal point and divides every objective by the
/// hyperplane intercept. Objectives whose intercept is not positive are only translated.
pub fn normalize_with_hyperplane<N: HyperPlaneNormalization>(
    normalizer: &N,
    population_fitness: &PopulationFitness,
) -> Array2<f64> {
    if population_fitness.nrows() == 0 {
        return population_fitness.clone();
    }
    let ideal = get_ideal(population_fitness);
    let mut translated = population_fitness - &ideal;
    let intercepts = normalizer.compute_hyperplane_intercepts(&translated);
    for (mut column, &intercept) in translated.columns_mut().into_iter().zip(intercepts.iter()) {
        if intercept > 0.0 && intercept.is_finite() {
            column.mapv_inplace(|v| v / intercept);
        }
    }
    translated
}
