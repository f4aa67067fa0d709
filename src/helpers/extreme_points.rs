use ndarray::{Array1, Array2, Axis};

use crate::genetic::PopulationFitness;

/// Computes the ideal point from a fitness matrix.
/// Each element of the returned array is the minimum value along the corresponding column.
pub fn get_ideal(population_fitness: &PopulationFitness) -> Array1<f64> {
    population_fitness.fold_axis(Axis(0), f64::INFINITY, |a, &b| a.min(b))
}

/// Computes the nadir point from a fitness matrix.
/// Each element of the returned array is the maximum value along the corresponding column.
pub fn get_nadir(population_fitness: &PopulationFitness) -> Array1<f64> {
    population_fitness.fold_axis(Axis(0), f64::NEG_INFINITY, |a, &b| a.max(b))
}

/// Min-max normalization of every objective into `[0, 1]`.
///
/// An objective whose range is zero maps to `0.0` for every row.
pub fn normalize_min_max(population_fitness: &PopulationFitness) -> Array2<f64> {
    if population_fitness.nrows() == 0 {
        return population_fitness.clone();
    }
    let ideal = get_ideal(population_fitness);
    let nadir = get_nadir(population_fitness);
    let mut normalized = population_fitness - &ideal;
    for (mut column, (&low, &high)) in normalized
        .columns_mut()
        .into_iter()
        .zip(ideal.iter().zip(nadir.iter()))
    {
        let range = high - low;
        if range > 0.0 {
            column.mapv_inplace(|v| v / range);
        } else {
            column.fill(0.0);
        }
    }
    normalized
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_get_ideal() {
        let fitness = array![[1.0, 4.0], [2.0, 3.0], [0.5, 5.0]];
        assert_eq!(get_ideal(&fitness), array![0.5, 3.0]);
    }

    #[test]
    fn test_get_nadir() {
        let fitness = array![[1.0, 4.0], [2.0, 3.0], [0.5, 5.0]];
        assert_eq!(get_nadir(&fitness), array![2.0, 5.0]);
    }

    #[test]
    fn test_normalize_min_max() {
        // Second objective is constant, it collapses to zero.
        let fitness = array![[0.0, 7.0], [5.0, 7.0], [10.0, 7.0]];
        let normalized = normalize_min_max(&fitness);
        assert_eq!(normalized, array![[0.0, 0.0], [0.5, 0.0], [1.0, 0.0]]);
    }
}
