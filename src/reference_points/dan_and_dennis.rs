use ndarray::Array2;

use crate::reference_points::StructuredReferencePoints;

/// Das-Dennis simplex lattice: every vector `(h_1 / H, ..., h_m / H)` with non-negative
/// integers summing to `H`, where `H` is the smallest partition count yielding at least
/// `n_reference_points` directions.
#[derive(Clone, Debug)]
pub struct DanAndDenisReferencePoints {
    n_reference_points: usize,
    n_objectives: usize,
}

impl DanAndDenisReferencePoints {
    pub fn new(n_reference_points: usize, n_objectives: usize) -> Self {
        Self {
            n_reference_points,
            n_objectives,
        }
    }

    /// Number of partitions `H` used by `generate`.
    pub fn partitions(&self) -> usize {
        choose_h(self.n_reference_points, self.n_objectives)
    }
}

impl StructuredReferencePoints for DanAndDenisReferencePoints {
    fn generate(&self) -> Array2<f64> {
        let m = self.n_objectives;
        match m {
            0 => return Array2::zeros((0, 0)),
            // The lattice of one objective is the single point [1.0].
            1 => return Array2::ones((1, 1)),
            _ => {}
        }

        let h = self.partitions();
        let mut lattice: Vec<Vec<usize>> = Vec::new();
        let mut current = Vec::with_capacity(m);
        compositions(m, h, &mut current, &mut lattice);

        Array2::from_shape_fn((lattice.len(), m), |(i, j)| {
            lattice[i][j] as f64 / h as f64
        })
    }
}

/// Smallest `H >= 1` with `binom(H + m - 1, m - 1) >= n_reference_points`.
fn choose_h(n_reference_points: usize, n_objectives: usize) -> usize {
    if n_objectives < 2 {
        return 1;
    }
    let mut h = 1;
    while binomial_coefficient(h + n_objectives - 1, n_objectives - 1) < n_reference_points {
        h += 1;
    }
    h
}

fn binomial_coefficient(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Pushes every composition of `remaining` into `parts` non-negative integers.
fn compositions(
    parts: usize,
    remaining: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() + 1 == parts {
        current.push(remaining);
        out.push(current.clone());
        current.pop();
        return;
    }
    for x in 0..=remaining {
        current.push(x);
        compositions(parts, remaining - x, current, out);
        current.pop();
    }
}
