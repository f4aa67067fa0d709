use ndarray::Array2;

mod dan_and_dennis;

pub use dan_and_dennis::DanAndDenisReferencePoints;

/// A generator of reference directions, one direction per row.
pub trait StructuredReferencePoints {
    fn generate(&self) -> Array2<f64>;
}
