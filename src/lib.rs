#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

pub mod archive;
pub mod density;
pub mod error;
pub mod genetic;
pub mod helpers;
pub mod non_dominated_sorting;
pub mod operators;
pub mod reference_points;

pub use error::MoeaError;
