use std::fmt::Debug;

pub mod survival;

/// Common identity of every operator exposed by the crate.
pub trait GeneticOperator: Debug {
    fn name(&self) -> String;
}
