//! Lifted representation of classical planning problems.
//!
//! A problem is made of typed constants, predicates and numeric functions, and of parameterized
//! operators whose preconditions and effects are [`Condition`] trees. This crate provides the
//! model, its builder API and the algebra over conditions (substitution, rewriting, normal forms)
//! used by the grounding pipeline.

mod combinations;
pub mod conditions;
pub mod errors;
mod fluents;
mod objects;
mod operators;
mod params;
mod problem;
mod sym;
mod types;
pub mod utils;

pub use combinations::ArgumentCombinations;
pub use conditions::{Condition, Literal, Quantifier, Recursion};
pub use errors::ModelError;
pub use fluents::*;
pub use objects::*;
pub use operators::*;
pub use params::*;
pub use problem::Problem;
pub use sym::Sym;
pub use types::*;

/// Name of the numeric fluent holding the accumulated cost of a plan.
pub const TOTAL_COST: &str = "total-cost";

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three blocks `a`, `b`, `c` with predicates `on/2`, `clear/1`, `holding/1` and a `total-cost` function.
    pub fn blocks() -> Problem {
        let mut pb = Problem::new();
        pb.add_type("block", None);
        for b in ["a", "b", "c"] {
            pb.add_object(b, "block").unwrap();
        }
        let x = Param::new("x", "block");
        let y = Param::new("y", "block");
        pb.add_predicate("on", vec![x.clone(), y]).unwrap();
        pb.add_predicate("clear", vec![x.clone()]).unwrap();
        pb.add_predicate("holding", vec![x]).unwrap();
        pb.add_function(TOTAL_COST, vec![]).unwrap();
        pb
    }
}
