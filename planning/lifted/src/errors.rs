use thiserror::Error;

use crate::Sym;

/// Errors raised when assembling or checking a lifted problem.
///
/// They denote a malformed input from the layer that built the problem and are not expected
/// on a model produced by a correct parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown type {0}")]
    UnknownType(Sym),
    #[error("duplicate object {0} (declared with types {1} and {2})")]
    DuplicateObject(Sym, Sym, Sym),
    #[error("unknown object {0}")]
    UnknownObject(Sym),
    #[error("duplicate predicate {0}")]
    DuplicatePredicate(Sym),
    #[error("unknown predicate {0}")]
    UnknownPredicate(Sym),
    #[error("duplicate function {0}")]
    DuplicateFunction(Sym),
    #[error("unknown function {0}")]
    UnknownFunction(Sym),
    #[error("{name} expects {expected} arguments but got {got}")]
    Arity { name: Sym, expected: usize, got: usize },
    #[error("argument {arg} of {name} has type {found} but type {expected} was expected")]
    IncompatibleType {
        name: Sym,
        arg: Sym,
        found: Sym,
        expected: Sym,
    },
    #[error("variable {var} is not bound in {context}")]
    UnboundVariable { var: Sym, context: Sym },
    #[error("initial state literal {0} is not ground")]
    NonGroundInit(String),
}
