use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::conditions::{Condition, IntValue};
use crate::{Param, Predicate, Sym};

/// A parameterized action schema.
#[derive(Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: Sym,
    pub parameters: Vec<Param>,
    pub precondition: Condition,
    pub effect: Condition,
    pub cost: IntValue,
}

impl Operator {
    /// Creates an operator with the given parameters, an empty precondition and effect and a null cost.
    pub fn new(name: impl Into<Sym>, parameters: Vec<Param>) -> Self {
        Operator {
            name: name.into(),
            parameters,
            precondition: Condition::tautology(),
            effect: Condition::tautology(),
            cost: 0,
        }
    }

    pub fn with_precondition(mut self, precondition: Condition) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn with_effect(mut self, effect: Condition) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_cost(mut self, cost: IntValue) -> Self {
        self.cost = cost;
        self
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "(:action {}", self.name)?;
        write!(f, "  :parameters (")?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "?{p:?}")?;
        }
        writeln!(f, ")")?;
        if self.cost != 0 {
            writeln!(f, "  :cost {}", self.cost)?;
        }
        writeln!(f, "  :precondition {}", self.precondition)?;
        write!(f, "  :effect {})", self.effect)
    }
}

impl Debug for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Definition of a derived predicate: `predicate(parameters)` holds whenever `condition` holds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Axiom {
    pub predicate: Arc<Predicate>,
    pub parameters: Vec<Param>,
    pub condition: Condition,
}

impl Axiom {
    /// Creates an axiom for `predicate`, whose parameters are the ones of the predicate.
    pub fn new(predicate: Arc<Predicate>, condition: Condition) -> Self {
        Axiom {
            parameters: predicate.parameters.clone(),
            predicate,
            condition,
        }
    }
}

impl Display for Axiom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(:derived ({}", self.predicate.name)?;
        for p in &self.parameters {
            write!(f, " ?{p:?}")?;
        }
        write!(f, ") {})", self.condition)
    }
}
