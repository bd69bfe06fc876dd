use std::fmt::Debug;

use derive_more::derive::Display;

use crate::{Object, Sym};

/// A typed variable: operator parameter, quantified variable or predicate parameter.
#[derive(Clone, Display, PartialEq, Eq, Hash)]
#[display("{name}")]
pub struct Param {
    pub name: Sym,
    pub tpe: Sym,
}

impl Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.tpe)
    }
}

impl Param {
    pub fn new(name: impl Into<Sym>, tpe: impl Into<Sym>) -> Self {
        Self {
            name: name.into(),
            tpe: tpe.into(),
        }
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }
    pub fn tpe(&self) -> &Sym {
        &self.tpe
    }
}

/// Argument of a literal or of a fluent: either a constant bound to an object or a variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    Constant(Object),
    Variable(Param),
}

impl Argument {
    pub fn is_constant(&self) -> bool {
        matches!(self, Argument::Constant(_))
    }

    pub fn name(&self) -> &Sym {
        match self {
            Argument::Constant(o) => o.name(),
            Argument::Variable(p) => p.name(),
        }
    }

    pub fn tpe(&self) -> &Sym {
        match self {
            Argument::Constant(o) => o.tpe(),
            Argument::Variable(p) => p.tpe(),
        }
    }

    /// Returns the value of this argument under the given substitution.
    /// Constants and variables that do not appear in `vars` are returned unchanged.
    pub fn substituted(&self, vars: &[Param], values: &[Argument]) -> Argument {
        debug_assert_eq!(vars.len(), values.len());
        match self {
            Argument::Variable(p) => match vars.iter().position(|v| v.name == p.name) {
                Some(i) => values[i].clone(),
                None => self.clone(),
            },
            Argument::Constant(_) => self.clone(),
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Argument::Constant(o) => write!(f, "{o}"),
            Argument::Variable(p) => write!(f, "?{p}"),
        }
    }
}

impl From<Object> for Argument {
    fn from(value: Object) -> Self {
        Argument::Constant(value)
    }
}

impl From<&Object> for Argument {
    fn from(value: &Object) -> Self {
        Argument::Constant(value.clone())
    }
}

impl From<Param> for Argument {
    fn from(value: Param) -> Self {
        Argument::Variable(value)
    }
}

impl From<&Param> for Argument {
    fn from(value: &Param) -> Self {
        Argument::Variable(value.clone())
    }
}
