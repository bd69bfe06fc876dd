use std::hash::Hash;
use std::sync::Arc;

use itertools::Itertools;

use crate::errors::ModelError;
use crate::types::TOP_TYPE;
use crate::utils::disp_iter;
use crate::{Param, Sym};

/// Name of the built-in equality predicate over objects.
pub const EQUALITY: &str = "=";

/// Schema of a boolean relation. Shared by reference across all literals that use it.
#[derive(Clone, Debug)]
pub struct Predicate {
    pub name: Sym,
    pub parameters: Vec<Param>,
}

impl Predicate {
    pub fn new(name: impl Into<Sym>, parameters: Vec<Param>) -> Self {
        Predicate {
            name: name.into(),
            parameters,
        }
    }

    /// The built-in `=` predicate, accepting any two objects.
    pub fn equality() -> Self {
        Predicate::new(EQUALITY, vec![Param::new("a", TOP_TYPE), Param::new("b", TOP_TYPE)])
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_equality(&self) -> bool {
        self.name == EQUALITY
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.name, self.parameters.iter().format(", "))
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Predicate {}
impl Hash for Predicate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

/// Schema of a numeric fluent such as `(total-cost)` or `(fuel ?t)`.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Sym,
    pub parameters: Vec<Param>,
}

impl Function {
    pub fn new(name: impl Into<Sym>, parameters: Vec<Param>) -> Self {
        Function {
            name: name.into(),
            parameters,
        }
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Function {}
impl Hash for Function {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        disp_iter(f, self.parameters.iter().map(|p| format!("{p:?}")), ", ")?;
        write!(f, ")")
    }
}

/// All predicates of a problem, in declaration order. The equality predicate is always present.
#[derive(Clone, Debug)]
pub struct Predicates {
    predicates: Vec<Arc<Predicate>>,
}

impl Default for Predicates {
    fn default() -> Self {
        Predicates {
            predicates: vec![Arc::new(Predicate::equality())],
        }
    }
}

impl Predicates {
    pub fn get(&self, name: &str) -> Result<&Arc<Predicate>, ModelError> {
        self.predicates
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ModelError::UnknownPredicate(Sym::from(name)))
    }

    pub fn add(&mut self, predicate: Predicate) -> Result<Arc<Predicate>, ModelError> {
        if self.predicates.iter().any(|p| p.name == predicate.name) {
            return Err(ModelError::DuplicatePredicate(predicate.name));
        }
        let predicate = Arc::new(predicate);
        self.predicates.push(predicate.clone());
        Ok(predicate)
    }

    pub fn equality(&self) -> &Arc<Predicate> {
        &self.predicates[0]
    }

    /// All user-declared predicates (i.e. excluding equality).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Predicate>> + '_ {
        self.predicates.iter().filter(|p| !p.is_equality())
    }
}

/// All numeric functions of a problem, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Functions {
    functions: Vec<Arc<Function>>,
}

impl Functions {
    pub fn get(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn add(&mut self, function: Function) -> Result<Arc<Function>, ModelError> {
        if self.get(function.name.canonical_str()).is_some() {
            return Err(ModelError::DuplicateFunction(function.name));
        }
        let function = Arc::new(function);
        self.functions.push(function.clone());
        Ok(function)
    }

    /// Removes a function, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Function>> {
        let i = self.functions.iter().position(|f| f.name == name)?;
        Some(self.functions.remove(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Function>> + '_ {
        self.functions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
