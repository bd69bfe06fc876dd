use std::fmt::Display;
use std::sync::Arc;

use crate::conditions::{Condition, FluentApp, IntValue, Literal};
use crate::errors::ModelError;
use crate::{Argument, Axiom, Function, Functions, Objects, Operator, Param, Predicate, Predicates, Sym, UserTypes};

/// A lifted planning problem: the domain (types, predicates, functions, operators, axioms)
/// together with its instance (constants, initial state and goals).
///
/// Problems are built incrementally with the methods of this type, which check that every
/// element only refers to already declared ones.
#[derive(Clone, Debug, Default)]
pub struct Problem {
    pub types: UserTypes,
    pub objects: Objects,
    pub predicates: Predicates,
    pub functions: Functions,
    pub operators: Vec<Operator>,
    pub axioms: Vec<Axiom>,
    /// Ground atoms that are true in the initial state. All others are false.
    pub init: Vec<Literal>,
    /// Initial values of ground numeric fluents.
    pub init_values: Vec<(FluentApp, IntValue)>,
    /// Goal conditions, implicitly conjoined.
    pub goals: Vec<Condition>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, name: impl Into<Sym>, parent: Option<&str>) {
        self.types.add_type(name, parent)
    }

    pub fn add_object(&mut self, name: impl Into<Sym>, tpe: impl Into<Sym>) -> Result<(), ModelError> {
        let tpe = tpe.into();
        self.types.check(&tpe)?;
        self.objects.add_object(name, tpe)
    }

    /// Returns the constant argument referring to the object `name`.
    pub fn object(&self, name: &str) -> Result<Argument, ModelError> {
        self.objects.get(name).map(Argument::from)
    }

    pub fn add_predicate(&mut self, name: impl Into<Sym>, parameters: Vec<Param>) -> Result<Arc<Predicate>, ModelError> {
        for p in &parameters {
            self.types.check(&p.tpe)?;
        }
        self.predicates.add(Predicate::new(name, parameters))
    }

    pub fn add_function(&mut self, name: impl Into<Sym>, parameters: Vec<Param>) -> Result<Arc<Function>, ModelError> {
        for p in &parameters {
            self.types.check(&p.tpe)?;
        }
        self.functions.add(Function::new(name, parameters))
    }

    fn check_arguments(&self, name: &Sym, parameters: &[Param], args: &[Argument]) -> Result<(), ModelError> {
        if parameters.len() != args.len() {
            return Err(ModelError::Arity {
                name: name.clone(),
                expected: parameters.len(),
                got: args.len(),
            });
        }
        for (param, arg) in parameters.iter().zip(args) {
            if !self.types.is_subtype_of(arg.tpe(), &param.tpe) {
                return Err(ModelError::IncompatibleType {
                    name: name.clone(),
                    arg: arg.name().clone(),
                    found: arg.tpe().clone(),
                    expected: param.tpe.clone(),
                });
            }
        }
        Ok(())
    }

    /// Builds a positive literal of the predicate `name`, checking the number and types of its arguments.
    pub fn literal(&self, name: &str, args: Vec<Argument>) -> Result<Literal, ModelError> {
        let predicate = self.predicates.get(name)?;
        self.check_arguments(&predicate.name, &predicate.parameters, &args)?;
        Ok(Literal::new(predicate.clone(), args))
    }

    /// Builds an application of the numeric function `name`, checking the number and types of its arguments.
    pub fn fluent(&self, name: &str, args: Vec<Argument>) -> Result<FluentApp, ModelError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| ModelError::UnknownFunction(Sym::from(name)))?;
        self.check_arguments(&function.name, &function.parameters, &args)?;
        Ok(FluentApp::new(function.clone(), args))
    }

    pub fn add_operator(&mut self, operator: Operator) -> Result<(), ModelError> {
        for p in &operator.parameters {
            self.types.check(&p.tpe)?;
        }
        check_bound(&operator.name, &operator.parameters, &operator.precondition)?;
        check_bound(&operator.name, &operator.parameters, &operator.effect)?;
        self.operators.push(operator);
        Ok(())
    }

    pub fn add_axiom(&mut self, axiom: Axiom) -> Result<(), ModelError> {
        check_bound(&axiom.predicate.name, &axiom.parameters, &axiom.condition)?;
        self.axioms.push(axiom);
        Ok(())
    }

    /// Declares a ground atom as true in the initial state.
    pub fn add_init(&mut self, literal: Literal) -> Result<(), ModelError> {
        if !literal.is_ground() || literal.negated {
            return Err(ModelError::NonGroundInit(literal.to_string()));
        }
        if !self.init.contains(&literal) {
            self.init.push(literal);
        }
        Ok(())
    }

    pub fn set_init_value(&mut self, fluent: FluentApp, value: IntValue) -> Result<(), ModelError> {
        if !fluent.is_ground() {
            return Err(ModelError::NonGroundInit(fluent.to_string()));
        }
        match self.init_values.iter_mut().find(|(f, _)| f == &fluent) {
            Some((_, v)) => *v = value,
            None => self.init_values.push((fluent, value)),
        }
        Ok(())
    }

    pub fn add_goal(&mut self, goal: Condition) -> Result<(), ModelError> {
        check_bound(&Sym::from("goal"), &[], &goal)?;
        self.goals.push(goal);
        Ok(())
    }

    /// Checks that no condition of the problem has a variable that is neither a parameter of its
    /// operator or axiom nor bound by an enclosing quantification.
    pub fn check(&self) -> Result<(), ModelError> {
        for op in &self.operators {
            check_bound(&op.name, &op.parameters, &op.precondition)?;
            check_bound(&op.name, &op.parameters, &op.effect)?;
        }
        for ax in &self.axioms {
            check_bound(&ax.predicate.name, &ax.parameters, &ax.condition)?;
        }
        for goal in &self.goals {
            check_bound(&Sym::from("goal"), &[], goal)?;
        }
        Ok(())
    }
}

fn check_bound(context: &Sym, parameters: &[Param], condition: &Condition) -> Result<(), ModelError> {
    match condition
        .free_variables()
        .into_iter()
        .find(|v| parameters.iter().all(|p| p.name != v.name))
    {
        Some(var) => Err(ModelError::UnboundVariable {
            var: var.name,
            context: context.clone(),
        }),
        None => Ok(()),
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.objects)?;
        write!(f, "\nPredicates:")?;
        for p in self.predicates.iter() {
            write!(f, "\n  {p}")?;
        }
        if !self.functions.is_empty() {
            write!(f, "\nFunctions:")?;
            for func in self.functions.iter() {
                write!(f, "\n  {func}")?;
            }
        }
        write!(f, "\n\nOperators:")?;
        for op in &self.operators {
            write!(f, "\n{op}")?;
        }
        if !self.axioms.is_empty() {
            write!(f, "\n\nAxioms:")?;
            for ax in &self.axioms {
                write!(f, "\n  {ax}")?;
            }
        }
        write!(f, "\n\nInit:")?;
        for lit in &self.init {
            write!(f, "\n  {lit}")?;
        }
        for (fluent, value) in &self.init_values {
            write!(f, "\n  (= {fluent} {value})")?;
        }
        write!(f, "\n\nGoals:")?;
        for g in &self.goals {
            write!(f, "\n  {g}")?;
        }
        Ok(())
    }
}
