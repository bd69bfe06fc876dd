use std::fmt::Display;
use std::sync::Arc;

use derive_more::derive::Display;

use crate::{Argument, Function, Param};

pub type IntValue = i64;

/// A numeric function applied to arguments, e.g. `(fuel ?truck)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FluentApp {
    pub function: Arc<Function>,
    pub args: Vec<Argument>,
}

impl FluentApp {
    pub fn new(function: Arc<Function>, args: Vec<Argument>) -> Self {
        FluentApp { function, args }
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Argument::is_constant)
    }

    fn bind(&self, vars: &[Param], values: &[Argument]) -> FluentApp {
        FluentApp {
            function: self.function.clone(),
            args: self.args.iter().map(|a| a.substituted(vars, values)).collect(),
        }
    }
}

impl Display for FluentApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.function.name)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        write!(f, ")")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum ArithOp {
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("*")]
    Times,
    #[display("/")]
    Div,
}

/// Value term of a numeric effect or comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericExpression {
    Constant(IntValue),
    Fluent(FluentApp),
    Op(ArithOp, Box<NumericExpression>, Box<NumericExpression>),
}

impl NumericExpression {
    /// Returns the value of the expression if it only involves constants.
    pub fn as_constant(&self) -> Option<IntValue> {
        match self {
            NumericExpression::Constant(v) => Some(*v),
            NumericExpression::Fluent(_) => None,
            NumericExpression::Op(op, lhs, rhs) => {
                let (l, r) = (lhs.as_constant()?, rhs.as_constant()?);
                match op {
                    ArithOp::Plus => l.checked_add(r),
                    ArithOp::Minus => l.checked_sub(r),
                    ArithOp::Times => l.checked_mul(r),
                    ArithOp::Div => l.checked_div(r),
                }
            }
        }
    }

    pub fn references_function(&self, function: &Function) -> bool {
        match self {
            NumericExpression::Constant(_) => false,
            NumericExpression::Fluent(app) => app.function.as_ref() == function,
            NumericExpression::Op(_, lhs, rhs) => lhs.references_function(function) || rhs.references_function(function),
        }
    }

    pub(crate) fn bind(&self, vars: &[Param], values: &[Argument]) -> NumericExpression {
        match self {
            NumericExpression::Constant(v) => NumericExpression::Constant(*v),
            NumericExpression::Fluent(app) => NumericExpression::Fluent(app.bind(vars, values)),
            NumericExpression::Op(op, lhs, rhs) => {
                NumericExpression::Op(*op, Box::new(lhs.bind(vars, values)), Box::new(rhs.bind(vars, values)))
            }
        }
    }

    pub(crate) fn arguments(&self) -> Box<dyn Iterator<Item = &Argument> + '_> {
        match self {
            NumericExpression::Constant(_) => Box::new(std::iter::empty()),
            NumericExpression::Fluent(app) => Box::new(app.args.iter()),
            NumericExpression::Op(_, lhs, rhs) => Box::new(lhs.arguments().chain(rhs.arguments())),
        }
    }
}

impl Display for NumericExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericExpression::Constant(v) => write!(f, "{v}"),
            NumericExpression::Fluent(app) => write!(f, "{app}"),
            NumericExpression::Op(op, lhs, rhs) => write!(f, "({op} {lhs} {rhs})"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum EffectKind {
    #[display("assign")]
    Assign,
    #[display("increase")]
    Increase,
    #[display("decrease")]
    Decrease,
    #[display("scale-up")]
    ScaleUp,
    #[display("scale-down")]
    ScaleDown,
}

/// Modification of a numeric fluent, e.g. `(increase (total-cost) 5)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NumericEffect {
    pub target: FluentApp,
    pub kind: EffectKind,
    pub value: NumericExpression,
}

impl NumericEffect {
    pub fn new(target: FluentApp, kind: EffectKind, value: NumericExpression) -> Self {
        NumericEffect { target, kind, value }
    }

    pub fn increase(target: FluentApp, amount: IntValue) -> Self {
        Self::new(target, EffectKind::Increase, NumericExpression::Constant(amount))
    }

    pub fn references_function(&self, function: &Function) -> bool {
        self.target.function.as_ref() == function || self.value.references_function(function)
    }

    pub(crate) fn bind(&self, vars: &[Param], values: &[Argument]) -> NumericEffect {
        NumericEffect {
            target: self.target.bind(vars, values),
            kind: self.kind,
            value: self.value.bind(vars, values),
        }
    }
}

impl Display for NumericEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.kind, self.target, self.value)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Comparator {
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display("=")]
    Eq,
    #[display("!=")]
    Ne,
    #[display(">=")]
    Ge,
    #[display(">")]
    Gt,
}

impl Comparator {
    /// Comparator holding exactly when this one does not.
    pub fn negated(self) -> Comparator {
        match self {
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
            Comparator::Ge => Comparator::Lt,
            Comparator::Gt => Comparator::Le,
        }
    }

    pub fn compare(self, lhs: IntValue, rhs: IntValue) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Eq => lhs == rhs,
            Comparator::Ne => lhs != rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Gt => lhs > rhs,
        }
    }
}

/// Numeric comparison appearing in a condition, e.g. `(>= (fuel ?t) 3)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NumericCondition {
    pub comparator: Comparator,
    pub lhs: NumericExpression,
    pub rhs: NumericExpression,
}

impl NumericCondition {
    pub fn new(comparator: Comparator, lhs: NumericExpression, rhs: NumericExpression) -> Self {
        NumericCondition { comparator, lhs, rhs }
    }

    pub fn negated(&self) -> NumericCondition {
        NumericCondition {
            comparator: self.comparator.negated(),
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
        }
    }

    /// Truth value of the comparison if both sides are constant.
    pub fn constant_value(&self) -> Option<bool> {
        Some(self.comparator.compare(self.lhs.as_constant()?, self.rhs.as_constant()?))
    }

    pub fn references_function(&self, function: &Function) -> bool {
        self.lhs.references_function(function) || self.rhs.references_function(function)
    }

    pub(crate) fn bind(&self, vars: &[Param], values: &[Argument]) -> NumericCondition {
        NumericCondition {
            comparator: self.comparator,
            lhs: self.lhs.bind(vars, values),
            rhs: self.rhs.bind(vars, values),
        }
    }
}

impl Display for NumericCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.comparator, self.lhs, self.rhs)
    }
}
