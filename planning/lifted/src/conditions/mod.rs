//! Lifted logical conditions and effects.
//!
//! Preconditions, effects, goals and derived-predicate definitions are all represented by the
//! same recursive [`Condition`] type. All transformations (binding, simplification, normal forms,
//! rewriting) are functional: they read a tree and produce a new one.

mod normal_form;
mod numeric;

pub use numeric::*;

use std::fmt::Display;
use std::sync::Arc;

use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;

use crate::utils::disp_iter;
use crate::{Argument, ArgumentCombinations, Function, Param, Predicate, Problem, Sym};

pub type Args = SmallVec<[Argument; 3]>;

/// A possibly negated predicate applied to arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    pub predicate: Arc<Predicate>,
    pub args: Args,
    pub negated: bool,
}

impl Literal {
    pub fn new(predicate: Arc<Predicate>, args: impl IntoIterator<Item = Argument>) -> Self {
        Literal {
            predicate,
            args: args.into_iter().collect(),
            negated: false,
        }
    }

    pub fn negative(predicate: Arc<Predicate>, args: impl IntoIterator<Item = Argument>) -> Self {
        Literal {
            negated: true,
            ..Self::new(predicate, args)
        }
    }

    /// Returns the same literal with the opposite sign.
    pub fn negate(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: !self.negated,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Argument::is_constant)
    }

    pub fn bind(&self, vars: &[Param], values: &[Argument]) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(|a| a.substituted(vars, values)).collect(),
            negated: self.negated,
        }
    }

    /// For an equality literal whose value does not depend on a binding, returns this value.
    pub fn static_equality(&self) -> Option<bool> {
        if !self.predicate.is_equality() {
            return None;
        }
        let [a, b] = self.args.as_slice() else {
            return None;
        };
        let equal = match (a, b) {
            (Argument::Constant(x), Argument::Constant(y)) => x == y,
            (Argument::Variable(x), Argument::Variable(y)) if x.name == y.name => true,
            _ => return None,
        };
        Some(equal != self.negated)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "(not ")?;
        }
        write!(f, "({}", self.predicate.name)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        write!(f, ")")?;
        if self.negated {
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl Quantifier {
    /// Quantifier obtained when pushing a negation through this one.
    pub fn dual(self) -> Quantifier {
        match self {
            Quantifier::Forall => Quantifier::Exists,
            Quantifier::Exists => Quantifier::Forall,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Quantification {
    pub quantifier: Quantifier,
    pub variables: Vec<Param>,
    pub condition: Box<Condition>,
}

/// Conditional effect: if `prerequisite` holds in the state where the action is applied,
/// the `consequence` takes place.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalEffect {
    pub prerequisite: Box<Condition>,
    pub consequence: Box<Condition>,
}

/// A lifted condition or effect.
///
/// `And(vec![])` is the constant true (and the empty effect), `Or(vec![])` is the constant false.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Literal(Literal),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Quantified(Quantification),
    When(ConditionalEffect),
    NumericEffect(NumericEffect),
    Comparison(NumericCondition),
}

/// Order in which [`Condition::traverse`] visits a tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Recursion {
    /// Children are rewritten before their parent, which sees the rewritten children.
    HeadFirst,
    /// A node is rewritten before its children, which are taken from the rewritten node.
    TailFirst,
}

impl Condition {
    pub fn tautology() -> Condition {
        Condition::And(Vec::new())
    }

    pub fn contradiction() -> Condition {
        Condition::Or(Vec::new())
    }

    pub fn is_tautology(&self) -> bool {
        matches!(self, Condition::And(cs) if cs.is_empty())
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Condition::Or(cs) if cs.is_empty())
    }

    pub fn not(condition: Condition) -> Condition {
        Condition::Not(Box::new(condition))
    }

    pub fn forall(variables: Vec<Param>, condition: Condition) -> Condition {
        Condition::Quantified(Quantification {
            quantifier: Quantifier::Forall,
            variables,
            condition: Box::new(condition),
        })
    }

    pub fn exists(variables: Vec<Param>, condition: Condition) -> Condition {
        Condition::Quantified(Quantification {
            quantifier: Quantifier::Exists,
            variables,
            condition: Box::new(condition),
        })
    }

    pub fn when(prerequisite: Condition, consequence: Condition) -> Condition {
        Condition::When(ConditionalEffect {
            prerequisite: Box::new(prerequisite),
            consequence: Box::new(consequence),
        })
    }

    /// Returns a copy where each variable of `vars` is replaced by the value at the same position
    /// in `values`. Variables are matched by name; those that do not appear in `vars` are kept.
    /// Inside a quantification, the variables it rebinds are not substituted.
    pub fn bind(&self, vars: &[Param], values: &[Argument]) -> Condition {
        debug_assert_eq!(vars.len(), values.len());
        match self {
            Condition::Literal(l) => Condition::Literal(l.bind(vars, values)),
            Condition::And(cs) => Condition::And(cs.iter().map(|c| c.bind(vars, values)).collect()),
            Condition::Or(cs) => Condition::Or(cs.iter().map(|c| c.bind(vars, values)).collect()),
            Condition::Not(c) => Condition::not(c.bind(vars, values)),
            Condition::Quantified(q) => {
                let shadowed = |v: &Param| q.variables.iter().any(|qv| qv.name == v.name);
                let condition = if vars.iter().any(shadowed) {
                    let (vars, values): (Vec<Param>, Vec<Argument>) = vars
                        .iter()
                        .zip(values)
                        .filter(|(v, _)| !shadowed(v))
                        .map(|(v, x)| (v.clone(), x.clone()))
                        .unzip();
                    q.condition.bind(&vars, &values)
                } else {
                    q.condition.bind(vars, values)
                };
                Condition::Quantified(Quantification {
                    quantifier: q.quantifier,
                    variables: q.variables.clone(),
                    condition: Box::new(condition),
                })
            }
            Condition::When(w) => Condition::when(w.prerequisite.bind(vars, values), w.consequence.bind(vars, values)),
            Condition::NumericEffect(e) => Condition::NumericEffect(e.bind(vars, values)),
            Condition::Comparison(c) => Condition::Comparison(c.bind(vars, values)),
        }
    }

    /// Applies `rewrite` on every node of the tree, in the given order.
    ///
    /// A rewrite returning `None` removes the node from its parent conjunction or disjunction.
    /// A removed node that is the single child of its parent is replaced by the empty conjunction.
    /// Returns `None` if the root itself was removed.
    pub fn traverse<F>(self, rewrite: &mut F, order: Recursion) -> Option<Condition>
    where
        F: FnMut(Condition) -> Option<Condition>,
    {
        match order {
            Recursion::HeadFirst => {
                let node = self.map_children(&mut |c| c.traverse(rewrite, order));
                rewrite(node)
            }
            Recursion::TailFirst => {
                let node = rewrite(self)?;
                Some(node.map_children(&mut |c| c.traverse(rewrite, order)))
            }
        }
    }

    fn map_children<F>(self, f: &mut F) -> Condition
    where
        F: FnMut(Condition) -> Option<Condition>,
    {
        let mut single = |c: Box<Condition>| Box::new(f(*c).unwrap_or_else(Condition::tautology));
        match self {
            Condition::And(cs) => Condition::And(cs.into_iter().filter_map(&mut *f).collect()),
            Condition::Or(cs) => Condition::Or(cs.into_iter().filter_map(&mut *f).collect()),
            Condition::Not(c) => Condition::Not(single(c)),
            Condition::Quantified(q) => Condition::Quantified(Quantification {
                quantifier: q.quantifier,
                variables: q.variables,
                condition: single(q.condition),
            }),
            Condition::When(w) => Condition::When(ConditionalEffect {
                prerequisite: single(w.prerequisite),
                consequence: single(w.consequence),
            }),
            leaf @ (Condition::Literal(_) | Condition::NumericEffect(_) | Condition::Comparison(_)) => leaf,
        }
    }

    /// Returns true if a numeric expression or effect anywhere in the tree uses `function`.
    pub fn references_function(&self, function: &Function) -> bool {
        match self {
            Condition::Literal(_) => false,
            Condition::And(cs) | Condition::Or(cs) => cs.iter().any(|c| c.references_function(function)),
            Condition::Not(c) => c.references_function(function),
            Condition::Quantified(q) => q.condition.references_function(function),
            Condition::When(w) => {
                w.prerequisite.references_function(function) || w.consequence.references_function(function)
            }
            Condition::NumericEffect(e) => e.references_function(function),
            Condition::Comparison(c) => c.references_function(function),
        }
    }

    /// Variables appearing in the condition that are not bound by one of its quantifications,
    /// in order of first appearance.
    pub fn free_variables(&self) -> Vec<Param> {
        let mut free = Vec::new();
        self.collect_free_variables(&mut Vec::new(), &mut free);
        free
    }

    fn collect_free_variables(&self, bound: &mut Vec<Sym>, free: &mut Vec<Param>) {
        let visit = |arg: &Argument, free: &mut Vec<Param>| {
            if let Argument::Variable(p) = arg {
                if !bound.contains(&p.name) && !free.iter().any(|f: &Param| f.name == p.name) {
                    free.push(p.clone());
                }
            }
        };
        match self {
            Condition::Literal(l) => l.args.iter().for_each(|a| visit(a, free)),
            Condition::NumericEffect(e) => e
                .target
                .args
                .iter()
                .chain(e.value.arguments())
                .for_each(|a| visit(a, free)),
            Condition::Comparison(c) => c.lhs.arguments().chain(c.rhs.arguments()).for_each(|a| visit(a, free)),
            Condition::And(cs) | Condition::Or(cs) => {
                for c in cs {
                    c.collect_free_variables(bound, free)
                }
            }
            Condition::Not(c) => c.collect_free_variables(bound, free),
            Condition::Quantified(q) => {
                let depth = bound.len();
                bound.extend(q.variables.iter().map(|v| v.name.clone()));
                q.condition.collect_free_variables(bound, free);
                bound.truncate(depth);
            }
            Condition::When(w) => {
                w.prerequisite.collect_free_variables(bound, free);
                w.consequence.collect_free_variables(bound, free);
            }
        }
    }

    /// Evaluates a closed condition under the closed-world interpretation `holds`, which tells
    /// whether the atom made of a predicate name and object names is true.
    ///
    /// Quantifications are expanded over the constants of `problem`. Returns `None` if the
    /// condition contains effects, numeric comparisons or free variables.
    pub fn evaluate(&self, problem: &Problem, holds: &mut dyn FnMut(&Sym, &[Sym]) -> bool) -> Option<bool> {
        match self {
            Condition::Literal(l) => {
                if let Some(value) = l.static_equality() {
                    return Some(value);
                }
                let mut args = Vec::with_capacity(l.args.len());
                for a in &l.args {
                    match a {
                        Argument::Constant(o) => args.push(o.name().clone()),
                        Argument::Variable(_) => return None,
                    }
                }
                Some(holds(&l.predicate.name, &args) != l.negated)
            }
            Condition::And(cs) => {
                let mut value = true;
                for c in cs {
                    value &= c.evaluate(problem, holds)?;
                }
                Some(value)
            }
            Condition::Or(cs) => {
                let mut value = false;
                for c in cs {
                    value |= c.evaluate(problem, holds)?;
                }
                Some(value)
            }
            Condition::Not(c) => c.evaluate(problem, holds).map(|v| !v),
            Condition::Quantified(q) => {
                let mut value = q.quantifier == Quantifier::Forall;
                let mut combinations = ArgumentCombinations::new(&q.variables, problem);
                while let Some(args) = combinations.next() {
                    let instance = q.condition.bind(&q.variables, args).evaluate(problem, holds)?;
                    match q.quantifier {
                        Quantifier::Forall => value &= instance,
                        Quantifier::Exists => value |= instance,
                    }
                }
                Some(value)
            }
            Condition::When(_) | Condition::NumericEffect(_) | Condition::Comparison(_) => None,
        }
    }
}

impl From<Literal> for Condition {
    fn from(value: Literal) -> Self {
        Condition::Literal(value)
    }
}

impl From<NumericEffect> for Condition {
    fn from(value: NumericEffect) -> Self {
        Condition::NumericEffect(value)
    }
}

impl From<NumericCondition> for Condition {
    fn from(value: NumericCondition) -> Self {
        Condition::Comparison(value)
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |f: &mut std::fmt::Formatter<'_>, head: &str, cs: &[Condition]| {
            write!(f, "({head}")?;
            for c in cs {
                write!(f, " {c}")?;
            }
            write!(f, ")")
        };
        match self {
            Condition::Literal(l) => write!(f, "{l}"),
            Condition::And(cs) => set(f, "and", cs),
            Condition::Or(cs) => set(f, "or", cs),
            Condition::Not(c) => write!(f, "(not {c})"),
            Condition::Quantified(q) => {
                let head = match q.quantifier {
                    Quantifier::Forall => "forall",
                    Quantifier::Exists => "exists",
                };
                write!(f, "({head} (")?;
                disp_iter(f, q.variables.iter().map(|v| format!("?{} - {}", v.name, v.tpe)), " ")?;
                write!(f, ") {})", q.condition)
            }
            Condition::When(w) => write!(f, "(when {} {})", w.prerequisite, w.consequence),
            Condition::NumericEffect(e) => write!(f, "{e}"),
            Condition::Comparison(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::blocks;

    #[test]
    fn binding_respects_quantifier_scope() {
        let pb = blocks();
        let x = Param::new("x", "block");
        let y = Param::new("y", "block");
        let a = pb.object("a").unwrap();
        let b = pb.object("b").unwrap();
        let on = |u: &Param, v: Argument| Condition::Literal(pb.literal("on", vec![u.into(), v]).unwrap());

        // (and (on ?x ?y) (exists (?x) (on ?x ?y)))
        let cond = Condition::And(vec![
            on(&x, y.clone().into()),
            Condition::exists(vec![x.clone()], on(&x, y.clone().into())),
        ]);
        let bound = cond.bind(&[x.clone(), y.clone()], &[a.clone(), b.clone()]);
        let expected = Condition::And(vec![
            Condition::Literal(pb.literal("on", vec![a.clone(), b.clone()]).unwrap()),
            Condition::exists(vec![x.clone()], on(&x, b.clone())),
        ]);
        assert_eq!(bound, expected);
        // variables that are not substituted are left untouched
        assert_eq!(cond.bind(&[], &[]), cond);
    }

    #[test]
    fn head_first_traversal_removes_nodes() {
        let pb = blocks();
        let total = pb.fluent("total-cost", vec![]).unwrap();
        let eff = Condition::And(vec![
            Condition::Literal(pb.literal("clear", vec![pb.object("a").unwrap()]).unwrap()),
            NumericEffect::increase(total.clone(), 3).into(),
            Condition::And(vec![NumericEffect::increase(total, 2).into()]),
        ]);
        let stripped = eff
            .traverse(
                &mut |c| match c {
                    Condition::NumericEffect(_) => None,
                    other => Some(other),
                },
                Recursion::HeadFirst,
            )
            .unwrap();
        let expected = Condition::And(vec![
            Condition::Literal(pb.literal("clear", vec![pb.object("a").unwrap()]).unwrap()),
            Condition::And(vec![]),
        ]);
        assert_eq!(stripped, expected);
    }

    #[test]
    fn head_first_sees_rewritten_children() {
        let pb = blocks();
        let clear_a = Condition::Literal(pb.literal("clear", vec![pb.object("a").unwrap()]).unwrap());
        let cond = Condition::Or(vec![Condition::not(clear_a.clone())]);
        let mut visited = Vec::new();
        let res = cond.traverse(
            &mut |c| {
                visited.push(c.to_string());
                Some(c)
            },
            Recursion::HeadFirst,
        );
        assert_eq!(res, Some(Condition::Or(vec![Condition::not(clear_a)])));
        assert_eq!(visited, vec!["(clear a)", "(not (clear a))", "(or (not (clear a)))"]);
    }

    #[test]
    fn free_variables() {
        let pb = blocks();
        let x = Param::new("x", "block");
        let y = Param::new("y", "block");
        let cond = Condition::forall(
            vec![x.clone()],
            Condition::Literal(pb.literal("on", vec![x.clone().into(), y.clone().into()]).unwrap()),
        );
        assert_eq!(cond.free_variables(), vec![y]);
    }

    #[test]
    fn structural_equality_includes_sign() {
        let pb = blocks();
        let lit = pb.literal("clear", vec![pb.object("a").unwrap()]).unwrap();
        assert_ne!(Condition::Literal(lit.clone()), Condition::Literal(lit.negate()));
        assert_eq!(lit.negate().negate(), lit);
        assert_eq!(lit.to_string(), "(clear a)");
        assert_eq!(lit.negate().to_string(), "(not (clear a))");
    }
}
