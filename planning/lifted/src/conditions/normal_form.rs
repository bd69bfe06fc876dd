use itertools::Itertools;

use super::*;

/// Kind of a condition set, used when flattening nested sets.
#[derive(Copy, Clone, PartialEq, Eq)]
enum SetKind {
    Conjunction,
    Disjunction,
}

impl SetKind {
    fn dual(self) -> SetKind {
        match self {
            SetKind::Conjunction => SetKind::Disjunction,
            SetKind::Disjunction => SetKind::Conjunction,
        }
    }

    fn build(self, elements: Vec<Condition>) -> Condition {
        match self {
            SetKind::Conjunction => Condition::And(elements),
            SetKind::Disjunction => Condition::Or(elements),
        }
    }

    /// Returns the elements of `c` if it is a set of this kind.
    fn elements(self, c: Condition) -> Result<Vec<Condition>, Condition> {
        match (self, c) {
            (SetKind::Conjunction, Condition::And(cs)) | (SetKind::Disjunction, Condition::Or(cs)) => Ok(cs),
            (_, other) => Err(other),
        }
    }

    /// The empty set of the dual kind (false in a conjunction, true in a disjunction).
    fn is_absorbed_by(self, c: &Condition) -> bool {
        match self {
            SetKind::Conjunction => c.is_contradiction(),
            SetKind::Disjunction => c.is_tautology(),
        }
    }

    /// Creates a set from already simplified elements.
    /// Nested sets of the same kind are flattened and constants are folded.
    /// A set with a single element is replaced by this element.
    fn normalized(self, elements: impl IntoIterator<Item = Condition>) -> Condition {
        let mut flat = Vec::new();
        for e in elements {
            match self.elements(e) {
                Ok(nested) => flat.extend(nested),
                Err(e) if self.is_absorbed_by(&e) => return self.dual().build(Vec::new()),
                Err(e) => flat.push(e),
            }
        }
        match flat.len() {
            1 => flat.swap_remove(0),
            _ => self.build(flat),
        }
    }
}

impl Condition {
    /// Returns an equivalent condition in negation normal form, or the normal form of its negation
    /// if `negated` is true.
    ///
    /// Negations are pushed down to literals and numeric comparisons. Nested conjunctions and
    /// disjunctions are flattened and the constants true and false are propagated. Equality
    /// literals whose value does not depend on a binding are evaluated.
    /// The result is a fixed point: simplifying it again yields the same condition.
    pub fn simplify(&self, negated: bool) -> Condition {
        match self {
            Condition::Literal(l) => {
                let l = if negated { l.negate() } else { l.clone() };
                match l.static_equality() {
                    Some(true) => Condition::tautology(),
                    Some(false) => Condition::contradiction(),
                    None => Condition::Literal(l),
                }
            }
            Condition::And(cs) | Condition::Or(cs) => {
                let kind = if matches!(self, Condition::And(_)) {
                    SetKind::Conjunction
                } else {
                    SetKind::Disjunction
                };
                let kind = if negated { kind.dual() } else { kind };
                kind.normalized(cs.iter().map(|c| c.simplify(negated)))
            }
            Condition::Not(c) => c.simplify(!negated),
            Condition::Quantified(q) => {
                let quantifier = if negated { q.quantifier.dual() } else { q.quantifier };
                let inner = q.condition.simplify(negated);
                if q.variables.is_empty() || (inner.is_tautology() && quantifier == Quantifier::Forall) {
                    inner
                } else if inner.is_contradiction() && quantifier == Quantifier::Exists {
                    inner
                } else {
                    Condition::Quantified(Quantification {
                        quantifier,
                        variables: q.variables.clone(),
                        condition: Box::new(inner),
                    })
                }
            }
            Condition::When(w) => {
                // effects cannot be negated, the flag is meaningless here
                let prerequisite = w.prerequisite.simplify(false);
                let consequence = w.consequence.simplify(false);
                if prerequisite.is_contradiction() || consequence.is_tautology() {
                    Condition::tautology()
                } else if prerequisite.is_tautology() {
                    consequence
                } else {
                    Condition::when(prerequisite, consequence)
                }
            }
            Condition::NumericEffect(e) => Condition::NumericEffect(e.clone()),
            Condition::Comparison(c) => {
                let c = if negated { c.negated() } else { c.clone() };
                match c.constant_value() {
                    Some(true) => Condition::tautology(),
                    Some(false) => Condition::contradiction(),
                    None => Condition::Comparison(c),
                }
            }
        }
    }

    /// Converts a condition in negation normal form (see [`Condition::simplify`]) into disjunctive
    /// normal form: a disjunction of conjunctions of literals, or a single conjunction or literal
    /// when there is a single disjunct.
    ///
    /// Conjunction is distributed over disjunction, the size of the result is exponential in the
    /// nesting depth of the input in the worst case.
    /// The prerequisites of conditional effects are converted as well, so that they can be split.
    pub fn dnf(&self) -> Condition {
        match self {
            Condition::Or(cs) => SetKind::Disjunction.normalized(cs.iter().map(Condition::dnf)),
            Condition::And(cs) => {
                if cs.is_empty() {
                    return Condition::tautology();
                }
                let alternatives: Vec<Vec<Condition>> = cs
                    .iter()
                    .map(|c| match c.dnf() {
                        Condition::Or(disjuncts) => disjuncts,
                        other => vec![other],
                    })
                    .collect();
                let disjuncts = alternatives
                    .into_iter()
                    .multi_cartesian_product()
                    .map(|conjuncts| SetKind::Conjunction.normalized(conjuncts))
                    .collect_vec();
                SetKind::Disjunction.normalized(disjuncts)
            }
            Condition::Not(c) => Condition::not(c.dnf()),
            Condition::Quantified(q) => Condition::Quantified(Quantification {
                quantifier: q.quantifier,
                variables: q.variables.clone(),
                condition: Box::new(q.condition.dnf()),
            }),
            Condition::When(w) => Condition::when(w.prerequisite.dnf(), w.consequence.dnf()),
            Condition::Literal(_) | Condition::NumericEffect(_) | Condition::Comparison(_) => self.clone(),
        }
    }
}
