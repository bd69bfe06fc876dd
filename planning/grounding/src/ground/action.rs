use std::fmt::{Display, Formatter};

use lifted::conditions::IntValue;
use lifted::Sym;

use crate::ground::{AtomId, Atoms, State};

/// A ground formula over atoms, used for the parts of a condition that are not a plain conjunction
/// of literals (only present when disjunctions are kept).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Formula {
    Lit { atom: AtomId, positive: bool },
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn holds(&self, state: &State) -> bool {
        match self {
            Formula::Lit { atom, positive } => state.is_set(*atom) == *positive,
            Formula::And(fs) => fs.iter().all(|f| f.holds(state)),
            Formula::Or(fs) => fs.iter().any(|f| f.holds(state)),
        }
    }

    /// Truth value in the delete relaxation, where negative literals are assumed to hold.
    pub fn relaxed_holds(&self, state: &State) -> bool {
        match self {
            Formula::Lit { atom, positive } => !*positive || state.is_set(*atom),
            Formula::And(fs) => fs.iter().all(|f| f.relaxed_holds(state)),
            Formula::Or(fs) => fs.iter().any(|f| f.relaxed_holds(state)),
        }
    }

    /// Atoms of the formula, each with the sign it appears with.
    pub fn literals(&self) -> Box<dyn Iterator<Item = (AtomId, bool)> + '_> {
        match self {
            Formula::Lit { atom, positive } => Box::new(std::iter::once((*atom, *positive))),
            Formula::And(fs) | Formula::Or(fs) => Box::new(fs.iter().flat_map(|f| f.literals())),
        }
    }

    fn fmt_with(&self, f: &mut Formatter<'_>, atoms: &Atoms) -> std::fmt::Result {
        match self {
            Formula::Lit { atom, positive: true } => write!(f, "{}", atoms.atom(*atom)),
            Formula::Lit { atom, positive: false } => write!(f, "(not {})", atoms.atom(*atom)),
            Formula::And(fs) | Formula::Or(fs) => {
                write!(f, "({}", if matches!(self, Formula::And(_)) { "and" } else { "or" })?;
                for sub in fs {
                    write!(f, " ")?;
                    sub.fmt_with(f, atoms)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Ground condition: a conjunction of positive and negative atoms, together with an optional formula
/// for the remainder of the condition.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Guard {
    pub positive: Vec<AtomId>,
    pub negative: Vec<AtomId>,
    pub formula: Option<Formula>,
}

impl Guard {
    /// A guard that never holds.
    pub fn unsatisfiable() -> Guard {
        Guard {
            formula: Some(Formula::Or(Vec::new())),
            ..Default::default()
        }
    }

    /// True if the guard holds in any state.
    pub fn is_trivial(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty() && self.formula.is_none()
    }

    pub fn holds(&self, state: &State) -> bool {
        state.entails_all(&self.positive)
            && state.entails_none(&self.negative)
            && self.formula.as_ref().is_none_or(|f| f.holds(state))
    }

    /// Truth value in the delete relaxation, where negative literals are assumed to hold.
    pub fn relaxed_holds(&self, state: &State) -> bool {
        state.entails_all(&self.positive) && self.formula.as_ref().is_none_or(|f| f.relaxed_holds(state))
    }

    /// Atoms the guard depends on, each with the sign it appears with.
    pub fn literals(&self) -> impl Iterator<Item = (AtomId, bool)> + '_ {
        let positive = self.positive.iter().map(|&a| (a, true));
        let negative = self.negative.iter().map(|&a| (a, false));
        positive
            .chain(negative)
            .chain(self.formula.iter().flat_map(|f| f.literals()))
    }

    pub fn displayable<'a>(&'a self, atoms: &'a Atoms) -> impl Display + 'a {
        DispGuard(self, atoms)
    }
}

struct DispGuard<'a>(&'a Guard, &'a Atoms);

impl Display for DispGuard<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let DispGuard(guard, atoms) = self;
        write!(f, "(and")?;
        for &a in &guard.positive {
            write!(f, " {}", atoms.atom(a))?;
        }
        for &a in &guard.negative {
            write!(f, " (not {})", atoms.atom(a))?;
        }
        if let Some(formula) = &guard.formula {
            write!(f, " ")?;
            formula.fmt_with(f, atoms)?;
        }
        write!(f, ")")
    }
}

/// Add and delete effects that only take place if their guard holds in the state where the
/// action is applied.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ConditionalEffect {
    pub guard: Guard,
    pub add: Vec<AtomId>,
    pub del: Vec<AtomId>,
}

/// Ground instance of an operator.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Action {
    pub name: Sym,
    pub args: Vec<Sym>,
    pub cost: IntValue,
    pub precondition: Guard,
    pub add: Vec<AtomId>,
    pub del: Vec<AtomId>,
    pub conditional: Vec<ConditionalEffect>,
}

impl Action {
    pub fn is_applicable(&self, state: &State) -> bool {
        self.precondition.holds(state)
    }

    /// Returns the state resulting from the application of the action in `state`.
    ///
    /// Conditional effects are evaluated in `state`. Delete effects are applied before add effects,
    /// so that an atom both added and deleted is true in the result.
    pub fn apply(&self, state: &State) -> State {
        debug_assert!(self.is_applicable(state));
        let triggered: Vec<&ConditionalEffect> =
            self.conditional.iter().filter(|c| c.guard.holds(state)).collect();
        let mut next = state.clone();
        for &atom in self.del.iter().chain(triggered.iter().flat_map(|c| c.del.iter())) {
            next.del(atom);
        }
        for &atom in self.add.iter().chain(triggered.iter().flat_map(|c| c.add.iter())) {
            next.add(atom);
        }
        next
    }

    /// Atoms made true by the action in the delete relaxation of `state`.
    pub fn relaxed_adds<'a>(&'a self, state: &'a State) -> impl Iterator<Item = AtomId> + 'a {
        let conditional = self
            .conditional
            .iter()
            .filter(move |c| c.guard.relaxed_holds(state))
            .flat_map(|c| c.add.iter());
        self.add.iter().chain(conditional).copied()
    }

    pub fn displayable<'a>(&'a self, atoms: &'a Atoms) -> impl Display + 'a {
        DispAction(self, atoms)
    }
}

/// Name of the action with its arguments, e.g. `(move a b)`.
impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.name)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        write!(f, ")")
    }
}

struct DispAction<'a>(&'a Action, &'a Atoms);

impl Display for DispAction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let DispAction(action, atoms) = self;
        writeln!(f, "{action} [cost {}]", action.cost)?;
        writeln!(f, "  pre: {}", action.precondition.displayable(atoms))?;
        let effects = |f: &mut Formatter<'_>, add: &[AtomId], del: &[AtomId]| -> std::fmt::Result {
            for &a in add {
                write!(f, " {}", atoms.atom(a))?;
            }
            for &a in del {
                write!(f, " (not {})", atoms.atom(a))?;
            }
            Ok(())
        };
        write!(f, "  eff:")?;
        effects(f, &action.add, &action.del)?;
        for c in &action.conditional {
            write!(f, "\n  when {}:", c.guard.displayable(atoms))?;
            effects(f, &c.add, &c.del)?;
        }
        Ok(())
    }
}

/// Ground derived-predicate rule: `atom` holds whenever `guard` does.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GroundAxiom {
    pub atom: AtomId,
    pub guard: Guard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(i: usize) -> AtomId {
        AtomId::from(i)
    }

    fn action(pre: Guard, add: &[usize], del: &[usize], conditional: Vec<ConditionalEffect>) -> Action {
        Action {
            name: Sym::from("act"),
            args: Vec::new(),
            cost: 1,
            precondition: pre,
            add: add.iter().copied().map(atom).collect(),
            del: del.iter().copied().map(atom).collect(),
            conditional,
        }
    }

    fn state(atoms: &[usize]) -> State {
        let mut s = State::new(4);
        for &a in atoms {
            s.add(atom(a));
        }
        s
    }

    #[test]
    fn guards() {
        let g = Guard {
            positive: vec![atom(0)],
            negative: vec![atom(1)],
            formula: Some(Formula::Or(vec![
                Formula::Lit {
                    atom: atom(2),
                    positive: true,
                },
                Formula::Lit {
                    atom: atom(3),
                    positive: false,
                },
            ])),
        };
        assert!(g.holds(&state(&[0])));
        assert!(!g.holds(&state(&[0, 3])));
        assert!(g.holds(&state(&[0, 2, 3])));
        assert!(!g.holds(&state(&[0, 1])));
        assert!(g.relaxed_holds(&state(&[0, 1, 3])));
        assert!(!g.relaxed_holds(&state(&[1])));
        assert!(!Guard::unsatisfiable().holds(&state(&[0, 1, 2, 3])));
        assert_eq!(
            g.literals().collect::<Vec<_>>(),
            vec![(atom(0), true), (atom(1), false), (atom(2), true), (atom(3), false)]
        );
        assert!(Guard::default().is_trivial());
    }

    #[test]
    fn deletes_before_adds() {
        let a = action(Guard::default(), &[1], &[0, 1], vec![]);
        let s = a.apply(&state(&[0]));
        assert_eq!(s, state(&[1]));
    }

    #[test]
    fn conditional_effects_use_pre_state() {
        // when 0 holds: add 2 and delete 0, when 2 holds: add 3
        let a = action(
            Guard::default(),
            &[],
            &[],
            vec![
                ConditionalEffect {
                    guard: Guard {
                        positive: vec![atom(0)],
                        ..Default::default()
                    },
                    add: vec![atom(2)],
                    del: vec![atom(0)],
                },
                ConditionalEffect {
                    guard: Guard {
                        positive: vec![atom(2)],
                        ..Default::default()
                    },
                    add: vec![atom(3)],
                    del: vec![],
                },
            ],
        );
        let init = state(&[0]);
        assert_eq!(a.apply(&init), state(&[2]));
        assert_eq!(init, state(&[0]));
        assert_eq!(a.relaxed_adds(&init).collect::<Vec<_>>(), vec![atom(2)]);
    }
}
