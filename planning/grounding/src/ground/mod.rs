//! Ground state-transition model and its construction from a lifted problem.

mod action;
mod atoms;
mod instantiate;
mod naive;
mod rpg;
mod state;

pub use action::*;
pub use atoms::*;
pub use state::*;

use std::fmt::{Display, Formatter};

use hashbrown::HashMap;
use lifted::{Problem, Sym};
use thiserror::Error;

use crate::config::GroundingStrategy;

/// Elements of a lifted problem that have no counterpart in the ground model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroundingError {
    #[error("numeric condition {condition} in {context} is not supported by the ground model")]
    NumericCondition { condition: String, context: Sym },
    #[error("disjunctive effect {effect} in {context} is not supported by the ground model")]
    DisjunctiveEffect { effect: String, context: Sym },
    #[error("unexpected element {element} in {context}")]
    Malformed { element: String, context: Sym },
    #[error("derived predicate {predicate} depends negatively on itself")]
    NotStratifiable { predicate: Sym },
}

/// A fully instantiated planning problem: states are sets of atoms from a fixed pool and
/// transitions are given by actions.
#[derive(Clone, Debug)]
pub struct GroundProblem {
    pub atoms: Atoms,
    /// Initial state, closed under the derived-predicate rules.
    pub init: State,
    pub goal: Guard,
    pub actions: Vec<Action>,
    /// Derived-predicate rules, sorted by stratum.
    pub axioms: Vec<GroundAxiom>,
    /// End of each stratum in `axioms`.
    strata: Vec<usize>,
}

impl GroundProblem {
    pub fn initial_state(&self) -> &State {
        &self.init
    }

    pub fn is_goal(&self, state: &State) -> bool {
        self.goal.holds(state)
    }

    /// All actions applicable in `state`.
    pub fn applicable<'a>(&'a self, state: &'a State) -> impl Iterator<Item = (usize, &'a Action)> + 'a {
        self.actions
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.is_applicable(state))
    }

    /// State reached by applying `action` in `state`, with derived atoms recomputed.
    pub fn successor(&self, state: &State, action: &Action) -> State {
        self.close(action.apply(state))
    }

    /// Recomputes the derived atoms of `state`: they are reset to false and the derived-predicate
    /// rules are applied until a fixed point is reached, one stratum after the other.
    /// A rule only depends negatively on atoms of lower strata, whose values are final when the
    /// rule is evaluated.
    pub fn close(&self, mut state: State) -> State {
        if self.axioms.is_empty() {
            return state;
        }
        for ax in &self.axioms {
            state.del(ax.atom);
        }
        let mut start = 0;
        for &end in &self.strata {
            let stratum = &self.axioms[start..end];
            let mut changed = true;
            while changed {
                changed = false;
                for ax in stratum {
                    if !state.is_set(ax.atom) && ax.guard.holds(&state) {
                        state.add(ax.atom);
                        changed = true;
                    }
                }
            }
            start = end;
        }
        state
    }

    pub fn display_state<'a>(&'a self, state: &'a State) -> impl Display + 'a {
        state.displayable(&self.atoms)
    }
}

impl Display for GroundProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Atoms: {}", self.atoms.len())?;
        writeln!(f, "Init: {}", self.display_state(&self.init))?;
        writeln!(f, "Goal: {}", self.goal.displayable(&self.atoms))?;
        writeln!(f, "Actions:")?;
        for a in &self.actions {
            writeln!(f, "{}", a.displayable(&self.atoms))?;
        }
        if !self.axioms.is_empty() {
            writeln!(f, "Axioms:")?;
            for ax in &self.axioms {
                writeln!(f, "  {} <- {}", self.atoms.atom(ax.atom), ax.guard.displayable(&self.atoms))?;
            }
        }
        Ok(())
    }
}

/// Sorts the derived-predicate rules by stratum. Strata are computed on predicates: the stratum of
/// a derived predicate is at least the one of the derived predicates it depends on positively, and
/// above the one of those it depends on negatively.
///
/// Returns the sorted rules with the end index of each stratum, or an error if a derived predicate
/// depends negatively on itself.
fn stratify(atoms: &Atoms, mut axioms: Vec<GroundAxiom>) -> Result<(Vec<GroundAxiom>, Vec<usize>), GroundingError> {
    let predicate = |ax: &GroundAxiom| atoms.atom(ax.atom).predicate.clone();
    let mut level: HashMap<Sym, usize> = axioms.iter().map(|ax| (predicate(ax), 0)).collect();
    // with n derived predicates, a stratifiable program has at most n strata
    let max_level = level.len();
    let mut changed = true;
    while changed {
        changed = false;
        for ax in &axioms {
            let head = predicate(ax);
            let mut required = level[&head];
            for (atom, positive) in ax.guard.literals() {
                if let Some(&l) = level.get(&atoms.atom(atom).predicate) {
                    required = required.max(if positive { l } else { l + 1 });
                }
            }
            if required > level[&head] {
                if required >= max_level {
                    return Err(GroundingError::NotStratifiable { predicate: head });
                }
                level.insert(head, required);
                changed = true;
            }
        }
    }

    axioms.sort_by_key(|ax| level[&predicate(ax)]);
    let num_strata = level.values().max().map_or(0, |&l| l + 1);
    let mut strata = vec![0; num_strata];
    for ax in &axioms {
        strata[level[&predicate(ax)]] += 1;
    }
    for i in 1..num_strata {
        strata[i] += strata[i - 1];
    }
    Ok((axioms, strata))
}

/// Builds the ground model of a (preprocessed) lifted problem with the given strategy.
///
/// Both strategies yield the same actions reachable from the initial state. The naive strategy
/// also keeps instances that can never be applied.
pub fn ground(problem: &Problem, strategy: GroundingStrategy) -> Result<GroundProblem, GroundingError> {
    let _span = tracing::span!(tracing::Level::DEBUG, "GROUNDING", %strategy).entered();
    let ground = match strategy {
        GroundingStrategy::Naive => naive::ground_naive(problem)?,
        GroundingStrategy::RelaxedPlanningGraph => rpg::ground_rpg(problem)?,
    };
    tracing::debug!(
        atoms = ground.atoms.len(),
        actions = ground.actions.len(),
        axioms = ground.axioms.len(),
        "grounding done"
    );
    Ok(ground)
}
