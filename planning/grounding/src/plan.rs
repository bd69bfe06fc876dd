use std::fmt::{Display, Formatter};

use lifted::conditions::IntValue;

use crate::ground::Action;

/// A sequence of ground actions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Plan { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.actions.iter()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action)
    }

    /// Removes and returns the action at position `index` (0-based).
    pub fn remove(&mut self, index: usize) -> Action {
        self.actions.remove(index)
    }

    /// Sum of the costs of the actions.
    pub fn cost(&self) -> IntValue {
        self.actions.iter().map(|a| a.cost).sum()
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, a) in self.actions.iter().enumerate() {
            writeln!(f, "{i:>3}: {a}")?;
        }
        Ok(())
    }
}

impl FromIterator<Action> for Plan {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Plan::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
