use std::fmt::{Debug, Display, Error, Formatter};

use fixedbitset::FixedBitSet;

use crate::ground::{AtomId, Atoms};

/// Set of ground atoms that are true, all others being false.
#[derive(Clone, Ord, PartialOrd, PartialEq, Eq, Hash, Default)]
pub struct State {
    /// The i^th bit gives the value of the atom whose id is i.
    atoms: FixedBitSet,
}

impl State {
    /// A state where all `num_atoms` atoms are false.
    pub fn new(num_atoms: usize) -> Self {
        State {
            atoms: FixedBitSet::with_capacity(num_atoms),
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_set(&self, atom: AtomId) -> bool {
        self.atoms.contains(atom.into())
    }

    /// Sets the value of an atom, growing the state if it was built for fewer atoms.
    pub fn set_to(&mut self, atom: AtomId, value: bool) {
        let i: usize = atom.into();
        if i >= self.atoms.len() {
            if !value {
                return;
            }
            self.atoms.grow(i + 1);
        }
        self.atoms.set(i, value)
    }

    pub fn add(&mut self, atom: AtomId) {
        self.set_to(atom, true)
    }

    pub fn del(&mut self, atom: AtomId) {
        self.set_to(atom, false)
    }

    pub fn entails_all(&self, atoms: &[AtomId]) -> bool {
        atoms.iter().all(|&a| self.is_set(a))
    }

    pub fn entails_none(&self, atoms: &[AtomId]) -> bool {
        atoms.iter().all(|&a| !self.is_set(a))
    }

    /// Returns all atoms that are true in this state.
    pub fn entailed_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms.ones().map(AtomId::from)
    }

    pub fn num_entailed(&self) -> usize {
        self.atoms.count_ones(..)
    }

    pub fn displayable<'a>(&'a self, atoms: &'a Atoms) -> impl Display + 'a {
        FullState(self, atoms)
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_set().entries(self.atoms.ones()).finish()
    }
}

struct FullState<'a>(&'a State, &'a Atoms);

impl Display for FullState<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{{")?;
        for (i, atom) in self.0.entailed_atoms().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.1.atom(atom))?;
        }
        write!(f, "}}")
    }
}
