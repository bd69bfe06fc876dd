use std::fmt::{Display, Formatter};

use lifted::{Argument, Literal, Sym};
use smallvec::SmallVec;

/// Compact, numeric representation of a ground atom.
///
/// Identifiers are dense: the atoms of a ground problem are numbered from 0 in the order they
/// were interned, which allows representing states as bitsets.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct AtomId(u32);

impl From<AtomId> for usize {
    fn from(atom: AtomId) -> Self {
        atom.0 as usize
    }
}

impl From<usize> for AtomId {
    fn from(i: usize) -> Self {
        debug_assert!(i <= u32::MAX as usize);
        AtomId(i as u32)
    }
}

/// A predicate applied to objects, e.g. `(on a b)`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GroundAtom {
    pub predicate: Sym,
    pub args: SmallVec<[Sym; 3]>,
}

impl GroundAtom {
    pub fn new(predicate: Sym, args: impl IntoIterator<Item = Sym>) -> Self {
        GroundAtom {
            predicate,
            args: args.into_iter().collect(),
        }
    }

    /// Atom of a ground literal, ignoring its sign. Returns `None` if the literal has a variable.
    pub fn of(literal: &Literal) -> Option<GroundAtom> {
        let mut args = SmallVec::with_capacity(literal.args.len());
        for a in &literal.args {
            match a {
                Argument::Constant(o) => args.push(o.name().clone()),
                Argument::Variable(_) => return None,
            }
        }
        Some(GroundAtom {
            predicate: literal.predicate.name.clone(),
            args,
        })
    }
}

impl Display for GroundAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        write!(f, ")")
    }
}

/// Interning pool associating each ground atom to a unique `AtomId`.
#[derive(Clone, Debug, Default)]
pub struct Atoms {
    atoms: Vec<GroundAtom>,
    ids: hashbrown::HashMap<GroundAtom, AtomId>,
}

impl Atoms {
    /// Returns the identifier of the atom, creating a new one if the atom was never seen.
    pub fn intern(&mut self, atom: GroundAtom) -> AtomId {
        if let Some(&id) = self.ids.get(&atom) {
            return id;
        }
        let id = AtomId::from(self.atoms.len());
        self.atoms.push(atom.clone());
        self.ids.insert(atom, id);
        id
    }

    /// Retrieves the ID of a given atom. Returns None if no such atom is known.
    pub fn id(&self, atom: &GroundAtom) -> Option<AtomId> {
        self.ids.get(atom).copied()
    }

    pub fn atom(&self, id: AtomId) -> &GroundAtom {
        &self.atoms[usize::from(id)]
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &GroundAtom)> + '_ {
        self.atoms.iter().enumerate().map(|(i, a)| (AtomId::from(i), a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning() {
        let atom = |p: &str, args: &[&str]| GroundAtom::new(Sym::from(p), args.iter().map(|&a| Sym::from(a)));
        let mut atoms = Atoms::default();
        let a = atoms.intern(atom("at", &["a"]));
        let b = atoms.intern(atom("at", &["b"]));
        assert_ne!(a, b);
        assert_eq!(atoms.intern(atom("at", &["a"])), a);
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms.id(&atom("at", &["b"])), Some(b));
        assert_eq!(atoms.id(&atom("at", &["c"])), None);
        assert_eq!(atoms.atom(b).to_string(), "(at b)");
        assert_eq!(usize::from(a), 0);
    }
}
