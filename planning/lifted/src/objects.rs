use derive_more::derive::Display;
use std::hash::Hash;

use crate::errors::ModelError;
use crate::types::UserTypes;
use crate::Sym;

/// A constant of the problem: a named object of a given type.
#[derive(Clone, Display, Debug)]
#[display("{}", name)]
pub struct Object {
    name: Sym,
    tpe: Sym,
}

impl Object {
    pub fn new(name: impl Into<Sym>, tpe: impl Into<Sym>) -> Self {
        Self {
            name: name.into(),
            tpe: tpe.into(),
        }
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }

    pub fn tpe(&self) -> &Sym {
        &self.tpe
    }
}

// object names are unique within a problem
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Object {}

impl Hash for Object {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

/// The constant pool of a problem, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Objects {
    objects: Vec<Object>,
    index: hashbrown::HashMap<Sym, usize>,
}

impl std::fmt::Display for Objects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Objects:")?;
        for o in self.iter() {
            write!(f, "\n  {}: {}", o.name, o.tpe)?;
        }
        writeln!(f)
    }
}

impl Objects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, name: impl Into<Sym>, tpe: impl Into<Sym>) -> Result<(), ModelError> {
        let name = name.into();
        let tpe = tpe.into();
        if let Some(&i) = self.index.get(&name) {
            let previous = &self.objects[i];
            if previous.tpe == tpe {
                // exact redeclaration, some domains declare constants both in the domain and the problem
                Ok(())
            } else {
                Err(ModelError::DuplicateObject(name, previous.tpe.clone(), tpe))
            }
        } else {
            self.index.insert(name.clone(), self.objects.len());
            self.objects.push(Object::new(name, tpe));
            Ok(())
        }
    }

    pub fn get(&self, name: &str) -> Result<&Object, ModelError> {
        match self.index.get(name) {
            Some(&i) => Ok(&self.objects[i]),
            None => Err(ModelError::UnknownObject(Sym::from(name))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects whose type is `tpe` or one of its subtypes, in declaration order.
    pub fn instances_of<'a>(&'a self, tpe: &'a Sym, types: &'a UserTypes) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| types.is_subtype_of(&o.tpe, tpe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration() {
        let mut types = UserTypes::new();
        types.add_type("location", None);
        types.add_type("city", Some("location"));
        types.add_type("truck", None);

        let mut objects = Objects::new();
        objects.add_object("paris", "city").unwrap();
        objects.add_object("depot", "location").unwrap();
        objects.add_object("t1", "truck").unwrap();
        // identical redeclaration is accepted
        objects.add_object("t1", "truck").unwrap();
        assert!(matches!(
            objects.add_object("t1", "location"),
            Err(ModelError::DuplicateObject(..))
        ));
        assert_eq!(objects.len(), 3);

        let location = Sym::from("location");
        let locs: Vec<&str> = objects
            .instances_of(&location, &types)
            .map(|o| o.name().canonical_str())
            .collect();
        assert_eq!(locs, vec!["paris", "depot"]);
        assert!(objects.get("t2").is_err());
    }
}
