use crate::errors::ModelError;
use crate::Sym;

/// Name of the root of the type hierarchy. Every declared type is a subtype of it.
pub const TOP_TYPE: &str = "object";

/// Hierarchy of user-defined object types.
///
/// Each type records its direct parents, which allows multiple inheritance.
#[derive(Clone, Debug)]
pub struct UserTypes {
    top_type: Sym,
    types: hashbrown::HashMap<Sym, Vec<Sym>>,
}

impl Default for UserTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl UserTypes {
    pub fn new() -> Self {
        let top_type = Sym::from(TOP_TYPE);
        let mut types = hashbrown::HashMap::new();
        types.insert(top_type.clone(), Vec::new());
        Self { top_type, types }
    }

    /// Returns true if `a` is `b` or one of its (direct or indirect) subtypes.
    pub fn is_subtype_of(&self, a: &Sym, b: &Sym) -> bool {
        if a == b || b == &self.top_type {
            true
        } else if let Some(parents) = self.types.get(a) {
            parents.iter().any(|parent| self.is_subtype_of(parent, b))
        } else {
            false
        }
    }

    pub fn contains(&self, name: &Sym) -> bool {
        self.types.contains_key(name)
    }

    pub fn check(&self, name: &Sym) -> Result<(), ModelError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(ModelError::UnknownType(name.clone()))
        }
    }

    /// Records a new type with the given parent (the top type if none is given).
    /// If the parent is not recorded yet, it is created as a direct subtype of the top type.
    /// If the type already exists, a new parent is added (multiple inheritance).
    pub fn add_type(&mut self, tpe: impl Into<Sym>, parent: Option<&str>) {
        let tpe = tpe.into();
        if tpe == self.top_type {
            return;
        }
        let parent = parent.map(Sym::from).unwrap_or_else(|| self.top_type.clone());
        if !self.types.contains_key(&parent) {
            self.types.insert(parent.clone(), vec![self.top_type.clone()]);
        }
        let parents = self.types.entry(tpe).or_default();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy() {
        let mut types = UserTypes::new();
        types.add_type("vehicle", None);
        types.add_type("truck", Some("vehicle"));
        types.add_type("amphibian", Some("vehicle"));
        types.add_type("amphibian", Some("boat"));
        types.add_type("location", None);

        let s = |x: &str| Sym::from(x);
        assert!(types.is_subtype_of(&s("truck"), &s("truck")));
        assert!(types.is_subtype_of(&s("truck"), &s("vehicle")));
        assert!(types.is_subtype_of(&s("truck"), &s("object")));
        assert!(types.is_subtype_of(&s("amphibian"), &s("boat")));
        assert!(types.is_subtype_of(&s("boat"), &s("object")));
        assert!(!types.is_subtype_of(&s("vehicle"), &s("truck")));
        assert!(!types.is_subtype_of(&s("truck"), &s("location")));
        assert!(types.check(&s("boat")).is_ok());
        assert_eq!(types.check(&s("plane")), Err(ModelError::UnknownType(s("plane"))));
    }
}
