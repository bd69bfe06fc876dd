use std::fmt::{Debug, Display};

/// Identifier of a model element (type, object, predicate, operator, variable, ...).
///
/// Symbols are compared by their canonical text. The underlying type uses small string
/// optimization to avoid heap allocation for the short identifiers that dominate planning models.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sym {
    symbol: compact_str::CompactString,
}

impl Sym {
    pub fn new(s: impl AsRef<str>) -> Sym {
        Sym {
            symbol: compact_str::CompactString::new(s.as_ref()),
        }
    }

    pub fn canonical_str(&self) -> &str {
        self.symbol.as_str()
    }
}

impl AsRef<str> for Sym {
    fn as_ref(&self) -> &str {
        &self.symbol
    }
}

impl std::borrow::Borrow<str> for Sym {
    fn borrow(&self) -> &str {
        &self.symbol
    }
}

impl From<&str> for Sym {
    fn from(value: &str) -> Self {
        Sym::new(value)
    }
}

impl From<String> for Sym {
    fn from(value: String) -> Self {
        Sym {
            symbol: value.into(),
        }
    }
}

impl From<&Sym> for Sym {
    fn from(value: &Sym) -> Self {
        value.clone()
    }
}

impl Debug for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Display for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl PartialEq<str> for Sym {
    fn eq(&self, other: &str) -> bool {
        self.canonical_str() == other
    }
}

impl PartialEq<&str> for Sym {
    fn eq(&self, other: &&str) -> bool {
        self.canonical_str() == *other
    }
}
