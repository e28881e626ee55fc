//! The annotations attachment

use crate::term::Term;
use std::fmt;

/// The ordered annotation terms of a term, written `t{a, b}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations(Vec<Term>);

impl Annotations {
    /// Annotations from a list of terms
    pub fn new(terms: Vec<Term>) -> Self {
        Self(terms)
    }

    /// The annotation terms
    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no annotations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first application with the given constructor and arity
    ///
    /// `None` for `arity` matches any arity.
    pub fn find(&self, constructor: &str, arity: Option<usize>) -> Option<&Term> {
        self.0.iter().find(|term| {
            term.constructor().ok() == Some(constructor) && arity.map_or(true, |a| term.arity() == a)
        })
    }
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, term) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", term)?;
        }
        f.write_str("}")
    }
}
