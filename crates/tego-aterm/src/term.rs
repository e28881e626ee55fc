//! The term model
//!
//! A [`Term`] is an immutable tree node: a constructor application, a list,
//! a string, an integer, a real, a placeholder, an opaque blob or a variable.
//! Each term carries a set of [`Attachments`]; one of them holds its
//! [`Annotations`]. Equality compares kind and payload only.

use crate::annotations::Annotations;
use crate::attachments::Attachments;
use crate::error::{TermError, TermResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque value carried by a term
#[derive(Clone)]
pub struct Blob(Arc<dyn Any + Send + Sync>);

impl Blob {
    /// Wrap a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// The value, if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Blob(..)")
    }
}

/// The kind and payload of a term
#[derive(Debug, Clone, PartialEq)]
pub enum TermKind {
    /// Constructor application; the empty constructor is a tuple
    Appl {
        /// Constructor name
        constructor: String,
        /// Arguments
        args: Vec<Term>,
    },
    /// List
    List(Vec<Term>),
    /// String literal
    Str(String),
    /// Integer literal
    Int(i64),
    /// Real literal
    Real(f64),
    /// Placeholder `<t>` around a template term
    Placeholder(Box<Term>),
    /// Opaque value
    Blob(Blob),
    /// Term variable
    Var(String),
}

/// A term with its attachments
#[derive(Debug, Clone)]
pub struct Term {
    kind: TermKind,
    attachments: Attachments,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<TermKind> for Term {
    fn from(kind: TermKind) -> Self {
        Term {
            kind,
            attachments: Attachments::new(),
        }
    }
}

impl Term {
    // ===== Construction =====

    /// Constructor application
    pub fn appl(constructor: impl Into<String>, args: Vec<Term>) -> Term {
        TermKind::Appl {
            constructor: constructor.into(),
            args,
        }
        .into()
    }

    /// Tuple, an application of the empty constructor
    pub fn tuple(elements: Vec<Term>) -> Term {
        Term::appl("", elements)
    }

    /// List
    pub fn list(elements: Vec<Term>) -> Term {
        TermKind::List(elements).into()
    }

    /// String
    pub fn string(value: impl Into<String>) -> Term {
        TermKind::Str(value.into()).into()
    }

    /// Integer
    pub fn int(value: i64) -> Term {
        TermKind::Int(value).into()
    }

    /// Real
    pub fn real(value: f64) -> Term {
        TermKind::Real(value).into()
    }

    /// Placeholder
    pub fn placeholder(template: Term) -> Term {
        TermKind::Placeholder(Box::new(template)).into()
    }

    /// Blob
    pub fn blob(value: Blob) -> Term {
        TermKind::Blob(value).into()
    }

    /// Variable
    pub fn var(name: impl Into<String>) -> Term {
        TermKind::Var(name.into()).into()
    }

    // ===== Attachments =====

    /// The kind and payload
    pub fn kind(&self) -> &TermKind {
        &self.kind
    }

    /// The attachments
    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    /// A copy with different attachments
    pub fn with_attachments(&self, attachments: Attachments) -> Term {
        Term {
            kind: self.kind.clone(),
            attachments,
        }
    }

    /// Replace the attachments
    pub fn set_attachments(mut self, attachments: Attachments) -> Term {
        self.attachments = attachments;
        self
    }

    /// The annotation terms, empty if there are none
    pub fn annotations(&self) -> &[Term] {
        self.attachments
            .get::<Annotations>()
            .map(Annotations::terms)
            .unwrap_or(&[])
    }

    /// This term with `annotations` replacing its annotations
    pub fn annotated(self, annotations: Vec<Term>) -> Term {
        let attachments = if annotations.is_empty() {
            self.attachments.without::<Annotations>()
        } else {
            self.attachments.with(Annotations::new(annotations))
        };
        self.set_attachments(attachments)
    }

    /// The first annotation with the given constructor and arity
    pub fn annotation(&self, constructor: &str, arity: Option<usize>) -> Option<&Term> {
        self.attachments
            .get::<Annotations>()
            .and_then(|annotations| annotations.find(constructor, arity))
    }

    // ===== Accessors =====

    /// A short name of the kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TermKind::Appl { constructor, .. } if constructor.is_empty() => "tuple",
            TermKind::Appl { .. } => "constructor application",
            TermKind::List(_) => "list term",
            TermKind::Str(_) => "string term",
            TermKind::Int(_) => "integer term",
            TermKind::Real(_) => "real term",
            TermKind::Placeholder(_) => "placeholder term",
            TermKind::Blob(_) => "blob term",
            TermKind::Var(_) => "term variable",
        }
    }

    fn unexpected(&self, expected: &'static str) -> TermError {
        TermError::UnexpectedKind {
            expected,
            actual: self.kind_name(),
            term: self.to_string(),
        }
    }

    /// The subterms: arguments of an application or elements of a list;
    /// empty otherwise
    pub fn subterms(&self) -> &[Term] {
        match &self.kind {
            TermKind::Appl { args, .. } => args,
            TermKind::List(elements) => elements,
            _ => &[],
        }
    }

    /// Template of a placeholder
    pub fn template(&self) -> TermResult<&Term> {
        match &self.kind {
            TermKind::Placeholder(template) => Ok(template),
            _ => Err(self.unexpected("placeholder term")),
        }
    }

    /// Number of subterms
    pub fn arity(&self) -> usize {
        self.subterms().len()
    }

    /// Subterm `index`
    pub fn get(&self, index: usize) -> TermResult<&Term> {
        self.subterms()
            .get(index)
            .ok_or_else(|| TermError::IndexOutOfRange {
                index,
                arity: self.arity(),
                term: self.to_string(),
            })
    }

    /// Constructor name of an application
    pub fn constructor(&self) -> TermResult<&str> {
        match &self.kind {
            TermKind::Appl { constructor, .. } => Ok(constructor),
            _ => Err(self.unexpected("constructor application")),
        }
    }

    /// Constructor and arguments of an application
    pub fn as_appl(&self) -> TermResult<(&str, &[Term])> {
        match &self.kind {
            TermKind::Appl { constructor, args } => Ok((constructor, args)),
            _ => Err(self.unexpected("constructor application")),
        }
    }

    /// Whether this is an application of `constructor` with `arity` arguments
    pub fn is_appl(&self, constructor: &str, arity: usize) -> bool {
        matches!(&self.kind, TermKind::Appl { constructor: c, args } if c == constructor && args.len() == arity)
    }

    /// Elements of a list
    pub fn as_list(&self) -> TermResult<&[Term]> {
        match &self.kind {
            TermKind::List(elements) => Ok(elements),
            _ => Err(self.unexpected("list term")),
        }
    }

    /// Value of a string
    pub fn as_str(&self) -> TermResult<&str> {
        match &self.kind {
            TermKind::Str(value) => Ok(value),
            _ => Err(self.unexpected("string term")),
        }
    }

    /// Value of an integer
    pub fn as_int(&self) -> TermResult<i64> {
        match &self.kind {
            TermKind::Int(value) => Ok(*value),
            _ => Err(self.unexpected("integer term")),
        }
    }

    /// Value of a real
    pub fn as_real(&self) -> TermResult<f64> {
        match &self.kind {
            TermKind::Real(value) => Ok(*value),
            _ => Err(self.unexpected("real term")),
        }
    }
}

/// Write `value` as a quoted string literal
pub(crate) fn write_quoted(f: &mut impl fmt::Write, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{c}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Write a real so that it reads back as a real
pub(crate) fn write_real(f: &mut impl fmt::Write, value: f64) -> fmt::Result {
    let text = value.to_string();
    f.write_str(&text)?;
    if !text.contains(['.', 'e', 'E']) {
        f.write_str(".0")?;
    }
    Ok(())
}

fn write_sequence(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TermKind::Appl { constructor, args } => {
                write!(f, "{}(", constructor)?;
                write_sequence(f, args)?;
                f.write_str(")")?;
            }
            TermKind::List(elements) => {
                f.write_str("[")?;
                write_sequence(f, elements)?;
                f.write_str("]")?;
            }
            TermKind::Str(value) => write_quoted(f, value)?,
            TermKind::Int(value) => write!(f, "{}", value)?,
            TermKind::Real(value) => write_real(f, *value)?,
            TermKind::Placeholder(template) => write!(f, "<{}>", template)?,
            TermKind::Blob(_) => f.write_str("<blob>")?,
            TermKind::Var(name) => f.write_str(name)?,
        }
        if let Some(annotations) = self.attachments.get::<Annotations>() {
            if !annotations.is_empty() {
                write!(f, "{}", annotations)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_annotations() {
        let plain = Term::appl("Foo", vec![Term::int(1)]);
        let annotated = plain.clone().annotated(vec![Term::appl("Anno", vec![])]);
        assert_eq!(plain, annotated);
        assert_eq!(annotated.annotations().len(), 1);
        assert!(plain.annotations().is_empty());
    }

    #[test]
    fn test_display() {
        let term = Term::appl(
            "Cons",
            vec![
                Term::string("a\"b\\c\n"),
                Term::list(vec![Term::int(-3), Term::real(4200.0)]),
                Term::tuple(vec![]),
                Term::placeholder(Term::var("x")),
            ],
        )
        .annotated(vec![Term::appl("OfType", vec![Term::appl("INT", vec![])])]);
        assert_eq!(
            term.to_string(),
            r#"Cons("a\"b\\c\n", [-3, 4200.0], (), <x>){OfType(INT())}"#
        );
    }

    #[test]
    fn test_accessors() {
        let term = Term::appl("Pair", vec![Term::string("s"), Term::int(7)]);
        assert_eq!(term.constructor().unwrap(), "Pair");
        assert_eq!(term.arity(), 2);
        assert_eq!(term.get(0).unwrap().as_str().unwrap(), "s");
        assert_eq!(term.get(1).unwrap().as_int().unwrap(), 7);
        assert!(term.is_appl("Pair", 2));
        assert!(!term.is_appl("Pair", 1));

        assert!(matches!(
            term.get(2),
            Err(TermError::IndexOutOfRange { index: 2, arity: 2, .. })
        ));
        assert!(matches!(
            term.as_list(),
            Err(TermError::UnexpectedKind { expected: "list term", actual: "constructor application", .. })
        ));
        assert!(Term::int(1).subterms().is_empty());
    }

    #[test]
    fn test_placeholder_has_no_subterms() {
        let term = Term::placeholder(Term::appl("Foo", vec![Term::int(1)]));
        assert!(term.subterms().is_empty());
        assert_eq!(term.arity(), 0);
        assert!(matches!(term.get(0), Err(TermError::IndexOutOfRange { index: 0, arity: 0, .. })));
        assert!(term.template().unwrap().is_appl("Foo", 1));
        assert!(matches!(
            Term::int(1).template(),
            Err(TermError::UnexpectedKind { expected: "placeholder term", .. })
        ));
    }

    #[test]
    fn test_annotation_lookup() {
        let term = Term::int(1).annotated(vec![
            Term::appl("A", vec![]),
            Term::appl("B", vec![Term::int(1)]),
            Term::appl("B", vec![Term::int(2), Term::int(3)]),
        ]);
        assert_eq!(term.annotation("B", Some(2)).unwrap().arity(), 2);
        assert_eq!(term.annotation("B", None).unwrap().arity(), 1);
        assert!(term.annotation("C", None).is_none());
    }

    #[test]
    fn test_blob_identity() {
        let blob = Blob::new(42u32);
        let a = Term::blob(blob.clone());
        let b = Term::blob(blob);
        let c = Term::blob(Blob::new(42u32));
        assert_eq!(a, b);
        assert_ne!(a, c);
        if let TermKind::Blob(value) = a.kind() {
            assert_eq!(value.downcast_ref::<u32>(), Some(&42));
        }
    }
}
