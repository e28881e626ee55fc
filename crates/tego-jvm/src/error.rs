//! Type model errors

use thiserror::Error;

/// Errors raised while parsing a descriptor or signature
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The input was empty
    #[error("Empty signature")]
    Empty,

    /// Bracket or `<>` nesting is broken, or a `L...;`/`T...;` is unterminated
    #[error("Malformed signature: {fragment}")]
    Malformed {
        /// The offending part of the input
        fragment: String,
    },

    /// A type was parsed but input remained after it
    #[error("Incomplete signature: {fragment}")]
    Incomplete {
        /// The complete input
        fragment: String,
    },

    /// A method signature was given where a type was expected
    #[error("Method signature is not supported: {fragment}")]
    MethodSignatureUnsupported {
        /// The offending part of the input
        fragment: String,
    },

    /// The lead character does not start any type
    #[error("Signature type is not supported: {fragment}")]
    UnsupportedLead {
        /// The offending part of the input
        fragment: String,
    },
}

/// Errors raised when a type is queried for something it does not have
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The type has no value for the requested property
    #[error("{kind} does not have {property}")]
    NoSuchProperty {
        /// The kind of type that was queried
        kind: String,
        /// The requested property
        property: &'static str,
    },

    /// An object type was expected
    #[error("Expected an object type, got {actual}")]
    NotAnObject {
        /// The type that was given
        actual: String,
    },

    /// Parameterizing a type with the wrong number of type arguments
    #[error("Expected {expected} type arguments, got {actual}")]
    TypeArgCount {
        /// Number of declared type parameters
        expected: usize,
        /// Number of type arguments given
        actual: usize,
    },

    /// An inner class needs an enclosing class
    #[error("Inner class {name} requires an enclosing class")]
    MissingEnclosing {
        /// Name of the inner class
        name: String,
    },
}
