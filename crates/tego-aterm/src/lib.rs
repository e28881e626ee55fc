//! ATerm terms for the Tego compiler
//!
//! The compiler's input is a tree of terms in the textual ATerm notation:
//!
//! ```text
//! StrategyDecl([], "id", [], ANY(), ANY()){OfType(STRATEGY([], ANY(), ANY()))}
//! ```
//!
//! This crate provides the immutable [`Term`] model with typed
//! [`Attachments`], the [`reader`] that parses the notation and the
//! [`writer`] that prints it back.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annotations;
pub mod attachments;
pub mod error;
pub mod reader;
pub mod term;
pub mod writer;

pub use annotations::Annotations;
pub use attachments::Attachments;
pub use error::{FormatError, ReadError, TermError, TermResult};
pub use reader::{read, read_file, read_from};
pub use term::{Blob, Term, TermKind};
pub use writer::{write, write_file, write_to_string};
