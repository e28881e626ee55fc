//! JVM type model for the Tego compiler
//!
//! This crate models the type system of the JVM as it appears in class files:
//! primitives, arrays, (nested) object types, type variables and
//! variance-annotated type arguments. Every type has two encodings:
//!
//! - a **descriptor**, the erased form used to type fields and methods
//!   (`Ljava/util/List;`)
//! - a **signature**, the generic form kept for reflection
//!   (`Ljava/util/List<TE;>;`)
//!
//! Both encodings can be parsed back into the model with [`JvmType::from_descriptor`]
//! and [`JvmType::from_signature`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod known;
pub mod parse;
pub mod signature;
pub mod ty;

pub use error::{SignatureError, TypeError};
pub use signature::{JvmClassSignature, JvmFieldSignature, JvmMethodSignature, JvmTypeParam};
pub use ty::{JvmObject, JvmType, JvmTypeArg, JvmTypeSort, Variance};
