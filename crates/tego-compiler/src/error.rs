//! Compilation errors

use tego_aterm::{FormatError, TermError};
use tego_bytecode::{ClassFileError, VerifyError};
use tego_jvm::{SignatureError, TypeError};
use thiserror::Error;

/// Result alias for the compiler
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised by any phase of the compiler
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed term text
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A term or type constructor the compiler does not handle
    #[error("Unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// Description of the construct
        construct: String,
    },

    /// A reference with no matching declaration
    #[error("Unresolved symbol: {symbol}")]
    UnresolvedSymbol {
        /// The symbol that was looked up
        symbol: String,
    },

    /// A second declaration for the same pointer or name
    #[error("Duplicate declaration: {pointer}")]
    DuplicateSymbol {
        /// The pointer or name declared twice
        pointer: String,
    },

    /// Wrong number of arguments or an expression of the wrong shape
    #[error("Arity or shape mismatch: {message}")]
    ArityOrShape {
        /// What did not match
        message: String,
    },

    /// A descriptor or signature could not be parsed
    #[error("Malformed signature: {0}")]
    MalformedSignature(#[from] SignatureError),

    /// An emitted class failed the structural self-check
    #[error("Verification failed: {0}")]
    Verification(#[from] VerifyError),

    /// A term did not have the shape an accessor expected
    #[error("Term error: {0}")]
    Term(#[from] TermError),

    /// A JVM type was used where it does not fit
    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    /// The class file could not be assembled or written
    #[error("Class file error: {0}")]
    ClassFile(#[from] ClassFileError),

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// The configuration file is not valid TOML
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A compilation worker stopped without producing a result
    #[error("Internal compiler error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// An unsupported-construct error
    pub fn unsupported(construct: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct {
            construct: construct.into(),
        }
    }

    /// An unresolved-symbol error
    pub fn unresolved(symbol: impl Into<String>) -> Self {
        CompileError::UnresolvedSymbol {
            symbol: symbol.into(),
        }
    }

    /// An arity-or-shape error
    pub fn shape(message: impl Into<String>) -> Self {
        CompileError::ArityOrShape {
            message: message.into(),
        }
    }
}
