//! Class-file construction errors

use crate::encoder::DecodeError;
use tego_jvm::{SignatureError, TypeError};
use thiserror::Error;

/// Errors raised while building, encoding or writing a class file
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// The constant pool would need more than 65535 slots
    #[error("Constant pool overflow")]
    ConstantPoolOverflow,

    /// A constant string is too long to encode
    #[error("String constant too long: {length} bytes")]
    StringTooLong {
        /// Encoded length in bytes
        length: usize,
    },

    /// A branch refers to a label that was never bound
    #[error("Label {label} was never bound in method {method}")]
    UnboundLabel {
        /// Label index
        label: usize,
        /// Method being built
        method: String,
    },

    /// A label was bound twice
    #[error("Label {label} bound twice in method {method}")]
    LabelRebound {
        /// Label index
        label: usize,
        /// Method being built
        method: String,
    },

    /// A branch target is too far away for a 16-bit offset
    #[error("Branch at {offset} to {target} is out of range")]
    BranchOutOfRange {
        /// Offset of the branch instruction
        offset: usize,
        /// Offset of the target
        target: usize,
    },

    /// The code of a method exceeds 65535 bytes
    #[error("Code of method {method} too large: {size} bytes")]
    CodeTooLarge {
        /// Method being built
        method: String,
        /// Code size in bytes
        size: usize,
    },

    /// More than 65535 local slots
    #[error("Too many local variables in method {method}")]
    LocalIndexOverflow {
        /// Method being built
        method: String,
    },

    /// An instruction popped from an empty operand stack
    #[error("Operand stack underflow at offset {offset} in method {method}")]
    StackUnderflow {
        /// Method being built
        method: String,
        /// Offset of the instruction
        offset: usize,
    },

    /// A type has no class-file representation in this position
    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    /// A descriptor could not be parsed
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Class-file bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Writing a class file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
