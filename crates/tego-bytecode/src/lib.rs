//! JVM class-file backend for the Tego compiler
//!
//! This crate provides everything needed to turn emitted instructions into a
//! loadable class file: the opcode table, big-endian encoding, the constant
//! pool, class and method builders with labels, locals and stack-map frames,
//! and a structural verifier used to self-check every emitted class.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod class_file;
pub mod constant_pool;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod instruction;
pub mod jvm_class;
pub mod opcode;
pub mod verify;

pub use builder::{ClassBuilder, Label, Local, MethodBuilder};
pub use class_file::{access, ClassFile, CodeAttribute, MemberInfo};
pub use constant_pool::{Constant, ConstantPool};
pub use encoder::{ByteReader, ByteWriter, DecodeError};
pub use error::ClassFileError;
pub use frame::{Frame, VType};
pub use instruction::{decode_code, Instruction};
pub use jvm_class::JvmClass;
pub use opcode::Opcode;
pub use verify::{verify_class, verify_class_file, VerifyError};
