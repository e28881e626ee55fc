//! Tego strategy compiler
//!
//! Compiles type-checked Tego programs, given as annotated ATerms, into one
//! JVM class per strategy definition:
//!
//! ```text
//! ATerm text → Term → IR (ir_builder) → ANF (normalize) → bytecode (strategy_writer) → ClassWriter
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tego_compiler::{CompilerConfig, DirectoryClassWriter, TegoCompiler};
//!
//! let writer = DirectoryClassWriter::new("out");
//! let compiler = TegoCompiler::with_writer(CompilerConfig::default(), writer);
//! let classes = compiler.compile_file("program.aterm")?;
//! println!("{} classes", classes.len());
//! # Ok::<(), tego_compiler::CompileError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class_writer;
pub mod compiler;
pub mod config;
pub mod environment;
pub mod error;
pub mod exp_assembler;
pub mod ir;
pub mod ir_builder;
pub mod normalize;
pub mod strategy_writer;
pub mod type_manager;

pub use class_writer::{ClassWriter, DirectoryClassWriter, MemoryClassWriter, NoopClassWriter};
pub use compiler::{compile_units, TegoCompiler};
pub use config::CompilerConfig;
pub use error::{CompileError, CompileResult};
pub use ir_builder::IrBuilder;
pub use normalize::Normalizer;
pub use type_manager::JvmTypeManager;

pub use tego_bytecode::JvmClass;
