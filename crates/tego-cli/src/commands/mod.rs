//! Subcommand implementations

pub mod compile;
pub mod disasm;
pub mod parse;
pub mod signature;
