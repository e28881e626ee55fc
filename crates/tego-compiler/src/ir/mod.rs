//! Intermediate representation
//!
//! Typed expressions, the declarations they refer to, and the symbol table
//! that links them.

pub mod decl;
pub mod exp;
pub mod project;
pub mod symbol_table;
pub mod types;

pub use decl::{
    ClassTypeDecl, PackageName, ParamDef, QName, StrategyDef, StrategyTypeDecl, TermIndex, TypeDecl,
};
pub use exp::{Exp, ExpKind};
pub use project::{Module, Project};
pub use symbol_table::SymbolTable;
pub use types::{ClassTypeRef, StrategyType, Type};
