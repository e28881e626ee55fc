//! Modules and projects

use crate::ir::decl::{PackageName, StrategyDef, TypeDecl};

/// Everything compiled together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// The modules, in input order
    pub modules: Vec<Module>,
}

/// One module: the declarations and definitions of a package
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// The package the module's declarations live in
    pub name: PackageName,
    /// Strategy and class declarations
    pub declarations: Vec<TypeDecl>,
    /// Strategy definitions
    pub definitions: Vec<StrategyDef>,
}

impl Project {
    /// All definitions with the module they belong to
    pub fn definitions(&self) -> impl Iterator<Item = (&Module, &StrategyDef)> + '_ {
        self.modules
            .iter()
            .flat_map(|m| m.definitions.iter().map(move |d| (m, d)))
    }

    /// All declarations
    pub fn declarations(&self) -> impl Iterator<Item = &TypeDecl> + '_ {
        self.modules.iter().flat_map(|m| m.declarations.iter())
    }
}
