//! Declarations by pointer and by name

use crate::error::{CompileError, CompileResult};
use crate::ir::decl::{ClassTypeDecl, PackageName, QName, StrategyTypeDecl, TermIndex, TypeDecl};
use rustc_hash::FxHashMap;

/// All declarations of one compilation unit
///
/// Filled once before any definition is compiled, read-only afterwards.
#[derive(Debug, Default)]
pub struct SymbolTable {
    decls: FxHashMap<TermIndex, TypeDecl>,
    by_name: FxHashMap<QName, TermIndex>,
    /// Pointers in insertion order
    order: Vec<TermIndex>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration
    ///
    /// A second declaration with the same pointer or the same qualified name
    /// is rejected.
    pub fn insert(&mut self, decl: TypeDecl) -> CompileResult<()> {
        let pointer = decl.pointer().clone();
        if self.decls.contains_key(&pointer) {
            return Err(CompileError::DuplicateSymbol {
                pointer: pointer.to_string(),
            });
        }
        if self.by_name.contains_key(decl.name()) {
            return Err(CompileError::DuplicateSymbol {
                pointer: decl.name().to_string(),
            });
        }
        self.by_name.insert(decl.name().clone(), pointer.clone());
        self.order.push(pointer.clone());
        self.decls.insert(pointer, decl);
        Ok(())
    }

    /// Look up by pointer
    pub fn get(&self, pointer: &TermIndex) -> Option<&TypeDecl> {
        self.decls.get(pointer)
    }

    /// Look up by qualified name
    pub fn get_by_name(&self, name: &QName) -> Option<&TypeDecl> {
        self.by_name.get(name).and_then(|p| self.decls.get(p))
    }

    /// The strategy declared at `pointer`
    pub fn strategy(&self, pointer: &TermIndex) -> Option<&StrategyTypeDecl> {
        match self.get(pointer)? {
            TypeDecl::Strategy(decl) => Some(decl),
            TypeDecl::Class(_) => None,
        }
    }

    /// The class declared at `pointer`
    pub fn class(&self, pointer: &TermIndex) -> Option<&ClassTypeDecl> {
        match self.get(pointer)? {
            TypeDecl::Class(decl) => Some(decl),
            TypeDecl::Strategy(_) => None,
        }
    }

    /// Find a class by simple name, preferring the one in `package`
    ///
    /// Outside `package` the name must be unambiguous.
    pub fn class_by_simple_name(&self, package: &PackageName, name: &str) -> Option<&ClassTypeDecl> {
        let candidates: Vec<&ClassTypeDecl> = self
            .iter()
            .filter_map(|decl| match decl {
                TypeDecl::Class(c) if c.name.simple_name == name => Some(c),
                _ => None,
            })
            .collect();
        if let Some(local) = candidates.iter().copied().find(|c| c.name.package == *package) {
            return Some(local);
        }
        match candidates.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Declarations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> + '_ {
        self.order.iter().filter_map(|p| self.decls.get(p))
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{StrategyType, Type};

    fn package(name: &str) -> PackageName {
        PackageName::new(name).unwrap()
    }

    fn strategy_decl(pkg: &str, name: &str, index: u32) -> TypeDecl {
        TypeDecl::Strategy(StrategyTypeDecl {
            name: QName::new(package(pkg), name).unwrap(),
            ty: StrategyType::new(vec![], Type::Any, Type::Any),
            modifiers: vec![],
            pointer: TermIndex::new("test", index),
        })
    }

    fn class_decl(pkg: &str, name: &str, index: u32) -> TypeDecl {
        TypeDecl::Class(ClassTypeDecl {
            name: QName::new(package(pkg), name).unwrap(),
            modifiers: vec![],
            pointer: TermIndex::new("test", index),
        })
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SymbolTable::new();
        table.insert(strategy_decl("tego", "id", 1)).unwrap();
        table.insert(class_decl("tego", "State", 2)).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.strategy(&TermIndex::new("test", 1)).is_some());
        assert!(table.class(&TermIndex::new("test", 1)).is_none());
        assert!(table.class(&TermIndex::new("test", 2)).is_some());

        let name = QName::new(package("tego"), "id").unwrap();
        assert_eq!(table.get_by_name(&name).unwrap().pointer(), &TermIndex::new("test", 1));
    }

    #[test]
    fn test_duplicate_pointer_rejected() {
        let mut table = SymbolTable::new();
        table.insert(strategy_decl("tego", "id", 1)).unwrap();
        let err = table.insert(strategy_decl("tego", "other", 1)).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateSymbol { pointer } if pointer == "test#1"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table = SymbolTable::new();
        table.insert(strategy_decl("tego", "id", 1)).unwrap();
        assert!(table.insert(strategy_decl("tego", "id", 2)).is_err());
        assert!(table.insert(strategy_decl("other", "id", 3)).is_ok());
    }

    #[test]
    fn test_class_by_simple_name() {
        let mut table = SymbolTable::new();
        table.insert(class_decl("a", "State", 1)).unwrap();
        table.insert(class_decl("b", "State", 2)).unwrap();
        table.insert(class_decl("b", "Var", 3)).unwrap();

        let found = table.class_by_simple_name(&package("b"), "State").unwrap();
        assert_eq!(found.pointer, TermIndex::new("test", 2));
        assert!(table.class_by_simple_name(&package("c"), "State").is_none());
        assert!(table.class_by_simple_name(&package("a"), "Var").is_some());
        assert!(table.class_by_simple_name(&package("a"), "Missing").is_none());
    }
}
