//! Names, pointers and declarations

use crate::error::{CompileError, CompileResult};
use crate::ir::exp::Exp;
use crate::ir::types::{StrategyType, Type};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static SIMPLE_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]*$"));

static PACKAGE_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-z_$][a-z0-9_$]*(/[a-z_$][a-z0-9_$]*)*$"));

fn matches(pattern: &Lazy<Result<Regex, regex::Error>>, text: &str) -> bool {
    match Lazy::force(pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// Stable pointer to the term a declaration came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermIndex {
    /// The resource the term was read from
    pub resource: String,
    /// Index of the term within the resource
    pub index: u32,
}

impl TermIndex {
    /// Create a pointer
    pub fn new(resource: impl Into<String>, index: u32) -> Self {
        Self {
            resource: resource.into(),
            index,
        }
    }
}

impl fmt::Display for TermIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.resource, self.index)
    }
}

/// A package in internal form, `org/example`; empty for the default package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackageName(String);

impl PackageName {
    /// Validate and wrap a package name
    pub fn new(name: impl Into<String>) -> CompileResult<Self> {
        let name = name.into();
        if !name.is_empty() && !matches(&PACKAGE_NAME, &name) {
            return Err(CompileError::unsupported(format!("illegal package name `{}`", name)));
        }
        Ok(Self(name))
    }

    /// The default package
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The name as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the default package
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A package-qualified name, `pkg/sub::Name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// The package
    pub package: PackageName,
    /// The unqualified name
    pub simple_name: String,
}

impl QName {
    /// Validate and build a qualified name
    pub fn new(package: PackageName, simple_name: impl Into<String>) -> CompileResult<Self> {
        let simple_name = simple_name.into();
        if !Self::is_simple_name(&simple_name) {
            return Err(CompileError::unsupported(format!("illegal simple name `{}`", simple_name)));
        }
        Ok(Self {
            package,
            simple_name,
        })
    }

    /// Whether `name` may be used as a simple name
    pub fn is_simple_name(name: &str) -> bool {
        matches(&SIMPLE_NAME, name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.package, self.simple_name)
    }
}

/// Declaration of a named strategy and its type
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTypeDecl {
    /// Qualified name
    pub name: QName,
    /// The declared type
    pub ty: StrategyType,
    /// Modifiers as written
    pub modifiers: Vec<String>,
    /// Where the declaration came from
    pub pointer: TermIndex,
}

/// Declaration of a class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTypeDecl {
    /// Qualified name
    pub name: QName,
    /// Modifiers as written
    pub modifiers: Vec<String>,
    /// Where the declaration came from
    pub pointer: TermIndex,
}

/// A declaration registered in the symbol table
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl {
    /// A strategy
    Strategy(StrategyTypeDecl),
    /// A class
    Class(ClassTypeDecl),
}

impl TypeDecl {
    /// Qualified name of the declaration
    pub fn name(&self) -> &QName {
        match self {
            TypeDecl::Strategy(d) => &d.name,
            TypeDecl::Class(d) => &d.name,
        }
    }

    /// Pointer of the declaration
    pub fn pointer(&self) -> &TermIndex {
        match self {
            TypeDecl::Strategy(d) => &d.pointer,
            TypeDecl::Class(d) => &d.pointer,
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Strategy(d) => write!(f, "{}: {}", d.name, d.ty),
            TypeDecl::Class(d) => write!(f, "class {}", d.name),
        }
    }
}

/// A parameter of a strategy definition
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,
    /// Type, when written in the definition
    pub ty: Option<Type>,
}

/// The body of a declared strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyDef {
    /// Qualified name
    pub name: QName,
    /// Parameters, not counting the input
    pub params: Vec<ParamDef>,
    /// Name of the input variable
    pub input_name: String,
    /// The body, in ANF once built
    pub body: Exp,
    /// Pointer of the declaration this defines, when annotated
    pub pointer: Option<TermIndex>,
}

impl StrategyDef {
    /// Names of the parameters
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}
