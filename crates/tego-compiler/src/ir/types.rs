//! IR types

use crate::error::{CompileError, CompileResult};
use crate::ir::decl::TermIndex;
use std::fmt;

/// The type of an IR expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// `Bool`
    Bool,
    /// `Char`
    Char,
    /// `Byte`
    Byte,
    /// `Short`
    Short,
    /// `Int`
    Int,
    /// `Long`
    Long,
    /// `UByte`
    UByte,
    /// `UShort`
    UShort,
    /// `UInt`
    UInt,
    /// `ULong`
    ULong,
    /// `Float`
    Float,
    /// `Double`
    Double,
    /// The top type
    Any,
    /// The bottom type
    Nothing,
    /// `Unit`
    Unit,
    /// `String`
    String,
    /// A strategy
    Strategy(StrategyType),
    /// A tuple
    Tuple(Vec<Type>),
    /// A list
    List(Box<Type>),
    /// A reference to a declared class
    ClassRef(ClassTypeRef),
    /// A type that failed to resolve upstream
    Error,
}

/// A strategy type: `(params) input -> output`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrategyType {
    /// Types of the extra parameters
    pub params: Vec<Type>,
    /// Input type
    pub input: Box<Type>,
    /// Output type
    pub output: Box<Type>,
}

/// A reference to a class declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeRef {
    /// Simple name of the class
    pub name: String,
    /// Pointer to the declaration, when known
    pub pointer: Option<TermIndex>,
}

impl StrategyType {
    /// Create a strategy type
    pub fn new(params: Vec<Type>, input: Type, output: Type) -> Self {
        Self {
            params,
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Number of extra parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The strategy left after supplying the first `args.len()` parameters
    pub fn apply(&self, args: &[Type]) -> CompileResult<StrategyType> {
        if args.len() > self.params.len() {
            return Err(CompileError::shape(format!(
                "cannot apply {} arguments to strategy {} of arity {}",
                args.len(),
                self,
                self.arity()
            )));
        }
        Ok(StrategyType {
            params: self.params[args.len()..].to_vec(),
            input: self.input.clone(),
            output: self.output.clone(),
        })
    }
}

impl Type {
    /// The strategy type, if this is one
    pub fn as_strategy(&self) -> Option<&StrategyType> {
        match self {
            Type::Strategy(s) => Some(s),
            _ => None,
        }
    }

    /// The strategy type, or a shape error naming `what`
    pub fn expect_strategy(&self, what: &str) -> CompileResult<&StrategyType> {
        self.as_strategy()
            .ok_or_else(|| CompileError::shape(format!("{} must be a strategy, got {}", what, self)))
    }

    /// Arity of a strategy type; zero for anything else
    pub fn arity(&self) -> usize {
        self.as_strategy().map_or(0, StrategyType::arity)
    }
}

impl From<StrategyType> for Type {
    fn from(ty: StrategyType) -> Self {
        Type::Strategy(ty)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.params.is_empty() {
            f.write_str("(")?;
            write_list(f, &self.params)?;
            f.write_str(") ")?;
        }
        write!(f, "{} -> {}", self.input, self.output)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Bool => "Bool",
            Type::Char => "Char",
            Type::Byte => "Byte",
            Type::Short => "Short",
            Type::Int => "Int",
            Type::Long => "Long",
            Type::UByte => "UByte",
            Type::UShort => "UShort",
            Type::UInt => "UInt",
            Type::ULong => "ULong",
            Type::Float => "Float",
            Type::Double => "Double",
            Type::Any => "Any",
            Type::Nothing => "Nothing",
            Type::Unit => "Unit",
            Type::String => "String",
            Type::Error => "<error>",
            Type::Strategy(s) => return write!(f, "{}", s),
            Type::Tuple(components) => {
                f.write_str("(")?;
                write_list(f, components)?;
                return f.write_str(")");
            }
            Type::List(element) => return write!(f, "List<{}>", element),
            Type::ClassRef(class) => return f.write_str(&class.name),
        };
        f.write_str(name)
    }
}
