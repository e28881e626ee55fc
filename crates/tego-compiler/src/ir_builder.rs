//! Building the IR from annotated terms
//!
//! The input is a type-checked program in ATerm form. Every expression and
//! declaration carries an `OfType(T)` annotation with its resolved type;
//! declaration sites carry `OfDecl(ref)` and use sites may carry `OfRef(ref)`,
//! where `ref` is annotated with `TermIndex("resource", index)`.

use crate::error::{CompileError, CompileResult};
use crate::ir::{
    ClassTypeDecl, ClassTypeRef, Exp, ExpKind, Module, PackageName, ParamDef, Project, QName,
    StrategyDef, StrategyType, StrategyTypeDecl, TermIndex, Type, TypeDecl,
};
use crate::normalize::Normalizer;
use tego_aterm::{Term, TermKind};
use tracing::debug;

/// Turns terms into IR declarations, definitions and expressions
#[derive(Debug, Default)]
pub struct IrBuilder {
    normalizer: Normalizer,
}

impl IrBuilder {
    /// Create a builder with a fresh normalizer
    pub fn new() -> Self {
        Self::default()
    }

    /// The normalizer applied to definition bodies
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    // ===== Programs and Modules =====

    /// `Program([Module, ..])` or a single `Module(..)`
    pub fn to_project(&mut self, term: &Term) -> CompileResult<Project> {
        let modules = match term.as_appl()? {
            ("Program", [modules]) => modules
                .as_list()?
                .iter()
                .map(|module| self.to_module(module))
                .collect::<CompileResult<Vec<_>>>()?,
            ("Module", [_, _]) => vec![self.to_module(term)?],
            _ => return Err(CompileError::unsupported(format!("program {}", describe(term)))),
        };
        Ok(Project { modules })
    }

    /// `Module("pkg/name", [items])`
    pub fn to_module(&mut self, term: &Term) -> CompileResult<Module> {
        let (name, items) = match term.as_appl()? {
            ("Module", [name, items]) => (name, items),
            _ => return Err(CompileError::unsupported(format!("module {}", describe(term)))),
        };
        let package = PackageName::new(name.as_str()?)?;

        let mut declarations = Vec::new();
        let mut definitions = Vec::new();
        for item in items.as_list()? {
            match item.constructor()? {
                "StrategyDecl" => declarations.push(TypeDecl::Strategy(self.to_strategy_decl(item, &package)?)),
                "ClassDecl" => declarations.push(TypeDecl::Class(self.to_class_decl(item, &package)?)),
                "StrategyDef" | "StrategyDefWInput" => definitions.push(self.to_strategy_def(item, &package)?),
                _ => return Err(CompileError::unsupported(format!("module item {}", describe(item)))),
            }
        }

        debug!(
            module = %package,
            declarations = declarations.len(),
            definitions = definitions.len(),
            "module built"
        );
        Ok(Module {
            name: package,
            declarations,
            definitions,
        })
    }

    // ===== Declarations =====

    /// `StrategyDecl(modifiers, "name", ..){OfType(STRATEGY(..)), OfDecl(..)}`
    pub fn to_strategy_decl(&self, term: &Term, package: &PackageName) -> CompileResult<StrategyTypeDecl> {
        let args = appl_args(term, "StrategyDecl", 2)?;
        let ty = match self.type_of(term)? {
            Type::Strategy(ty) => ty,
            other => {
                return Err(CompileError::shape(format!(
                    "strategy declaration typed as {}",
                    other
                )))
            }
        };
        Ok(StrategyTypeDecl {
            name: QName::new(package.clone(), args[1].as_str()?)?,
            ty,
            modifiers: modifiers(&args[0])?,
            pointer: required_pointer(term, "OfDecl")?,
        })
    }

    /// `ClassDecl(modifiers, "Name"){OfDecl(..)}`
    pub fn to_class_decl(&self, term: &Term, package: &PackageName) -> CompileResult<ClassTypeDecl> {
        let args = appl_args(term, "ClassDecl", 2)?;
        Ok(ClassTypeDecl {
            name: QName::new(package.clone(), args[1].as_str()?)?,
            modifiers: modifiers(&args[0])?,
            pointer: required_pointer(term, "OfDecl")?,
        })
    }

    /// `StrategyDef("name", [params], "input", body){OfRef(..)}`
    ///
    /// The body is normalized to ANF.
    pub fn to_strategy_def(&mut self, term: &Term, package: &PackageName) -> CompileResult<StrategyDef> {
        let (_, args) = term.as_appl()?;
        let [name, params, input, body] = args else {
            return Err(CompileError::unsupported(format!("strategy definition {}", describe(term))));
        };
        let params = params
            .as_list()?
            .iter()
            .map(|param| self.to_param(param))
            .collect::<CompileResult<Vec<_>>>()?;
        let body = self.to_exp(body)?;
        let body = self.normalizer.normalize(body)?;
        Ok(StrategyDef {
            name: QName::new(package.clone(), name.as_str()?)?,
            params,
            input_name: input.as_str()?.to_string(),
            body,
            pointer: pointer_of(term, "OfRef")?,
        })
    }

    fn to_param(&self, term: &Term) -> CompileResult<ParamDef> {
        match term.as_appl()? {
            ("ParamDef" | "ParamDefNoType", [name]) => Ok(ParamDef {
                name: name.as_str()?.to_string(),
                ty: None,
            }),
            ("ParamDef", [name, ty]) => Ok(ParamDef {
                name: name.as_str()?.to_string(),
                ty: Some(self.to_type(ty)?),
            }),
            _ => Err(CompileError::unsupported(format!("parameter {}", describe(term)))),
        }
    }

    // ===== Expressions =====

    /// Build an expression
    ///
    /// A chain of `Let`s is walked iteratively.
    pub fn to_exp(&self, term: &Term) -> CompileResult<Exp> {
        let mut spine = Vec::new();
        let mut current = term;
        while let ("Let", [var, bound, body]) = current.as_appl()? {
            spine.push((var.as_str()?.to_string(), self.to_exp(bound)?, self.type_of(current)?));
            current = body;
        }
        let mut exp = self.to_non_let(current)?;
        for (var, bound, ty) in spine.into_iter().rev() {
            let kind = ExpKind::Let {
                var,
                bound: Box::new(bound),
                body: Box::new(exp),
            };
            exp = Exp::new(kind, ty);
        }
        Ok(exp)
    }

    fn to_non_let(&self, term: &Term) -> CompileResult<Exp> {
        let ty = self.type_of(term)?;
        let kind = match term.as_appl()? {
            ("Apply", [function, args]) => ExpKind::Apply {
                function: Box::new(self.to_exp(function)?),
                args: args
                    .as_list()?
                    .iter()
                    .map(|arg| self.to_exp(arg))
                    .collect::<CompileResult<Vec<_>>>()?,
            },
            ("Eval", [strategy, input]) => ExpKind::Eval {
                strategy: Box::new(self.to_exp(strategy)?),
                input: Box::new(self.to_exp(input)?),
            },
            ("Var", [name]) => ExpKind::Var {
                name: name.as_str()?.to_string(),
                pointer: pointer_of(term, "OfRef")?,
            },
            ("Int", [value]) => ExpKind::Int(int_literal(value)?),
            ("String", [value]) => ExpKind::Str(value.as_str()?.to_string()),
            ("Object" | "AnyInst", []) => ExpKind::AnyInst,
            ("Seq", [first, second]) => ExpKind::Seq {
                first: Box::new(self.to_exp(first)?),
                second: Box::new(self.to_exp(second)?),
            },
            _ => return Err(CompileError::unsupported(format!("expression {}", describe(term)))),
        };
        Ok(Exp::new(kind, ty))
    }

    // ===== Types =====

    /// The type in the `OfType` annotation of `term`
    pub fn type_of(&self, term: &Term) -> CompileResult<Type> {
        let annotation = term.annotation("OfType", Some(1)).ok_or_else(|| {
            CompileError::unsupported(format!("{} without an OfType annotation", describe(term)))
        })?;
        self.to_type(annotation.get(0)?)
    }

    /// Build a type from a type term
    pub fn to_type(&self, term: &Term) -> CompileResult<Type> {
        let (constructor, args) = term.as_appl()?;
        if args.is_empty() {
            if let Some(ty) = primitive_type(constructor) {
                return Ok(ty);
            }
        }
        match (constructor, args) {
            ("STRATEGY", [params, input, output]) => {
                let params = params
                    .as_list()?
                    .iter()
                    .map(|param| self.to_type(param))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Type::Strategy(StrategyType::new(
                    params,
                    self.to_type(input)?,
                    self.to_type(output)?,
                )))
            }
            ("CLASS", [name]) => Ok(Type::ClassRef(ClassTypeRef {
                name: name.as_str()?.to_string(),
                pointer: pointer_of(term, "OfRef")?,
            })),
            ("LIST", [element]) => Ok(Type::List(Box::new(self.to_type(element)?))),
            ("TUPLE", [components]) => Ok(Type::Tuple(
                components
                    .as_list()?
                    .iter()
                    .map(|component| self.to_type(component))
                    .collect::<CompileResult<Vec<_>>>()?,
            )),
            _ => Err(CompileError::unsupported(format!("type {}", describe(term)))),
        }
    }
}

fn primitive_type(constructor: &str) -> Option<Type> {
    let ty = match constructor {
        "BOOL" => Type::Bool,
        "CHAR" => Type::Char,
        "BYTE" => Type::Byte,
        "SHORT" => Type::Short,
        "INT" => Type::Int,
        "LONG" => Type::Long,
        "UBYTE" => Type::UByte,
        "USHORT" => Type::UShort,
        "UINT" => Type::UInt,
        "ULONG" => Type::ULong,
        "FLOAT" => Type::Float,
        "DOUBLE" => Type::Double,
        "ANY" => Type::Any,
        "NOTHING" => Type::Nothing,
        "UNIT" => Type::Unit,
        "STRING" => Type::String,
        _ => return None,
    };
    Some(ty)
}

// ===== Term Helpers =====

/// Constructor and arity for error messages
fn describe(term: &Term) -> String {
    match term.kind() {
        TermKind::Appl { constructor, args } => format!("{}/{}", constructor, args.len()),
        _ => term.kind_name().to_string(),
    }
}

/// Arguments of an application of `constructor` with at least `min_arity` arguments
fn appl_args<'t>(term: &'t Term, constructor: &str, min_arity: usize) -> CompileResult<&'t [Term]> {
    match term.as_appl()? {
        (c, args) if c == constructor && args.len() >= min_arity => Ok(args),
        _ => Err(CompileError::unsupported(format!(
            "{} where {} was expected",
            describe(term),
            constructor
        ))),
    }
}

/// Modifier names from a list of constructors or strings
fn modifiers(term: &Term) -> CompileResult<Vec<String>> {
    term.as_list()?
        .iter()
        .map(|m| match m.kind() {
            TermKind::Appl { constructor, .. } => Ok(constructor.clone()),
            TermKind::Str(name) => Ok(name.clone()),
            _ => Err(CompileError::unsupported(format!("modifier {}", describe(m)))),
        })
        .collect()
}

/// `Int("42")` or `Int(42)`; the value must fit in 32 bits
fn int_literal(term: &Term) -> CompileResult<i32> {
    let value = match term.kind() {
        TermKind::Int(value) => *value,
        TermKind::Str(text) => text
            .parse::<i64>()
            .map_err(|_| CompileError::unsupported(format!("integer literal `{}`", text)))?,
        _ => return Err(CompileError::unsupported(format!("integer literal {}", describe(term)))),
    };
    i32::try_from(value)
        .map_err(|_| CompileError::unsupported(format!("integer literal {} outside 32 bits", value)))
}

/// The pointer in the `annotation` (`OfDecl` or `OfRef`) of `term`, if any
fn pointer_of(term: &Term, annotation: &str) -> CompileResult<Option<TermIndex>> {
    let Some(reference) = term.annotation(annotation, Some(1)) else {
        return Ok(None);
    };
    let reference = reference.get(0)?;
    let index = if reference.is_appl("TermIndex", 2) {
        reference
    } else {
        reference.annotation("TermIndex", Some(2)).ok_or_else(|| {
            CompileError::unsupported(format!("{} reference without a TermIndex", annotation))
        })?
    };
    let resource = index.get(0)?.as_str()?;
    let position = index.get(1)?.as_int()?;
    let position = u32::try_from(position)
        .map_err(|_| CompileError::unsupported(format!("term index {}", position)))?;
    Ok(Some(TermIndex::new(resource, position)))
}

fn required_pointer(term: &Term, annotation: &str) -> CompileResult<TermIndex> {
    pointer_of(term, annotation)?.ok_or_else(|| {
        CompileError::unsupported(format!("{} without an {} annotation", describe(term), annotation))
    })
}
