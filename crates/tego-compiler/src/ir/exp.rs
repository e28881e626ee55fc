//! IR expressions
//!
//! Every expression carries its resolved [`Type`]. The classification
//! methods drive the ANF normalizer and the assembler:
//!
//! - **immediate**: a variable or a constant; needs no computation
//! - **compound**: one computation step whose operands are all immediate
//! - **ANF**: a chain of lets binding compounds, ending in a compound

use crate::ir::decl::TermIndex;
use crate::ir::types::Type;
use std::fmt;

/// An expression with its type
#[derive(Debug, Clone, PartialEq)]
pub struct Exp {
    /// The expression
    pub kind: ExpKind,
    /// Its resolved type
    pub ty: Type,
}

/// The expression variants
#[derive(Debug, Clone, PartialEq)]
pub enum ExpKind {
    /// `let var = bound in body`
    Let {
        /// The bound name
        var: String,
        /// The bound expression
        bound: Box<Exp>,
        /// The body, in which `var` is visible
        body: Box<Exp>,
    },
    /// Supply arguments to a strategy's parameters
    Apply {
        /// The strategy
        function: Box<Exp>,
        /// The arguments
        args: Vec<Exp>,
    },
    /// Run a fully applied strategy on an input
    Eval {
        /// The strategy
        strategy: Box<Exp>,
        /// The input
        input: Box<Exp>,
    },
    /// A local or global name
    Var {
        /// The name
        name: String,
        /// Pointer to the referenced declaration, when annotated
        pointer: Option<TermIndex>,
    },
    /// An integer literal
    Int(i32),
    /// A string literal
    Str(String),
    /// A fresh object
    AnyInst,
    /// Evaluate `first`, then `second`
    Seq {
        /// The first expression
        first: Box<Exp>,
        /// The second expression
        second: Box<Exp>,
    },
}

impl Exp {
    /// Wrap a kind with its type
    pub fn new(kind: ExpKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    /// `let var = bound in body`, typed as the body
    pub fn let_in(var: impl Into<String>, bound: Exp, body: Exp) -> Self {
        let ty = body.ty.clone();
        Self::new(
            ExpKind::Let {
                var: var.into(),
                bound: Box::new(bound),
                body: Box::new(body),
            },
            ty,
        )
    }

    /// An application
    pub fn apply(function: Exp, args: Vec<Exp>, ty: Type) -> Self {
        Self::new(
            ExpKind::Apply {
                function: Box::new(function),
                args,
            },
            ty,
        )
    }

    /// An evaluation
    pub fn eval(strategy: Exp, input: Exp, ty: Type) -> Self {
        Self::new(
            ExpKind::Eval {
                strategy: Box::new(strategy),
                input: Box::new(input),
            },
            ty,
        )
    }

    /// A variable without a pointer
    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Self::new(
            ExpKind::Var {
                name: name.into(),
                pointer: None,
            },
            ty,
        )
    }

    /// An integer literal
    pub fn int(value: i32, ty: Type) -> Self {
        Self::new(ExpKind::Int(value), ty)
    }

    /// A string literal
    pub fn string(value: impl Into<String>, ty: Type) -> Self {
        Self::new(ExpKind::Str(value.into()), ty)
    }

    /// A sequence
    pub fn seq(first: Exp, second: Exp, ty: Type) -> Self {
        Self::new(
            ExpKind::Seq {
                first: Box::new(first),
                second: Box::new(second),
            },
            ty,
        )
    }

    /// Variables and constants
    pub fn is_imm(&self) -> bool {
        matches!(
            self.kind,
            ExpKind::Var { .. } | ExpKind::Int(_) | ExpKind::Str(_) | ExpKind::AnyInst
        )
    }

    /// One step over immediate operands
    pub fn is_comp(&self) -> bool {
        match &self.kind {
            ExpKind::Apply { function, args } => function.is_imm() && args.iter().all(Exp::is_imm),
            ExpKind::Eval { strategy, input } => strategy.is_imm() && input.is_imm(),
            ExpKind::Seq { first, second } => first.is_imm() && second.is_imm(),
            ExpKind::Let { .. } => false,
            _ => self.is_imm(),
        }
    }

    /// A let chain over compounds ending in a compound
    pub fn is_anf(&self) -> bool {
        let mut exp = self;
        while let ExpKind::Let { bound, body, .. } = &exp.kind {
            if !bound.is_comp() {
                return false;
            }
            exp = body;
        }
        exp.is_comp()
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpKind::Let { var, bound, body } => write!(f, "let {}: {} = {};\n{}", var, bound.ty, bound, body),
            ExpKind::Apply { function, args } => {
                write!(f, "{}(", function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            ExpKind::Eval { strategy, input } => write!(f, "eval({}, {})", strategy, input),
            ExpKind::Var { name, .. } => f.write_str(name),
            ExpKind::Int(value) => write!(f, "{}", value),
            ExpKind::Str(value) => write!(f, "{:?}", value),
            ExpKind::AnyInst => f.write_str("new Any"),
            ExpKind::Seq { first, second } => write!(f, "({}; {})", first, second),
        }
    }
}
