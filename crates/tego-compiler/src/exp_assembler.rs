//! Lowering ANF expressions to bytecode
//!
//! The let spine is walked with a work list: each binding evaluates its
//! compound, stores it in a fresh local and queues the body with the
//! extended environment. The final compound leaves its value on the stack.

use crate::environment::Environment;
use crate::error::{CompileError, CompileResult};
use crate::ir::{Exp, ExpKind, QName, TermIndex, Type, TypeDecl};
use crate::type_manager::JvmTypeManager;
use std::collections::VecDeque;
use tego_bytecode::{Local, MethodBuilder};
use tego_jvm::{known, JvmType};
use tracing::{trace, warn};

/// Emits the instructions of one method body
pub struct ExpAssembler<'a> {
    types: &'a JvmTypeManager<'a>,
}

impl<'a> ExpAssembler<'a> {
    /// Create an assembler using `types` for type mapping and name lookup
    pub fn new(types: &'a JvmTypeManager<'a>) -> Self {
        Self { types }
    }

    /// Emit `exp`, leaving its value on the stack
    ///
    /// `ctx` holds the evaluation context passed to every `eval`. Returns the
    /// JVM type of the value left on the stack.
    pub fn assemble(
        &self,
        m: &mut MethodBuilder<'_>,
        exp: &Exp,
        env: Environment,
        ctx: Local,
    ) -> CompileResult<JvmType> {
        if !exp.is_anf() {
            return Err(CompileError::shape(format!(
                "body of {} is not in A-normal form",
                m.name()
            )));
        }

        let mut worklist: VecDeque<(&Exp, Environment)> = VecDeque::new();
        worklist.push_back((exp, env));
        let mut result = JvmType::Void;
        while let Some((exp, env)) = worklist.pop_front() {
            trace!(method = m.name(), kind = kind_name(&exp.kind), ty = %exp.ty, "lowering");
            match &exp.kind {
                ExpKind::Let { var, bound, body } => {
                    let ty = self.types.jvm_type(&bound.ty)?;
                    let value = self.compound(m, bound, &env, ctx)?;
                    self.coerce(m, &value, &ty)?;
                    let local = m.new_local(var, &ty)?;
                    m.store(local);
                    worklist.push_back((body, env.with(var.as_str(), local)));
                }
                _ => result = self.compound(m, exp, &env, ctx)?,
            }
        }
        Ok(result)
    }

    /// Convert the value on top of the stack from `from` to `to`
    ///
    /// Primitives are boxed into references and references unboxed into
    /// primitives. References are cast unless the erased types agree.
    pub fn coerce(&self, m: &mut MethodBuilder<'_>, from: &JvmType, to: &JvmType) -> CompileResult<()> {
        if from.descriptor()? == to.descriptor()? {
            return Ok(());
        }
        match (from.is_primitive(), to.is_primitive()) {
            (false, false) => m.checkcast(to)?,
            (true, false) => {
                m.box_value(from)?;
                m.checkcast(to)?;
            }
            (false, true) => m.unbox_value(to)?,
            (true, true) => {
                return Err(CompileError::shape(format!(
                    "cannot convert {} to {}",
                    from, to
                )))
            }
        }
        Ok(())
    }

    // ===== Compounds =====

    fn compound(
        &self,
        m: &mut MethodBuilder<'_>,
        exp: &Exp,
        env: &Environment,
        ctx: Local,
    ) -> CompileResult<JvmType> {
        match &exp.kind {
            ExpKind::Apply { function, args } => self.apply(m, exp, function, args, env),
            ExpKind::Eval { strategy, input } => self.eval(m, exp, strategy, input, env, ctx),
            ExpKind::Seq { .. } => Err(CompileError::unsupported("sequential composition (Seq)")),
            ExpKind::Let { .. } => Err(CompileError::shape("let in operand position")),
            _ => self.immediate(m, exp, env),
        }
    }

    /// `f.apply(args..)`, returning a strategy with the remaining parameters
    fn apply(
        &self,
        m: &mut MethodBuilder<'_>,
        exp: &Exp,
        function: &Exp,
        args: &[Exp],
        env: &Environment,
    ) -> CompileResult<JvmType> {
        let strategy = function.ty.expect_strategy("applied expression")?;
        let arg_types: Vec<Type> = args.iter().map(|arg| arg.ty.clone()).collect();
        let residual = strategy.apply(&arg_types)?;
        match exp.ty.as_strategy() {
            Some(annotated) if annotated.arity() != residual.arity() => warn!(
                annotated = %annotated,
                computed = %residual,
                "application typed with a different arity than its residual strategy"
            ),
            None => warn!(annotated = %exp.ty, "application not typed as a strategy"),
            _ => {}
        }

        let function_ty = self.immediate(m, function, env)?;
        if args.is_empty() {
            return Ok(function_ty);
        }
        let strategy_ty = self.types.strategy_type(strategy)?;
        self.coerce(m, &function_ty, &strategy_ty)?;
        for arg in args {
            let ty = self.immediate(m, arg, env)?;
            m.box_value(&ty)?;
        }
        let owner = self.types.strategy_interface(strategy.arity())?;
        let descriptor = self.types.apply_descriptor(args.len(), residual.arity())?;
        m.invokeinterface(&owner, "apply", &descriptor)?;
        self.types.strategy_type(&residual)
    }

    /// `s.eval(ctx, input)`, cast or unboxed to the type of `exp`
    fn eval(
        &self,
        m: &mut MethodBuilder<'_>,
        exp: &Exp,
        strategy: &Exp,
        input: &Exp,
        env: &Environment,
        ctx: Local,
    ) -> CompileResult<JvmType> {
        let strategy_ir = strategy.ty.expect_strategy("evaluated expression")?;
        if strategy_ir.arity() != 0 {
            return Err(CompileError::shape(format!(
                "expected a fully applied strategy, missing {} arguments",
                strategy_ir.arity()
            )));
        }
        let strategy_ty = self.immediate(m, strategy, env)?;
        self.coerce(m, &strategy_ty, &self.types.strategy_type(strategy_ir)?)?;
        m.load(ctx);
        let input_ty = self.immediate(m, input, env)?;
        m.box_value(&input_ty)?;

        let owner = self.types.strategy_interface(0)?;
        let descriptor = self.types.bridge_signature(0).descriptor()?;
        m.invokeinterface(&owner, "eval", &descriptor)?;
        let result = self.types.jvm_type(&exp.ty)?;
        m.unbox_value(&result)?;
        Ok(result)
    }

    // ===== Immediates =====

    fn immediate(&self, m: &mut MethodBuilder<'_>, exp: &Exp, env: &Environment) -> CompileResult<JvmType> {
        match &exp.kind {
            ExpKind::Var { name, pointer } => {
                if let Some(local) = env.get(name) {
                    m.load(local);
                    return Ok(m.local_type(local).clone());
                }
                self.global(m, name, pointer.as_ref())
            }
            ExpKind::Int(value) => self.int(m, *value, &exp.ty),
            ExpKind::Str(value) => {
                m.ldc_string(value)?;
                Ok(known::string())
            }
            ExpKind::AnyInst => {
                m.new_object("java/lang/Object")?;
                m.dup();
                m.invokespecial("java/lang/Object", "<init>", "()V")?;
                Ok(known::object())
            }
            _ => Err(CompileError::shape(format!(
                "expected a variable or constant, found {}",
                kind_name(&exp.kind)
            ))),
        }
    }

    /// Push the singleton of a global strategy
    fn global(&self, m: &mut MethodBuilder<'_>, name: &str, pointer: Option<&TermIndex>) -> CompileResult<JvmType> {
        let decl = match self.resolve(name, pointer)? {
            TypeDecl::Strategy(decl) => decl,
            TypeDecl::Class(decl) => {
                return Err(CompileError::unsupported(format!("class {} used as a value", decl.name)))
            }
        };
        let class = self.types.strategy_class(decl);
        let owner = class.internal_name()?;
        m.invokestatic(&owner, "getInstance", &format!("(){}", class.descriptor()?))?;
        Ok(class)
    }

    /// Look up a global by pointer, then in the current package, then in
    /// the default package
    fn resolve(&self, name: &str, pointer: Option<&TermIndex>) -> CompileResult<&'a TypeDecl> {
        let symbols = self.types.symbols();
        if let Some(decl) = pointer.and_then(|p| symbols.get(p)) {
            return Ok(decl);
        }
        let packages = [
            self.types.package().clone(),
            self.types.config().default_package_name()?,
        ];
        for package in packages {
            let Ok(qname) = QName::new(package, name) else {
                continue;
            };
            if let Some(decl) = symbols.get_by_name(&qname) {
                return Ok(decl);
            }
        }
        Err(CompileError::unresolved(name))
    }

    /// Push an integer literal as the JVM type of `ty`
    fn int(&self, m: &mut MethodBuilder<'_>, value: i32, ty: &Type) -> CompileResult<JvmType> {
        let target = self.types.jvm_type(ty)?;
        match target {
            JvmType::Long => m.lconst(i64::from(value))?,
            JvmType::Float => m.fconst(value as f32)?,
            JvmType::Double => m.dconst(f64::from(value))?,
            JvmType::Boolean | JvmType::Char | JvmType::Byte | JvmType::Short | JvmType::Int => m.iconst(value)?,
            _ => {
                m.iconst(value)?;
                m.box_value(&JvmType::Int)?;
                return Ok(known::as_reference(&JvmType::Int));
            }
        }
        Ok(target)
    }
}

fn kind_name(kind: &ExpKind) -> &'static str {
    match kind {
        ExpKind::Let { .. } => "let",
        ExpKind::Apply { .. } => "apply",
        ExpKind::Eval { .. } => "eval",
        ExpKind::Var { .. } => "var",
        ExpKind::Int(_) => "int",
        ExpKind::Str(_) => "string",
        ExpKind::AnyInst => "object",
        ExpKind::Seq { .. } => "seq",
    }
}
