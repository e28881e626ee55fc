//! Emitting the class of one strategy
//!
//! A strategy `name: (P1, .., Pn) I -> O` in package `pkg` becomes
//!
//! ```text
//! public final class pkg/nameStrategy<CTX> implements StrategyN<CTX, P1, .., Pn, I, O> {
//!     private static final nameStrategy instance;
//!     private nameStrategy();
//!     public static final nameStrategy getInstance();
//!     public O eval(CTX ctx, P1 p1, .., Pn pn, I input);      // the body
//!     public Object eval(Object, Object, .., Object);          // bridge
//!     public String getName();
//!     public String toString();
//!     static {};
//! }
//! ```

use crate::environment::Environment;
use crate::error::{CompileError, CompileResult};
use crate::exp_assembler::ExpAssembler;
use crate::ir::{StrategyDef, StrategyTypeDecl};
use crate::type_manager::JvmTypeManager;
use tego_bytecode::{access, ClassBuilder, JvmClass, MethodBuilder};
use tego_jvm::{known, JvmMethodSignature, JvmType};
use tracing::debug;

const INSTANCE_FIELD: &str = "instance";

/// Writes strategy classes for one package
pub struct StrategyWriter<'a> {
    types: &'a JvmTypeManager<'a>,
    assembler: ExpAssembler<'a>,
}

impl<'a> StrategyWriter<'a> {
    /// Create a writer using `types` for type mapping and name lookup
    pub fn new(types: &'a JvmTypeManager<'a>) -> Self {
        Self {
            types,
            assembler: ExpAssembler::new(types),
        }
    }

    /// Emit the class implementing `def` as declared by `decl`
    pub fn write_strategy(&self, decl: &StrategyTypeDecl, def: &StrategyDef) -> CompileResult<JvmClass> {
        if def.params.len() != decl.ty.arity() {
            return Err(CompileError::shape(format!(
                "{} declares {} parameters but its definition has {}",
                decl.name,
                decl.ty.arity(),
                def.params.len()
            )));
        }
        if !def.body.is_anf() {
            return Err(CompileError::shape(format!(
                "body of {} is not in A-normal form",
                def.name
            )));
        }

        let config = self.types.config();
        let class_ty = self.types.strategy_class(decl);
        let owner = class_ty.internal_name()?;
        let interface = self.types.strategy_interface(decl.ty.arity())?;

        let mut class = ClassBuilder::new(
            config.class_version,
            access::PUBLIC | access::FINAL | access::SUPER,
            &owner,
            "java/lang/Object",
        )?;
        class.add_interface(&interface)?;
        class.set_signature(&self.types.class_signature(decl)?.signature())?;
        class.add_field(access::PRIVATE | access::STATIC | access::FINAL, INSTANCE_FIELD, &class_ty)?;

        self.write_constructor(&mut class)?;
        self.write_get_instance(&mut class, &owner, &class_ty)?;
        let eval = self.write_eval(&mut class, decl, def, &class_ty)?;
        self.write_bridge(&mut class, decl, &owner, &eval)?;
        self.write_get_name(&mut class, &decl.name.simple_name)?;
        self.write_to_string(&mut class, &owner)?;
        self.write_static_init(&mut class, &owner, &class_ty)?;

        let jvm_class = JvmClass::from_type(&class_ty, class.build())?;
        if config.verify {
            jvm_class.check()?;
        }
        debug!(class = %owner, size = jvm_class.bytes.len(), "emitted strategy class");
        Ok(jvm_class)
    }

    /// `private <init>()`
    fn write_constructor(&self, class: &mut ClassBuilder) -> CompileResult<()> {
        let mut m = class.method(access::PRIVATE, "<init>", &JvmMethodSignature::new(JvmType::Void, vec![]), &[])?;
        m.load_this();
        m.invokespecial("java/lang/Object", "<init>", "()V")?;
        m.return_value(&JvmType::Void);
        m.finish()?;
        Ok(())
    }

    /// `public static final getInstance()` returning the singleton
    fn write_get_instance(&self, class: &mut ClassBuilder, owner: &str, class_ty: &JvmType) -> CompileResult<()> {
        let signature = JvmMethodSignature::new(class_ty.clone(), vec![]);
        let mut m = class.method(access::PUBLIC | access::STATIC | access::FINAL, "getInstance", &signature, &[])?;
        m.getstatic(owner, INSTANCE_FIELD, class_ty)?;
        m.return_value(class_ty);
        m.finish()?;
        Ok(())
    }

    /// The typed eval holding the body; returns its signature
    fn write_eval(
        &self,
        class: &mut ClassBuilder,
        decl: &StrategyTypeDecl,
        def: &StrategyDef,
        class_ty: &JvmType,
    ) -> CompileResult<JvmMethodSignature> {
        let signature = self.types.eval_signature(&decl.ty)?;
        let mut names = Vec::with_capacity(def.params.len() + 2);
        names.push("ctx");
        names.extend(def.params.iter().map(|p| p.name.as_str()));
        names.push(def.input_name.as_str());

        let mut m = class.method(access::PUBLIC, "eval", &signature, &names)?;
        let display = class_ty.to_string();
        for (i, (name, ty)) in names.iter().zip(&signature.parameters).enumerate() {
            if ty.is_reference() {
                null_check(&mut m, i, name, &display)?;
            }
        }

        let ctx = m.parameter(0).ok_or_else(|| CompileError::shape("eval without a context parameter"))?;
        let mut env = Environment::new().with("ctx", ctx);
        for (i, name) in names.iter().enumerate().skip(1) {
            let local = m
                .parameter(i)
                .ok_or_else(|| CompileError::shape(format!("eval without parameter {}", name)))?;
            env = env.with(*name, local);
        }

        let result = self.assembler.assemble(&mut m, &def.body, env, ctx)?;
        self.assembler.coerce(&mut m, &result, &signature.result)?;
        m.return_value(&signature.result);
        m.finish()?;
        Ok(signature)
    }

    /// The erased interface eval, forwarding to the typed one
    ///
    /// Not emitted when both have the same descriptor.
    fn write_bridge(
        &self,
        class: &mut ClassBuilder,
        decl: &StrategyTypeDecl,
        owner: &str,
        eval: &JvmMethodSignature,
    ) -> CompileResult<()> {
        let bridge = self.types.bridge_signature(decl.ty.arity());
        let descriptor = eval.descriptor()?;
        if bridge.descriptor()? == descriptor {
            return Ok(());
        }
        let names: Vec<String> = std::iter::once("ctx".to_string())
            .chain((1..=decl.ty.arity()).map(|i| format!("arg{}", i)))
            .chain(std::iter::once("input".to_string()))
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        let flags = access::PUBLIC | access::BRIDGE | access::SYNTHETIC;
        let mut m = class.method(flags, "eval", &bridge, &names)?;
        m.load_this();
        for (i, ty) in eval.parameters.iter().enumerate() {
            let local = m
                .parameter(i)
                .ok_or_else(|| CompileError::shape(format!("bridge without parameter {}", i)))?;
            m.load(local);
            m.unbox_value(ty)?;
        }
        m.invokevirtual(owner, "eval", &descriptor)?;
        m.box_value(&eval.result)?;
        m.return_value(&known::object());
        m.finish()?;
        Ok(())
    }

    /// `getName()` returning the simple name
    fn write_get_name(&self, class: &mut ClassBuilder, name: &str) -> CompileResult<()> {
        let mut m = class.method(access::PUBLIC, "getName", &JvmMethodSignature::new(known::string(), vec![]), &[])?;
        m.ldc_string(name)?;
        m.return_value(&known::string());
        m.finish()?;
        Ok(())
    }

    /// `toString()` returning `getName() + "(..)"`
    fn write_to_string(&self, class: &mut ClassBuilder, owner: &str) -> CompileResult<()> {
        let builder = "java/lang/StringBuilder";
        let append = "(Ljava/lang/String;)Ljava/lang/StringBuilder;";
        let mut m = class.method(access::PUBLIC, "toString", &JvmMethodSignature::new(known::string(), vec![]), &[])?;
        m.new_object(builder)?;
        m.dup();
        m.invokespecial(builder, "<init>", "()V")?;
        m.load_this();
        m.invokevirtual(owner, "getName", "()Ljava/lang/String;")?;
        m.invokevirtual(builder, "append", append)?;
        m.ldc_string("(..)")?;
        m.invokevirtual(builder, "append", append)?;
        m.invokevirtual(builder, "toString", "()Ljava/lang/String;")?;
        m.return_value(&known::string());
        m.finish()?;
        Ok(())
    }

    /// `static {}` creating the singleton
    fn write_static_init(&self, class: &mut ClassBuilder, owner: &str, class_ty: &JvmType) -> CompileResult<()> {
        let mut m = class.method(access::STATIC, "<clinit>", &JvmMethodSignature::new(JvmType::Void, vec![]), &[])?;
        m.new_object(owner)?;
        m.dup();
        m.invokespecial(owner, "<init>", "()V")?;
        m.putstatic(owner, INSTANCE_FIELD, class_ty)?;
        m.return_value(&JvmType::Void);
        m.finish()?;
        Ok(())
    }
}

/// Throw a `NullPointerException` when parameter `i` is null
fn null_check(m: &mut MethodBuilder<'_>, i: usize, name: &str, class: &str) -> CompileResult<()> {
    let npe = "java/lang/NullPointerException";
    let param = m
        .parameter(i)
        .ok_or_else(|| CompileError::shape(format!("no parameter {}", name)))?;
    let non_null = m.new_label();
    m.load(param);
    m.ifnonnull(non_null);
    m.new_object(npe)?;
    m.dup();
    m.ldc_string(&format!(
        "Non-null parameter is null: method {}.eval, parameter {}",
        class, name
    ))?;
    m.invokespecial(npe, "<init>", "(Ljava/lang/String;)V")?;
    m.athrow();
    m.bind(non_null);
    Ok(())
}
