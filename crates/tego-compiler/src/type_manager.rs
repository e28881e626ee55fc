//! Mapping IR types to JVM types

use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult};
use crate::ir::{ClassTypeRef, PackageName, QName, StrategyType, StrategyTypeDecl, SymbolTable, Type};
use tego_jvm::{known, JvmClassSignature, JvmMethodSignature, JvmObject, JvmType, JvmTypeParam};

/// Name of the context type parameter of every strategy class
pub const CONTEXT_TYPE_PARAM: &str = "CTX";

/// Suffix of the generated class for a strategy
pub const STRATEGY_CLASS_SUFFIX: &str = "Strategy";

/// Internal name of `name`, with `suffix` appended to the simple name
pub fn internal_name(name: &QName, suffix: &str) -> String {
    if name.package.is_root() {
        format!("{}{}", name.simple_name, suffix)
    } else {
        format!("{}/{}{}", name.package, name.simple_name, suffix)
    }
}

/// Translates IR types within one package
pub struct JvmTypeManager<'a> {
    symbols: &'a SymbolTable,
    config: &'a CompilerConfig,
    package: &'a PackageName,
}

impl<'a> JvmTypeManager<'a> {
    /// Create a manager resolving class names relative to `package`
    pub fn new(symbols: &'a SymbolTable, config: &'a CompilerConfig, package: &'a PackageName) -> Self {
        Self {
            symbols,
            config,
            package,
        }
    }

    /// The symbol table
    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    /// The compiler configuration
    pub fn config(&self) -> &'a CompilerConfig {
        self.config
    }

    /// The package being compiled
    pub fn package(&self) -> &'a PackageName {
        self.package
    }

    /// The `CTX` type variable
    pub fn context_type(&self) -> JvmType {
        JvmType::type_var(CONTEXT_TYPE_PARAM)
    }

    /// The JVM type of a value of type `ty`
    pub fn jvm_type(&self, ty: &Type) -> CompileResult<JvmType> {
        let jvm = match ty {
            Type::Bool => JvmType::Boolean,
            Type::Char => JvmType::Char,
            Type::Byte | Type::UByte => JvmType::Byte,
            Type::Short | Type::UShort => JvmType::Short,
            Type::Int | Type::UInt => JvmType::Int,
            Type::Long | Type::ULong => JvmType::Long,
            Type::Float => JvmType::Float,
            Type::Double => JvmType::Double,
            Type::Any | Type::Nothing => known::object(),
            Type::Unit => known::void_object(),
            Type::String => known::string(),
            Type::Strategy(strategy) => self.strategy_type(strategy)?,
            Type::List(element) => {
                JvmType::Object(JvmObject::generic("java/util/List", vec![self.type_argument(element)?]))
            }
            Type::ClassRef(class) => self.class_type(class)?,
            Type::Tuple(_) => return Err(CompileError::unsupported(format!("tuple type {}", ty))),
            Type::Error => return Err(CompileError::unsupported("the error type")),
        };
        Ok(jvm)
    }

    /// The JVM type of `ty` in a type-argument position; primitives are boxed
    pub fn type_argument(&self, ty: &Type) -> CompileResult<JvmType> {
        Ok(known::as_reference(&self.jvm_type(ty)?))
    }

    /// Internal name of the runtime interface for strategies of `arity`
    pub fn strategy_interface(&self, arity: usize) -> CompileResult<String> {
        self.config.strategy_interface(arity)
    }

    /// `StrategyN<CTX, params.., input, output>`
    pub fn strategy_type(&self, strategy: &StrategyType) -> CompileResult<JvmType> {
        let mut args = Vec::with_capacity(strategy.arity() + 3);
        args.push(self.context_type());
        for param in &strategy.params {
            args.push(self.type_argument(param)?);
        }
        args.push(self.type_argument(&strategy.input)?);
        args.push(self.type_argument(&strategy.output)?);
        let interface = self.strategy_interface(strategy.arity())?;
        Ok(JvmType::Object(JvmObject::generic(interface, args)))
    }

    fn class_type(&self, class: &ClassTypeRef) -> CompileResult<JvmType> {
        let decl = match &class.pointer {
            Some(pointer) => self.symbols.class(pointer),
            None => self.symbols.class_by_simple_name(self.package, &class.name),
        }
        .ok_or_else(|| CompileError::unresolved(format!("class {}", class.name)))?;
        Ok(JvmType::Object(JvmObject::new(internal_name(&decl.name, ""))))
    }

    // ===== Strategy Classes =====

    /// The class generated for `decl`: `pkg/NameStrategy`
    pub fn strategy_class(&self, decl: &StrategyTypeDecl) -> JvmType {
        JvmType::Object(JvmObject::new(internal_name(&decl.name, STRATEGY_CLASS_SUFFIX)))
    }

    /// `<CTX:Object> extends Object implements StrategyN<CTX, ..>`
    pub fn class_signature(&self, decl: &StrategyTypeDecl) -> CompileResult<JvmClassSignature> {
        Ok(JvmClassSignature::new(
            known::object(),
            vec![self.strategy_type(&decl.ty)?],
            vec![JvmTypeParam::bounded(CONTEXT_TYPE_PARAM, Some(known::object()), vec![])],
        ))
    }

    /// The typed eval: `(CTX, params.., input) -> output`
    pub fn eval_signature(&self, strategy: &StrategyType) -> CompileResult<JvmMethodSignature> {
        let mut params = Vec::with_capacity(strategy.arity() + 2);
        params.push(self.context_type());
        for param in &strategy.params {
            params.push(self.jvm_type(param)?);
        }
        params.push(self.jvm_type(&strategy.input)?);
        Ok(JvmMethodSignature::new(self.jvm_type(&strategy.output)?, params))
    }

    /// The erased eval of the runtime interface for `arity`
    pub fn bridge_signature(&self, arity: usize) -> JvmMethodSignature {
        JvmMethodSignature::new(known::object(), vec![known::object(); arity + 2])
    }

    /// Descriptor of `apply` supplying `supplied` arguments and returning a
    /// strategy with `residual` parameters left
    pub fn apply_descriptor(&self, supplied: usize, residual: usize) -> CompileResult<String> {
        let result = JvmType::Object(JvmObject::new(self.strategy_interface(residual)?));
        Ok(JvmMethodSignature::new(result, vec![known::object(); supplied]).descriptor()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ClassTypeDecl, TermIndex, TypeDecl};

    fn fixture() -> (SymbolTable, CompilerConfig, PackageName) {
        let package = PackageName::new("org/example").unwrap();
        let mut symbols = SymbolTable::new();
        symbols
            .insert(TypeDecl::Class(ClassTypeDecl {
                name: QName::new(package.clone(), "State").unwrap(),
                modifiers: vec![],
                pointer: TermIndex::new("t", 1),
            }))
            .unwrap();
        (symbols, CompilerConfig::default(), package)
    }

    fn state() -> Type {
        Type::ClassRef(ClassTypeRef {
            name: "State".to_string(),
            pointer: None,
        })
    }

    #[test]
    fn test_primitive_mapping() {
        let (symbols, config, package) = fixture();
        let types = JvmTypeManager::new(&symbols, &config, &package);
        let descriptor = |ty: Type| types.jvm_type(&ty).unwrap().descriptor().unwrap();
        assert_eq!(descriptor(Type::Bool), "Z");
        assert_eq!(descriptor(Type::UByte), "B");
        assert_eq!(descriptor(Type::UInt), "I");
        assert_eq!(descriptor(Type::ULong), "J");
        assert_eq!(descriptor(Type::Double), "D");
        assert_eq!(descriptor(Type::Nothing), "Ljava/lang/Object;");
        assert_eq!(descriptor(Type::Unit), "Ljava/lang/Void;");
        assert_eq!(descriptor(state()), "Lorg/example/State;");
    }

    #[test]
    fn test_type_arguments_are_boxed() {
        let (symbols, config, package) = fixture();
        let types = JvmTypeManager::new(&symbols, &config, &package);
        let list = types.jvm_type(&Type::List(Box::new(Type::Int))).unwrap();
        assert_eq!(list.signature(), "Ljava/util/List<Ljava/lang/Integer;>;");
    }

    #[test]
    fn test_strategy_type() {
        let (symbols, config, package) = fixture();
        let types = JvmTypeManager::new(&symbols, &config, &package);
        let strategy = StrategyType::new(vec![Type::Int], state(), Type::String);
        let jvm = types.strategy_type(&strategy).unwrap();
        assert_eq!(jvm.descriptor().unwrap(), "Lcom/virtlink/tego/strategies/Strategy1;");
        assert_eq!(
            jvm.signature(),
            "Lcom/virtlink/tego/strategies/Strategy1<TCTX;Ljava/lang/Integer;Lorg/example/State;Ljava/lang/String;>;"
        );

        let eval = types.eval_signature(&strategy).unwrap();
        assert_eq!(eval.descriptor().unwrap(), "(Ljava/lang/Object;ILorg/example/State;)Ljava/lang/String;");
        assert_eq!(
            types.bridge_signature(1).descriptor().unwrap(),
            "(Ljava/lang/Object;Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;"
        );
        assert_eq!(
            types.apply_descriptor(1, 0).unwrap(),
            "(Ljava/lang/Object;)Lcom/virtlink/tego/strategies/Strategy;"
        );
    }

    #[test]
    fn test_unsupported_types() {
        let (symbols, config, package) = fixture();
        let types = JvmTypeManager::new(&symbols, &config, &package);
        assert!(matches!(
            types.jvm_type(&Type::Tuple(vec![Type::Int])),
            Err(CompileError::UnsupportedConstruct { .. })
        ));
        assert!(types.jvm_type(&Type::Error).is_err());
        let missing = Type::ClassRef(ClassTypeRef {
            name: "Missing".to_string(),
            pointer: None,
        });
        assert!(matches!(types.jvm_type(&missing), Err(CompileError::UnresolvedSymbol { .. })));
    }

    #[test]
    fn test_strategy_class_names() {
        let (symbols, config, package) = fixture();
        let types = JvmTypeManager::new(&symbols, &config, &package);
        let decl = StrategyTypeDecl {
            name: QName::new(package.clone(), "twice").unwrap(),
            ty: StrategyType::new(vec![], state(), state()),
            modifiers: vec![],
            pointer: TermIndex::new("t", 2),
        };
        assert_eq!(types.strategy_class(&decl).internal_name().unwrap(), "org/example/twiceStrategy");
        assert_eq!(
            types.class_signature(&decl).unwrap().signature(),
            "<CTX:Ljava/lang/Object;>Ljava/lang/Object;Lcom/virtlink/tego/strategies/Strategy<TCTX;Lorg/example/State;Lorg/example/State;>;"
        );
    }
}
