//! Class, method and field signatures

use crate::error::{SignatureError, TypeError};
use crate::parse::parse_method_descriptor;
use crate::ty::JvmType;
use std::fmt;

/// Writes `items` separated by `,`.
fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    if let Some((first, rest)) = items.split_first() {
        write!(f, "{}", first)?;
        for item in rest {
            write!(f, ",{}", item)?;
        }
    }
    Ok(())
}

/// A generic type parameter declaration, e.g. `T extends Number`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmTypeParam {
    /// Name of the parameter
    pub identifier: String,
    /// Class bound, if any
    pub class_bound: Option<JvmType>,
    /// Interface bounds
    pub interface_bounds: Vec<JvmType>,
}

impl JvmTypeParam {
    /// An unbounded type parameter.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            class_bound: None,
            interface_bounds: Vec::new(),
        }
    }

    /// A type parameter with the given bounds.
    pub fn bounded(
        identifier: impl Into<String>,
        class_bound: Option<JvmType>,
        interface_bounds: Vec<JvmType>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            class_bound,
            interface_bounds,
        }
    }

    /// The signature: `id:classBound(:interfaceBound)*`
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        out.push_str(&self.identifier);
        out.push(':');
        if let Some(bound) = &self.class_bound {
            bound.write_signature(out);
        }
        for bound in &self.interface_bounds {
            out.push(':');
            bound.write_signature(out);
        }
    }
}

impl fmt::Display for JvmTypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)?;
        if let Some(bound) = &self.class_bound {
            write!(f, " extends {}", bound)?;
        }
        if !self.interface_bounds.is_empty() {
            f.write_str(" implements ")?;
            write_joined(f, &self.interface_bounds)?;
        }
        Ok(())
    }
}

fn write_type_params(out: &mut String, params: &[JvmTypeParam]) {
    if !params.is_empty() {
        out.push('<');
        for param in params {
            param.write_signature(out);
        }
        out.push('>');
    }
}

/// The generic signature of a class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmClassSignature {
    /// Super class
    pub super_class: JvmType,
    /// Implemented interfaces
    pub super_interfaces: Vec<JvmType>,
    /// Declared type parameters
    pub type_parameters: Vec<JvmTypeParam>,
}

impl JvmClassSignature {
    /// Create a class signature.
    pub fn new(
        super_class: JvmType,
        super_interfaces: Vec<JvmType>,
        type_parameters: Vec<JvmTypeParam>,
    ) -> Self {
        Self {
            super_class,
            super_interfaces,
            type_parameters,
        }
    }

    /// The signature: `<params>superClass(superInterface)*`
    pub fn signature(&self) -> String {
        let mut out = String::new();
        write_type_params(&mut out, &self.type_parameters);
        self.super_class.write_signature(&mut out);
        for iface in &self.super_interfaces {
            iface.write_signature(&mut out);
        }
        out
    }
}

impl fmt::Display for JvmClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_parameters.is_empty() {
            f.write_str("<")?;
            write_joined(f, &self.type_parameters)?;
            f.write_str(">")?;
        }
        write!(f, " extends {}", self.super_class)?;
        if !self.super_interfaces.is_empty() {
            f.write_str(" implements ")?;
            write_joined(f, &self.super_interfaces)?;
        }
        Ok(())
    }
}

/// The signature of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmMethodSignature {
    /// Result type
    pub result: JvmType,
    /// Parameter types
    pub parameters: Vec<JvmType>,
    /// Method type parameters
    pub type_parameters: Vec<JvmTypeParam>,
    /// Declared thrown types
    pub throwables: Vec<JvmType>,
}

impl JvmMethodSignature {
    /// A non-generic method signature.
    pub fn new(result: JvmType, parameters: Vec<JvmType>) -> Self {
        Self {
            result,
            parameters,
            type_parameters: Vec::new(),
            throwables: Vec::new(),
        }
    }

    /// Parse an erased method descriptor.
    pub fn from_descriptor(descriptor: &str) -> Result<Self, SignatureError> {
        let (parameters, result) = parse_method_descriptor(descriptor)?;
        Ok(Self::new(result, parameters))
    }

    /// The generic signature: `<params>(parameters)result(^throwable)*`
    pub fn signature(&self) -> String {
        let mut out = String::new();
        write_type_params(&mut out, &self.type_parameters);
        out.push('(');
        for param in &self.parameters {
            param.write_signature(&mut out);
        }
        out.push(')');
        self.result.write_signature(&mut out);
        for throwable in &self.throwables {
            out.push('^');
            throwable.write_signature(&mut out);
        }
        out
    }

    /// The erased descriptor: `(parameters)result`
    ///
    /// Fails when a parameter or the result is a type argument.
    pub fn descriptor(&self) -> Result<String, TypeError> {
        let mut out = String::from("(");
        for param in &self.parameters {
            param.write_descriptor(&mut out)?;
        }
        out.push(')');
        self.result.write_descriptor(&mut out)?;
        Ok(out)
    }

    /// Whether the signature carries anything a descriptor cannot express
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
            || self.descriptor().map_or(true, |descriptor| descriptor != self.signature())
    }

    /// Number of local slots taken by the parameters
    pub fn parameter_slots(&self) -> u16 {
        self.parameters.iter().map(JvmType::slot_size).sum()
    }
}

impl fmt::Display for JvmMethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_parameters.is_empty() {
            f.write_str("<")?;
            write_joined(f, &self.type_parameters)?;
            f.write_str(">")?;
        }
        f.write_str("(")?;
        write_joined(f, &self.parameters)?;
        write!(f, ") {}", self.result)?;
        if !self.throwables.is_empty() {
            f.write_str(" throws ")?;
            write_joined(f, &self.throwables)?;
        }
        Ok(())
    }
}

/// The signature of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmFieldSignature {
    /// Field type
    pub ty: JvmType,
}

impl JvmFieldSignature {
    /// Create a field signature.
    pub fn new(ty: JvmType) -> Self {
        Self { ty }
    }

    /// The generic signature of the field type
    pub fn signature(&self) -> String {
        self.ty.signature()
    }

    /// The erased descriptor of the field type
    pub fn descriptor(&self) -> Result<String, TypeError> {
        self.ty.descriptor()
    }
}

impl fmt::Display for JvmFieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{JvmObject, JvmTypeArg};

    fn object() -> JvmType {
        JvmType::of("java.lang.Object")
    }

    #[test]
    fn test_type_param_signature() {
        let unbounded = JvmTypeParam::new("T");
        assert_eq!(unbounded.signature(), "T:");
        let bounded = JvmTypeParam::bounded(
            "T",
            Some(object()),
            vec![JvmType::of("java.lang.Comparable")],
        );
        assert_eq!(
            bounded.signature(),
            "T:Ljava/lang/Object;:Ljava/lang/Comparable;"
        );
        assert_eq!(
            bounded.to_string(),
            "T extends java.lang.Object implements java.lang.Comparable"
        );
    }

    #[test]
    fn test_class_signature() {
        let list = JvmType::Object(JvmObject::generic(
            "java/util/List",
            vec![JvmType::TypeArg(JvmTypeArg::invariant(JvmType::type_var("T")))],
        ));
        let sig = JvmClassSignature::new(
            object(),
            vec![list],
            vec![JvmTypeParam::bounded("T", Some(object()), vec![])],
        );
        assert_eq!(
            sig.signature(),
            "<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/List<TT;>;"
        );
    }

    #[test]
    fn test_method_signature_and_descriptor() {
        let mut sig = JvmMethodSignature::new(
            JvmType::type_var("R"),
            vec![JvmType::type_var("CTX"), JvmType::Int],
        );
        sig.throwables.push(JvmType::of("java.io.IOException"));
        assert_eq!(sig.signature(), "(TCTX;I)TR;^Ljava/io/IOException;");
        assert_eq!(sig.descriptor().unwrap(), "(Ljava/lang/Object;I)Ljava/lang/Object;");
        assert!(sig.is_generic());
        assert_eq!(sig.to_string(), "(CTX,int) R throws java.io.IOException");
    }

    #[test]
    fn test_method_from_descriptor() {
        let sig = JvmMethodSignature::from_descriptor("(JLjava/lang/String;)V").unwrap();
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameter_slots(), 3);
        assert_eq!(sig.descriptor().unwrap(), "(JLjava/lang/String;)V");
        assert!(!sig.is_generic());
    }

    #[test]
    fn test_field_signature() {
        let field = JvmFieldSignature::new(JvmType::array_of(JvmType::Long));
        assert_eq!(field.descriptor().unwrap(), "[J");
        assert_eq!(field.signature(), "[J");
    }

    #[test]
    fn test_type_argument_parameter_has_no_descriptor() {
        let sig = JvmMethodSignature::new(
            JvmType::Void,
            vec![JvmType::TypeArg(JvmTypeArg::wildcard())],
        );
        assert!(sig.descriptor().is_err());
        assert!(sig.is_generic());
        let field = JvmFieldSignature::new(JvmType::TypeArg(JvmTypeArg::wildcard()));
        assert!(field.descriptor().is_err());
    }
}
