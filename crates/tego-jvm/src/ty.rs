//! Core JVM type definitions

use crate::error::TypeError;
use std::fmt;

/// The sort of a JVM type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JvmTypeSort {
    /// `void`
    Void,
    /// `boolean`
    Boolean,
    /// `char`
    Char,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// Array type
    Array,
    /// Class or interface type
    Object,
    /// Type variable
    TypeVar,
    /// Type argument
    TypeArg,
}

/// Variance of a type argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// `T`
    Invariant,
    /// `? extends T`, encoded `+`
    Covariant,
    /// `? super T`, encoded `-`
    Contravariant,
    /// `?`, encoded `*`
    Wildcard,
}

/// A JVM type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JvmType {
    /// `void`
    Void,
    /// `boolean`
    Boolean,
    /// `char`
    Char,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// Array of the element type
    Array(Box<JvmType>),
    /// Class or interface type
    Object(JvmObject),
    /// Type variable, such as `E` in `List<E>`
    TypeVar(String),
    /// Type argument with variance
    TypeArg(JvmTypeArg),
}

/// A class or interface type
///
/// Nested classes form a chain through `enclosing`. A static nested class
/// is written `Outer$Inner` in both encodings; an inner (instance) class is
/// written `Outer.Inner`, which lets the signature carry the type arguments
/// of every enclosing class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmObject {
    pub(crate) name: String,
    pub(crate) type_args: Vec<JvmType>,
    pub(crate) enclosing: Option<Box<JvmObject>>,
    pub(crate) is_inner: bool,
}

/// A type argument of a generic type
///
/// The element is absent exactly when the variance is [`Variance::Wildcard`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmTypeArg {
    element: Option<Box<JvmType>>,
    variance: Variance,
}

// ===== JvmObject =====

impl JvmObject {
    /// Create a top-level class type without type arguments.
    ///
    /// The name is the full internal name, e.g. `java/lang/Object`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_args: Vec::new(),
            enclosing: None,
            is_inner: false,
        }
    }

    /// Create a top-level generic class type.
    pub fn generic(name: impl Into<String>, type_args: Vec<JvmType>) -> Self {
        Self {
            name: name.into(),
            type_args,
            enclosing: None,
            is_inner: false,
        }
    }

    /// Create a class nested in `enclosing`.
    ///
    /// `name` is the simple name of the nested class.
    pub fn nested(
        enclosing: JvmObject,
        name: impl Into<String>,
        type_args: Vec<JvmType>,
        is_inner: bool,
    ) -> Self {
        Self {
            name: name.into(),
            type_args,
            enclosing: Some(Box::new(enclosing)),
            is_inner,
        }
    }

    /// Create a class type from its parts, checking that an inner class has an enclosing class.
    pub fn from_parts(
        name: impl Into<String>,
        type_args: Vec<JvmType>,
        enclosing: Option<JvmObject>,
        is_inner: bool,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        if is_inner && enclosing.is_none() {
            return Err(TypeError::MissingEnclosing { name });
        }
        Ok(Self {
            name,
            type_args,
            enclosing: enclosing.map(Box::new),
            is_inner,
        })
    }

    /// The name of this segment (full internal name for a top-level class)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type arguments (or declared type variables) of this segment
    pub fn type_args(&self) -> &[JvmType] {
        &self.type_args
    }

    /// The enclosing class, if nested
    pub fn enclosing(&self) -> Option<&JvmObject> {
        self.enclosing.as_deref()
    }

    /// Whether this is an inner (non-static) class
    pub fn is_inner(&self) -> bool {
        self.is_inner
    }

    /// Whether this segment has type arguments
    pub fn is_generic(&self) -> bool {
        !self.type_args.is_empty()
    }

    /// The name after the last `/`
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('/') {
            Some(i) => &self.name[i + 1..],
            None => &self.name,
        }
    }

    /// The internal name, e.g. `java/util/Map$Entry`
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        self.write_internal_name(&mut out);
        out
    }

    fn write_internal_name(&self, out: &mut String) {
        if let Some(enclosing) = &self.enclosing {
            enclosing.write_internal_name(out);
            out.push(if self.is_inner { '.' } else { '$' });
        }
        out.push_str(&self.name);
    }

    /// The class path with `.` as package separator
    ///
    /// An inner class includes the type arguments of its enclosing classes.
    pub fn class_path(&self) -> String {
        let mut out = String::new();
        self.write_enclosing_path(&mut out);
        out.push_str(&self.name.replace('/', "."));
        out
    }

    fn write_enclosing_path(&self, out: &mut String) {
        if let Some(enclosing) = &self.enclosing {
            if self.is_inner {
                out.push_str(&enclosing.to_string());
                out.push('.');
            } else {
                out.push_str(&enclosing.internal_name().replace('/', "."));
                out.push('$');
            }
        }
    }

    /// The descriptor, e.g. `Ljava/util/List;`
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        out.push('L');
        self.write_internal_name(out);
        out.push(';');
    }

    /// The generic signature, e.g. `Ljava/util/List<TE;>;`
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        out.push('L');
        self.write_clean_signature(out);
        out.push(';');
    }

    fn write_clean_signature(&self, out: &mut String) {
        if let Some(enclosing) = &self.enclosing {
            if self.is_inner {
                // An inner class is enclosed in a class with type arguments
                enclosing.write_clean_signature(out);
                out.push('.');
            } else {
                // A static class is enclosed in a class without type arguments
                enclosing.write_internal_name(out);
                out.push('$');
            }
        }
        out.push_str(&self.name);
        if !self.type_args.is_empty() {
            out.push('<');
            for arg in &self.type_args {
                arg.write_signature(out);
            }
            out.push('>');
        }
    }

    /// Replace the type arguments of this segment.
    ///
    /// The number of arguments must match the number of existing type arguments.
    pub fn parameterized_by(&self, args: Vec<JvmTypeArg>) -> Result<JvmObject, TypeError> {
        if args.len() != self.type_args.len() {
            return Err(TypeError::TypeArgCount {
                expected: self.type_args.len(),
                actual: args.len(),
            });
        }
        Ok(JvmObject {
            name: self.name.clone(),
            type_args: args.into_iter().map(JvmType::TypeArg).collect(),
            enclosing: self.enclosing.clone(),
            is_inner: self.is_inner,
        })
    }

    /// Replace all type arguments of this segment by wildcards.
    pub fn as_raw_type(&self) -> JvmObject {
        let already_raw = self.type_args.iter().all(|arg| {
            matches!(arg, JvmType::TypeArg(a) if a.variance() == Variance::Wildcard)
        });
        if already_raw {
            return self.clone();
        }
        JvmObject {
            name: self.name.clone(),
            type_args: self
                .type_args
                .iter()
                .map(|_| JvmType::TypeArg(JvmTypeArg::wildcard()))
                .collect(),
            enclosing: self.enclosing.clone(),
            is_inner: self.is_inner,
        }
    }
}

impl fmt::Display for JvmObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_enclosing_path(&mut out);
        out.push_str(&self.name.replace('/', "."));
        f.write_str(&out)?;
        if let Some((first, rest)) = self.type_args.split_first() {
            write!(f, "<{}", first)?;
            for arg in rest {
                write!(f, ",{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl From<JvmObject> for JvmType {
    fn from(object: JvmObject) -> Self {
        JvmType::Object(object)
    }
}

// ===== JvmTypeArg =====

impl JvmTypeArg {
    /// `T`
    pub fn invariant(ty: JvmType) -> Self {
        Self {
            element: Some(Box::new(ty)),
            variance: Variance::Invariant,
        }
    }

    /// `? extends T`
    pub fn covariant(ty: JvmType) -> Self {
        Self {
            element: Some(Box::new(ty)),
            variance: Variance::Covariant,
        }
    }

    /// `? super T`
    pub fn contravariant(ty: JvmType) -> Self {
        Self {
            element: Some(Box::new(ty)),
            variance: Variance::Contravariant,
        }
    }

    /// `?`
    pub fn wildcard() -> Self {
        Self {
            element: None,
            variance: Variance::Wildcard,
        }
    }

    /// The argument type; `None` for a wildcard
    pub fn element(&self) -> Option<&JvmType> {
        self.element.as_deref()
    }

    /// The variance of the argument
    pub fn variance(&self) -> Variance {
        self.variance
    }

    fn write_signature(&self, out: &mut String) {
        match (self.variance, &self.element) {
            (Variance::Invariant, Some(e)) => e.write_signature(out),
            (Variance::Covariant, Some(e)) => {
                out.push('+');
                e.write_signature(out);
            }
            (Variance::Contravariant, Some(e)) => {
                out.push('-');
                e.write_signature(out);
            }
            _ => out.push('*'),
        }
    }
}

impl fmt::Display for JvmTypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.variance, &self.element) {
            (Variance::Invariant, Some(e)) => write!(f, "{}", e),
            (Variance::Covariant, Some(e)) => write!(f, "? extends {}", e),
            (Variance::Contravariant, Some(e)) => write!(f, "? super {}", e),
            _ => f.write_str("?"),
        }
    }
}

// ===== JvmType =====

impl JvmType {
    /// Look up a type by its Java name.
    ///
    /// Primitive keywords map to primitives, a `[]` suffix makes an array,
    /// and anything else becomes a top-level class with `.` replaced by `/`.
    /// Nested classes cannot be told apart from packages this way.
    pub fn of(class_name: &str) -> JvmType {
        match class_name {
            "void" => JvmType::Void,
            "boolean" => JvmType::Boolean,
            "char" => JvmType::Char,
            "byte" => JvmType::Byte,
            "short" => JvmType::Short,
            "int" => JvmType::Int,
            "long" => JvmType::Long,
            "float" => JvmType::Float,
            "double" => JvmType::Double,
            _ => match class_name.strip_suffix("[]") {
                Some(element) => JvmType::array_of(JvmType::of(element)),
                None => JvmType::Object(JvmObject::new(class_name.replace('.', "/"))),
            },
        }
    }

    /// Create an array type.
    pub fn array_of(element: JvmType) -> JvmType {
        JvmType::Array(Box::new(element))
    }

    /// Create a type variable.
    pub fn type_var(name: impl Into<String>) -> JvmType {
        JvmType::TypeVar(name.into())
    }

    /// The sort of this type
    pub fn sort(&self) -> JvmTypeSort {
        match self {
            JvmType::Void => JvmTypeSort::Void,
            JvmType::Boolean => JvmTypeSort::Boolean,
            JvmType::Char => JvmTypeSort::Char,
            JvmType::Byte => JvmTypeSort::Byte,
            JvmType::Short => JvmTypeSort::Short,
            JvmType::Int => JvmTypeSort::Int,
            JvmType::Long => JvmTypeSort::Long,
            JvmType::Float => JvmTypeSort::Float,
            JvmType::Double => JvmTypeSort::Double,
            JvmType::Array(_) => JvmTypeSort::Array,
            JvmType::Object(_) => JvmTypeSort::Object,
            JvmType::TypeVar(_) => JvmTypeSort::TypeVar,
            JvmType::TypeArg(_) => JvmTypeSort::TypeArg,
        }
    }

    /// Whether this is a primitive type (including `void`)
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            JvmType::Void
                | JvmType::Boolean
                | JvmType::Char
                | JvmType::Byte
                | JvmType::Short
                | JvmType::Int
                | JvmType::Long
                | JvmType::Float
                | JvmType::Double
        )
    }

    /// Whether values of this type are references
    pub fn is_reference(&self) -> bool {
        !self.is_primitive()
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        matches!(self, JvmType::Array(_))
    }

    /// Whether this is an object type with type arguments
    pub fn is_generic(&self) -> bool {
        matches!(self, JvmType::Object(o) if o.is_generic())
    }

    /// Whether this is a type variable or type argument
    pub fn is_type_parameter(&self) -> bool {
        matches!(self, JvmType::TypeVar(_) | JvmType::TypeArg(_))
    }

    /// Element type of an array or type argument
    pub fn element_type(&self) -> Option<&JvmType> {
        match self {
            JvmType::Array(element) => Some(element),
            JvmType::TypeArg(arg) => arg.element(),
            _ => None,
        }
    }

    /// Number of array dimensions
    pub fn dimension_count(&self) -> usize {
        match self {
            JvmType::Array(element) => 1 + element.dimension_count(),
            _ => 0,
        }
    }

    /// Number of local variable or operand stack slots a value of this type occupies
    pub fn slot_size(&self) -> u16 {
        match self {
            JvmType::Void => 0,
            JvmType::Long | JvmType::Double => 2,
            _ => 1,
        }
    }

    /// The object type, if this is one
    pub fn as_object(&self) -> Option<&JvmObject> {
        match self {
            JvmType::Object(o) => Some(o),
            _ => None,
        }
    }

    fn kind_name(&self) -> String {
        match self {
            JvmType::Array(_) => "Array type".to_string(),
            JvmType::Object(_) => "Object type".to_string(),
            JvmType::TypeVar(_) => "A type variable".to_string(),
            JvmType::TypeArg(_) => "A type argument".to_string(),
            primitive => format!("Primitive {}", primitive),
        }
    }

    /// The simple name, such as `int`, `String` or `int[]`
    pub fn simple_name(&self) -> Result<String, TypeError> {
        match self {
            JvmType::Array(element) => Ok(format!("{}[]", element.simple_name()?)),
            JvmType::Object(o) => Ok(o.simple_name().to_string()),
            JvmType::TypeVar(name) => Ok(name.clone()),
            JvmType::TypeArg(_) => Err(TypeError::NoSuchProperty {
                kind: self.kind_name(),
                property: "a simple name",
            }),
            primitive => Ok(primitive.to_string()),
        }
    }

    /// The internal name used in class constants
    ///
    /// For an array this is its descriptor, as the class file format requires.
    pub fn internal_name(&self) -> Result<String, TypeError> {
        match self {
            JvmType::Object(o) => Ok(o.internal_name()),
            JvmType::Array(_) => self.descriptor(),
            _ => Err(TypeError::NoSuchProperty {
                kind: self.kind_name(),
                property: "an internal name",
            }),
        }
    }

    /// The `.`-separated class path of an object type
    pub fn class_path(&self) -> Result<String, TypeError> {
        match self {
            JvmType::Object(o) => Ok(o.class_path()),
            _ => Err(TypeError::NoSuchProperty {
                kind: self.kind_name(),
                property: "a class path",
            }),
        }
    }

    /// The erased descriptor of this type
    ///
    /// Type variables erase to `java/lang/Object`. A type argument has no
    /// descriptor.
    pub fn descriptor(&self) -> Result<String, TypeError> {
        let mut out = String::new();
        self.write_descriptor(&mut out)?;
        Ok(out)
    }

    /// Append the descriptor of this type to `out`.
    pub fn write_descriptor(&self, out: &mut String) -> Result<(), TypeError> {
        match self {
            JvmType::Array(element) => {
                out.push('[');
                element.write_descriptor(out)?;
            }
            JvmType::Object(o) => o.write_descriptor(out),
            JvmType::TypeVar(_) => out.push_str(OBJECT_DESCRIPTOR),
            JvmType::TypeArg(_) => {
                return Err(TypeError::NoSuchProperty {
                    kind: self.kind_name(),
                    property: "a descriptor",
                })
            }
            primitive => out.push(primitive.primitive_code()),
        }
        Ok(())
    }

    /// The generic signature of this type
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    /// Append the signature of this type to `out`.
    pub fn write_signature(&self, out: &mut String) {
        match self {
            JvmType::Array(element) => {
                out.push('[');
                element.write_signature(out);
            }
            JvmType::Object(o) => o.write_signature(out),
            JvmType::TypeVar(name) => {
                out.push('T');
                out.push_str(name);
                out.push(';');
            }
            JvmType::TypeArg(arg) => arg.write_signature(out),
            primitive => out.push(primitive.primitive_code()),
        }
    }

    fn primitive_code(&self) -> char {
        match self {
            JvmType::Void => 'V',
            JvmType::Boolean => 'Z',
            JvmType::Char => 'C',
            JvmType::Byte => 'B',
            JvmType::Short => 'S',
            JvmType::Int => 'I',
            JvmType::Long => 'J',
            JvmType::Float => 'F',
            JvmType::Double => 'D',
            _ => 'L',
        }
    }

    /// Replace the type arguments of an object type.
    pub fn parameterized_by(&self, args: Vec<JvmTypeArg>) -> Result<JvmType, TypeError> {
        match self {
            JvmType::Object(o) => Ok(JvmType::Object(o.parameterized_by(args)?)),
            other => Err(TypeError::NotAnObject {
                actual: other.to_string(),
            }),
        }
    }

    /// The raw type: every type argument replaced by a wildcard.
    ///
    /// Types other than generic object types are returned unchanged.
    pub fn as_raw_type(&self) -> JvmType {
        match self {
            JvmType::Object(o) => JvmType::Object(o.as_raw_type()),
            other => other.clone(),
        }
    }
}

const OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

impl fmt::Display for JvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JvmType::Void => f.write_str("void"),
            JvmType::Boolean => f.write_str("boolean"),
            JvmType::Char => f.write_str("char"),
            JvmType::Byte => f.write_str("byte"),
            JvmType::Short => f.write_str("short"),
            JvmType::Int => f.write_str("int"),
            JvmType::Long => f.write_str("long"),
            JvmType::Float => f.write_str("float"),
            JvmType::Double => f.write_str("double"),
            JvmType::Array(element) => write!(f, "{}[]", element),
            JvmType::Object(o) => write!(f, "{}", o),
            JvmType::TypeVar(name) => f.write_str(name),
            JvmType::TypeArg(arg) => write!(f, "{}", arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of_e() -> JvmObject {
        JvmObject::generic("java/util/List", vec![JvmType::type_var("E")])
    }

    #[test]
    fn test_primitive_encodings() {
        assert_eq!(JvmType::Void.descriptor().unwrap(), "V");
        assert_eq!(JvmType::Boolean.descriptor().unwrap(), "Z");
        assert_eq!(JvmType::Char.descriptor().unwrap(), "C");
        assert_eq!(JvmType::Byte.descriptor().unwrap(), "B");
        assert_eq!(JvmType::Short.descriptor().unwrap(), "S");
        assert_eq!(JvmType::Int.signature(), "I");
        assert_eq!(JvmType::Long.signature(), "J");
        assert_eq!(JvmType::Float.signature(), "F");
        assert_eq!(JvmType::Double.signature(), "D");
    }

    #[test]
    fn test_array_encoding() {
        let ty = JvmType::array_of(JvmType::array_of(JvmType::Int));
        assert_eq!(ty.descriptor().unwrap(), "[[I");
        assert_eq!(ty.dimension_count(), 2);
        assert_eq!(ty.to_string(), "int[][]");
        assert_eq!(ty.simple_name().unwrap(), "int[][]");
    }

    #[test]
    fn test_generic_object_encoding() {
        let ty = JvmType::Object(list_of_e());
        assert_eq!(ty.descriptor().unwrap(), "Ljava/util/List;");
        assert_eq!(ty.signature(), "Ljava/util/List<TE;>;");
        assert_eq!(ty.to_string(), "java.util.List<E>");
        assert!(ty.is_generic());
    }

    #[test]
    fn test_static_nested_encoding() {
        let outer = JvmObject::new("org/example/TestClass");
        let nested = JvmObject::nested(outer, "S", vec![JvmType::type_var("X")], false);
        assert_eq!(nested.internal_name(), "org/example/TestClass$S");
        assert_eq!(nested.signature(), "Lorg/example/TestClass$S<TX;>;");
        assert_eq!(nested.to_string(), "org.example.TestClass$S<X>");
    }

    #[test]
    fn test_inner_class_encoding() {
        let outer = JvmObject::generic("org/example/TestClass", vec![JvmType::type_var("T")]);
        let inner = JvmObject::nested(outer, "N", vec![JvmType::type_var("U")], true);
        assert_eq!(inner.descriptor(), "Lorg/example/TestClass.N;");
        assert_eq!(inner.signature(), "Lorg/example/TestClass<TT;>.N<TU;>;");
        assert_eq!(inner.class_path(), "org.example.TestClass<T>.N");
    }

    #[test]
    fn test_type_arg_encoding() {
        let object = JvmType::of("java.lang.Object");
        assert_eq!(JvmTypeArg::invariant(object.clone()).to_string(), "java.lang.Object");
        assert_eq!(
            JvmType::TypeArg(JvmTypeArg::covariant(object.clone())).signature(),
            "+Ljava/lang/Object;"
        );
        assert_eq!(
            JvmType::TypeArg(JvmTypeArg::contravariant(object.clone())).signature(),
            "-Ljava/lang/Object;"
        );
        assert_eq!(JvmTypeArg::covariant(object).to_string(), "? extends java.lang.Object");
        assert_eq!(JvmType::TypeArg(JvmTypeArg::wildcard()).signature(), "*");
        assert_eq!(JvmTypeArg::wildcard().to_string(), "?");
    }

    #[test]
    fn test_type_var_erases_to_object() {
        let ty = JvmType::type_var("CTX");
        assert_eq!(ty.descriptor().unwrap(), "Ljava/lang/Object;");
        assert_eq!(ty.signature(), "TCTX;");
    }

    #[test]
    fn test_lenient_lookup() {
        assert_eq!(JvmType::of("int"), JvmType::Int);
        assert_eq!(JvmType::of("void"), JvmType::Void);
        assert_eq!(JvmType::of("int[]"), JvmType::array_of(JvmType::Int));
        assert_eq!(JvmType::of("java.lang.String").descriptor().unwrap(), "Ljava/lang/String;");
    }

    #[test]
    fn test_parameterized_by() {
        let list = JvmType::Object(list_of_e());
        let strings = list
            .parameterized_by(vec![JvmTypeArg::invariant(JvmType::of("java.lang.String"))])
            .unwrap();
        assert_eq!(strings.signature(), "Ljava/util/List<Ljava/lang/String;>;");

        let err = list.parameterized_by(vec![]).unwrap_err();
        assert_eq!(err, TypeError::TypeArgCount { expected: 1, actual: 0 });
        assert!(JvmType::Int.parameterized_by(vec![]).is_err());
    }

    #[test]
    fn test_as_raw_type() {
        let raw = JvmType::Object(list_of_e()).as_raw_type();
        assert_eq!(raw.signature(), "Ljava/util/List<*>;");
        assert_eq!(raw.as_raw_type(), raw);
        assert_eq!(JvmType::Int.as_raw_type(), JvmType::Int);
    }

    #[test]
    fn test_inner_requires_enclosing() {
        assert!(JvmObject::from_parts("N", vec![], None, true).is_err());
        assert!(JvmObject::from_parts("N", vec![], None, false).is_ok());
    }

    #[test]
    fn test_queries_without_value() {
        assert!(JvmType::Int.internal_name().is_err());
        assert!(JvmType::Int.class_path().is_err());
        assert!(JvmType::TypeArg(JvmTypeArg::wildcard()).simple_name().is_err());
        assert_eq!(
            JvmType::TypeArg(JvmTypeArg::wildcard()).descriptor().unwrap_err().to_string(),
            "A type argument does not have a descriptor"
        );
        let bounded = JvmType::TypeArg(JvmTypeArg::covariant(JvmType::of("java.lang.String")));
        assert!(matches!(bounded.descriptor(), Err(TypeError::NoSuchProperty { .. })));
        let array = JvmType::array_of(JvmType::TypeArg(JvmTypeArg::wildcard()));
        assert!(array.descriptor().is_err());
        assert!(array.internal_name().is_err());
        assert_eq!(JvmType::array_of(JvmType::Int).internal_name().unwrap(), "[I");
    }

    #[test]
    fn test_slot_size() {
        assert_eq!(JvmType::Long.slot_size(), 2);
        assert_eq!(JvmType::Double.slot_size(), 2);
        assert_eq!(JvmType::Int.slot_size(), 1);
        assert_eq!(JvmType::of("java.lang.String").slot_size(), 1);
        assert_eq!(JvmType::Void.slot_size(), 0);
    }
}
