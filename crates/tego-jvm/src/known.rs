//! Well-known JDK types

use crate::ty::{JvmObject, JvmType};

/// `java.lang.Object`
pub fn object() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/Object"))
}

/// `java.lang.String`
pub fn string() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/String"))
}

/// `java.lang.Class<T>`
pub fn class() -> JvmType {
    JvmType::Object(JvmObject::generic("java/lang/Class", vec![JvmType::type_var("T")]))
}

/// `java.lang.StringBuilder`
pub fn string_builder() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/StringBuilder"))
}

/// `java.lang.Void`
pub fn void_object() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/Void"))
}

/// `java.lang.NullPointerException`
pub fn null_pointer_exception() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/NullPointerException"))
}

/// `java.lang.AssertionError`
pub fn assertion_error() -> JvmType {
    JvmType::Object(JvmObject::new("java/lang/AssertionError"))
}

/// `java.util.List<E>`
pub fn list() -> JvmType {
    JvmType::Object(JvmObject::generic("java/util/List", vec![JvmType::type_var("E")]))
}

/// The wrapper class of a primitive, e.g. `java/lang/Integer` for `int`.
///
/// Returns `None` for `void` and for reference types.
pub fn boxed(ty: &JvmType) -> Option<JvmType> {
    let name = match ty {
        JvmType::Boolean => "java/lang/Boolean",
        JvmType::Char => "java/lang/Character",
        JvmType::Byte => "java/lang/Byte",
        JvmType::Short => "java/lang/Short",
        JvmType::Int => "java/lang/Integer",
        JvmType::Long => "java/lang/Long",
        JvmType::Float => "java/lang/Float",
        JvmType::Double => "java/lang/Double",
        _ => return None,
    };
    Some(JvmType::Object(JvmObject::new(name)))
}

/// The name of the wrapper method that unboxes a primitive, e.g. `intValue`.
pub fn unbox_method(ty: &JvmType) -> Option<&'static str> {
    match ty {
        JvmType::Boolean => Some("booleanValue"),
        JvmType::Char => Some("charValue"),
        JvmType::Byte => Some("byteValue"),
        JvmType::Short => Some("shortValue"),
        JvmType::Int => Some("intValue"),
        JvmType::Long => Some("longValue"),
        JvmType::Float => Some("floatValue"),
        JvmType::Double => Some("doubleValue"),
        _ => None,
    }
}

/// The type as it may appear as a type argument: primitives are boxed.
pub fn as_reference(ty: &JvmType) -> JvmType {
    boxed(ty).unwrap_or_else(|| ty.clone())
}
