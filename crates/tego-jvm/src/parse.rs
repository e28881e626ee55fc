//! Recursive-descent parser for descriptors and signatures
//!
//! The parser is keyed on the lead character of each type:
//!
//! ```text
//! V Z C B S I J F D   primitive
//! [                   array of the following type
//! L name (<args>)? ((.|$) name (<args>)?)* ;
//! T name ;            type variable (signatures only)
//! + - *               type argument (signatures only)
//! ```
//!
//! [`parse_partial`] parses one type from a slice of the input and reports
//! where it ended; the complete parsers require the whole input to be consumed.

use crate::error::SignatureError;
use crate::ty::{JvmObject, JvmType, JvmTypeArg};

/// Parse a complete generic signature.
pub fn parse_signature(text: &str) -> Result<JvmType, SignatureError> {
    parse_complete(text, false)
}

/// Parse a complete descriptor.
pub fn parse_descriptor(text: &str) -> Result<JvmType, SignatureError> {
    parse_complete(text, true)
}

/// Parse `text` as one type, requiring all of it to be consumed.
pub fn parse_complete(text: &str, is_descriptor: bool) -> Result<JvmType, SignatureError> {
    if text.is_empty() {
        return Err(SignatureError::Empty);
    }
    let (ty, end) = parse_partial(text, 0, text.len(), is_descriptor)?;
    if end != text.len() {
        return Err(SignatureError::Incomplete {
            fragment: text.to_string(),
        });
    }
    Ok(ty)
}

/// Parse one type from `buf[start..end]`.
///
/// Returns the type and the offset just past it. Input after the type is
/// left for the caller.
pub fn parse_partial(
    buf: &str,
    start: usize,
    end: usize,
    is_descriptor: bool,
) -> Result<(JvmType, usize), SignatureError> {
    let bytes = buf.as_bytes();
    if start >= end || end > bytes.len() {
        return Err(malformed(buf, start, end));
    }

    match bytes[start] {
        b'V' => Ok((JvmType::Void, start + 1)),
        b'Z' => Ok((JvmType::Boolean, start + 1)),
        b'C' => Ok((JvmType::Char, start + 1)),
        b'B' => Ok((JvmType::Byte, start + 1)),
        b'S' => Ok((JvmType::Short, start + 1)),
        b'I' => Ok((JvmType::Int, start + 1)),
        b'J' => Ok((JvmType::Long, start + 1)),
        b'F' => Ok((JvmType::Float, start + 1)),
        b'D' => Ok((JvmType::Double, start + 1)),
        b'[' => {
            if start + 1 >= end {
                return Err(malformed(buf, start, end));
            }
            let (element, next) = parse_partial(buf, start + 1, end, is_descriptor)?;
            Ok((JvmType::array_of(element), next))
        }
        b'L' => parse_object(buf, start, end, is_descriptor),
        b'T' if !is_descriptor => parse_type_var(buf, start, end),
        b'+' if !is_descriptor => {
            let (element, next) = parse_bound(buf, start, end)?;
            Ok((JvmType::TypeArg(JvmTypeArg::covariant(element)), next))
        }
        b'-' if !is_descriptor => {
            let (element, next) = parse_bound(buf, start, end)?;
            Ok((JvmType::TypeArg(JvmTypeArg::contravariant(element)), next))
        }
        b'*' if !is_descriptor => Ok((JvmType::TypeArg(JvmTypeArg::wildcard()), start + 1)),
        b'T' | b'+' | b'-' | b'*' => Err(malformed(buf, start, end)),
        b'(' => Err(SignatureError::MethodSignatureUnsupported {
            fragment: fragment(buf, start, end),
        }),
        _ => Err(SignatureError::UnsupportedLead {
            fragment: fragment(buf, start, end),
        }),
    }
}

/// Parse the reference type after a variance prefix at `start`.
fn parse_bound(buf: &str, start: usize, end: usize) -> Result<(JvmType, usize), SignatureError> {
    match buf.as_bytes().get(start + 1) {
        Some(b'L' | b'T' | b'[') if start + 1 < end => parse_partial(buf, start + 1, end, false),
        _ => Err(malformed(buf, start, end)),
    }
}

/// Parse `L...;` starting at the `L`.
fn parse_object(
    buf: &str,
    start: usize,
    end: usize,
    is_descriptor: bool,
) -> Result<(JvmType, usize), SignatureError> {
    let bytes = buf.as_bytes();
    let mut enclosing: Option<JvmObject> = None;
    let mut is_inner = false;
    let mut cursor = start + 1; // After `L`

    loop {
        let name_start = cursor;
        while cursor < end && !matches!(bytes[cursor], b';' | b'.' | b'$' | b'<' | b'>') {
            cursor += 1;
        }
        if cursor >= end || cursor == name_start {
            return Err(malformed(buf, start, end));
        }
        let name = buf
            .get(name_start..cursor)
            .ok_or_else(|| malformed(buf, start, end))?;

        let mut type_args = Vec::new();
        if bytes[cursor] == b'<' {
            if is_descriptor {
                return Err(malformed(buf, start, end));
            }
            cursor += 1; // Skip over `<`
            while cursor < end && bytes[cursor] != b'>' {
                let (arg, next) = parse_partial(buf, cursor, end, is_descriptor)?;
                type_args.push(as_type_arg(arg));
                cursor = next;
            }
            if cursor >= end || type_args.is_empty() {
                return Err(malformed(buf, start, end));
            }
            cursor += 1; // Skip over `>`
            if cursor >= end {
                return Err(malformed(buf, start, end));
            }
        }

        let segment = JvmObject {
            name: name.to_string(),
            type_args,
            enclosing: enclosing.take().map(Box::new),
            is_inner,
        };

        match bytes[cursor] {
            b';' => return Ok((JvmType::Object(segment), cursor + 1)),
            b'.' => {
                // Everything so far encloses an inner class
                enclosing = Some(segment);
                is_inner = true;
                cursor += 1;
            }
            b'$' => {
                // Everything so far encloses a static class
                enclosing = Some(segment);
                is_inner = false;
                cursor += 1;
            }
            _ => return Err(malformed(buf, start, end)),
        }
    }
}

/// Parse `T...;` starting at the `T`.
fn parse_type_var(buf: &str, start: usize, end: usize) -> Result<(JvmType, usize), SignatureError> {
    let bytes = buf.as_bytes();
    let name_start = start + 1;
    let mut cursor = name_start;
    while cursor < end && bytes[cursor] != b';' {
        cursor += 1;
    }
    if cursor >= end || cursor == name_start {
        return Err(malformed(buf, start, end));
    }
    let name = buf
        .get(name_start..cursor)
        .ok_or_else(|| malformed(buf, start, end))?;
    Ok((JvmType::type_var(name), cursor + 1))
}

/// A raw type inside `<...>` is an invariant type argument.
fn as_type_arg(ty: JvmType) -> JvmType {
    match ty {
        JvmType::TypeArg(_) => ty,
        other => JvmType::TypeArg(JvmTypeArg::invariant(other)),
    }
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
///
/// Returns the parameter types and the result type.
pub fn parse_method_descriptor(text: &str) -> Result<(Vec<JvmType>, JvmType), SignatureError> {
    let bytes = text.as_bytes();
    let end = text.len();
    if bytes.first() != Some(&b'(') {
        return Err(malformed(text, 0, end));
    }
    let mut cursor = 1;
    let mut params = Vec::new();
    while cursor < end && bytes[cursor] != b')' {
        let (param, next) = parse_partial(text, cursor, end, true)?;
        params.push(param);
        cursor = next;
    }
    if cursor >= end {
        return Err(malformed(text, 0, end));
    }
    let (result, next) = parse_partial(text, cursor + 1, end, true)?;
    if next != end {
        return Err(SignatureError::Incomplete {
            fragment: text.to_string(),
        });
    }
    Ok((params, result))
}

fn fragment(buf: &str, start: usize, end: usize) -> String {
    buf.get(start..end).unwrap_or(buf).to_string()
}

fn malformed(buf: &str, start: usize, end: usize) -> SignatureError {
    SignatureError::Malformed {
        fragment: fragment(buf, start, end),
    }
}

impl JvmType {
    /// Parse a generic signature such as `Ljava/util/List<TE;>;`.
    pub fn from_signature(signature: &str) -> Result<JvmType, SignatureError> {
        parse_signature(signature)
    }

    /// Parse a descriptor such as `[Ljava/lang/String;`.
    pub fn from_descriptor(descriptor: &str) -> Result<JvmType, SignatureError> {
        parse_descriptor(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Variance;

    #[test]
    fn test_parse_primitives() {
        for (text, ty) in [
            ("V", JvmType::Void),
            ("Z", JvmType::Boolean),
            ("C", JvmType::Char),
            ("B", JvmType::Byte),
            ("S", JvmType::Short),
            ("I", JvmType::Int),
            ("J", JvmType::Long),
            ("F", JvmType::Float),
            ("D", JvmType::Double),
        ] {
            assert_eq!(parse_descriptor(text).unwrap(), ty, "parsing {}", text);
        }
    }

    #[test]
    fn test_parse_multidimensional_array() {
        let ty = parse_descriptor("[[[I").unwrap();
        assert_eq!(ty.dimension_count(), 3);
        assert_eq!(
            ty,
            JvmType::array_of(JvmType::array_of(JvmType::array_of(JvmType::Int)))
        );
    }

    #[test]
    fn test_parse_generic_list() {
        let ty = parse_signature("Ljava/util/List<TE;>;").unwrap();
        let object = ty.as_object().unwrap();
        assert_eq!(object.name(), "java/util/List");
        assert_eq!(object.type_args().len(), 1);
        match &object.type_args()[0] {
            JvmType::TypeArg(arg) => {
                assert_eq!(arg.variance(), Variance::Invariant);
                assert_eq!(arg.element(), Some(&JvmType::type_var("E")));
            }
            other => panic!("expected a type argument, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_covariant_argument() {
        let ty = parse_signature("+Ljava/lang/Object;").unwrap();
        match ty {
            JvmType::TypeArg(arg) => {
                assert_eq!(arg.variance(), Variance::Covariant);
                assert_eq!(arg.element().unwrap().descriptor().unwrap(), "Ljava/lang/Object;");
            }
            other => panic!("expected a type argument, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_static_then_inner() {
        let ty = parse_signature("Lorg/example/TestClass$S<TX;>.N<TV;>;").unwrap();
        assert_eq!(ty.descriptor().unwrap(), "Lorg/example/TestClass$S.N;");
        assert_eq!(ty.signature(), "Lorg/example/TestClass$S<TX;>.N<TV;>;");
        let inner = ty.as_object().unwrap();
        assert!(inner.is_inner());
        let s = inner.enclosing().unwrap();
        assert!(!s.is_inner());
        assert_eq!(s.enclosing().unwrap().name(), "org/example/TestClass");
    }

    #[test]
    fn test_parse_partial_reports_end() {
        let (ty, end) = parse_partial("ILjava/lang/String;", 0, 19, true).unwrap();
        assert_eq!(ty, JvmType::Int);
        assert_eq!(end, 1);
        let (ty, end) = parse_partial("ILjava/lang/String;", 1, 19, true).unwrap();
        assert_eq!(ty.descriptor().unwrap(), "Ljava/lang/String;");
        assert_eq!(end, 19);
    }

    #[test]
    fn test_incomplete_signature() {
        assert_eq!(
            parse_descriptor("II").unwrap_err(),
            SignatureError::Incomplete {
                fragment: "II".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_signatures() {
        for text in [
            "Ljava/lang/Object",
            "Ljava/util/List<TE;",
            "Ljava/util/List<TE;>",
            "Ljava/util/List<>;",
            "TE",
            "T;",
            "L;",
            "[",
            "Lfoo>;",
            "Lfoo<TA;><TB;>;",
        ] {
            match parse_signature(text) {
                Err(SignatureError::Malformed { fragment }) => assert_eq!(fragment, text),
                other => panic!("expected malformed error for {}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_variance_requires_reference_bound() {
        for text in ["++Ljava/lang/Object;", "+*", "-+TE;", "--Ljava/lang/String;", "+I", "-", "+"] {
            assert!(
                matches!(parse_signature(text), Err(SignatureError::Malformed { .. })),
                "{} should be malformed",
                text
            );
        }
        assert!(matches!(
            parse_signature("Ljava/util/List<++Ljava/lang/Object;>;"),
            Err(SignatureError::Malformed { .. })
        ));
        assert!(parse_signature("+[I").is_ok());
        assert!(parse_signature("-TE;").is_ok());
    }

    #[test]
    fn test_generic_features_rejected_in_descriptors() {
        assert!(parse_descriptor("TE;").is_err());
        assert!(parse_descriptor("Ljava/util/List<TE;>;").is_err());
        assert!(parse_descriptor("*").is_err());
    }

    #[test]
    fn test_unsupported_leads() {
        assert!(matches!(
            parse_signature("(I)V"),
            Err(SignatureError::MethodSignatureUnsupported { .. })
        ));
        assert!(matches!(
            parse_signature("Q"),
            Err(SignatureError::UnsupportedLead { .. })
        ));
        assert_eq!(parse_signature(""), Err(SignatureError::Empty));
    }

    #[test]
    fn test_parse_method_descriptor() {
        let (params, result) =
            parse_method_descriptor("(Ljava/lang/Object;IJ[Ljava/lang/String;)V").unwrap();
        assert_eq!(params.len(), 4);
        assert_eq!(params[1], JvmType::Int);
        assert_eq!(params[2], JvmType::Long);
        assert_eq!(result, JvmType::Void);
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
    }
}
