//! Verification types and `StackMapTable` frames

use crate::constant_pool::ConstantPool;
use crate::encoder::ByteWriter;
use crate::error::ClassFileError;
use tego_jvm::JvmType;

/// The type of a local slot or stack entry, as the JVM verifier sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VType {
    /// Unusable slot
    Top,
    /// `int` and the types narrower than it
    Integer,
    /// `float`
    Float,
    /// `long`
    Long,
    /// `double`
    Double,
    /// The `null` reference
    Null,
    /// `this` in a constructor before the super constructor ran
    UninitializedThis,
    /// An initialized reference, by internal name (array descriptors for arrays)
    Object(String),
    /// An object created by the `new` at this code offset, not yet initialized
    Uninitialized(u16),
}

impl VType {
    /// The verification type of a value of type `ty`
    pub fn of(ty: &JvmType) -> VType {
        match ty {
            JvmType::Void => VType::Top,
            JvmType::Boolean | JvmType::Char | JvmType::Byte | JvmType::Short | JvmType::Int => {
                VType::Integer
            }
            JvmType::Long => VType::Long,
            JvmType::Float => VType::Float,
            JvmType::Double => VType::Double,
            JvmType::Array(_) => ty.descriptor().map_or_else(|_| VType::object(), VType::Object),
            JvmType::Object(o) => VType::Object(o.internal_name()),
            JvmType::TypeVar(_) => VType::object(),
            JvmType::TypeArg(arg) => match arg.element() {
                Some(element) => VType::of(element),
                None => VType::object(),
            },
        }
    }

    /// `java/lang/Object`
    pub fn object() -> VType {
        VType::Object("java/lang/Object".to_string())
    }

    /// Number of slots a value of this type occupies
    pub fn size(&self) -> u16 {
        match self {
            VType::Long | VType::Double => 2,
            _ => 1,
        }
    }

    fn encode(&self, pool: &mut ConstantPool, writer: &mut ByteWriter) -> Result<(), ClassFileError> {
        match self {
            VType::Top => writer.emit_u8(0),
            VType::Integer => writer.emit_u8(1),
            VType::Float => writer.emit_u8(2),
            VType::Double => writer.emit_u8(3),
            VType::Long => writer.emit_u8(4),
            VType::Null => writer.emit_u8(5),
            VType::UninitializedThis => writer.emit_u8(6),
            VType::Object(name) => {
                let index = pool.class(name)?;
                writer.emit_u8(7);
                writer.emit_u16(index);
            }
            VType::Uninitialized(offset) => {
                writer.emit_u8(8);
                writer.emit_u16(*offset);
            }
        }
        Ok(())
    }
}

/// The verifier state at a branch target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Code offset
    pub offset: u16,
    /// Local types by slot; a two-slot type is followed by `Top`
    pub locals: Vec<VType>,
    /// Operand stack types, bottom first
    pub stack: Vec<VType>,
}

impl Frame {
    /// Locals as written in a frame: two-slot types take one entry and
    /// trailing `Top` entries are dropped.
    pub fn compact_locals(&self) -> Vec<&VType> {
        let mut out = Vec::with_capacity(self.locals.len());
        let mut slot = 0;
        while slot < self.locals.len() {
            let ty = &self.locals[slot];
            out.push(ty);
            slot += ty.size() as usize;
        }
        while matches!(out.last(), Some(VType::Top)) {
            out.pop();
        }
        out
    }
}

/// Encode the body of a `StackMapTable` attribute
///
/// Every frame is written as a `full_frame`; frames must be sorted by offset
/// and offsets must be distinct.
pub fn encode_stack_map_table(
    frames: &[Frame],
    pool: &mut ConstantPool,
) -> Result<Vec<u8>, ClassFileError> {
    let mut writer = ByteWriter::new();
    writer.emit_u16(frames.len() as u16);
    let mut previous: Option<u16> = None;
    for frame in frames {
        let delta = match previous {
            None => frame.offset,
            Some(prev) => frame.offset - prev - 1,
        };
        previous = Some(frame.offset);

        writer.emit_u8(255); // full_frame
        writer.emit_u16(delta);
        let locals = frame.compact_locals();
        writer.emit_u16(locals.len() as u16);
        for ty in locals {
            ty.encode(pool, &mut writer)?;
        }
        writer.emit_u16(frame.stack.len() as u16);
        for ty in &frame.stack {
            ty.encode(pool, &mut writer)?;
        }
    }
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tego_jvm::{JvmObject, JvmTypeArg};

    #[test]
    fn test_vtype_of() {
        assert_eq!(VType::of(&JvmType::Boolean), VType::Integer);
        assert_eq!(VType::of(&JvmType::Long), VType::Long);
        assert_eq!(VType::of(&JvmType::type_var("CTX")), VType::object());
        assert_eq!(
            VType::of(&JvmType::array_of(JvmType::Int)),
            VType::Object("[I".to_string())
        );
        let list = JvmType::Object(JvmObject::generic("java/util/List", vec![JvmType::type_var("E")]));
        assert_eq!(VType::of(&list), VType::Object("java/util/List".to_string()));
        let arg = JvmType::TypeArg(JvmTypeArg::covariant(list));
        assert_eq!(VType::of(&arg), VType::Object("java/util/List".to_string()));
    }

    #[test]
    fn test_compact_locals() {
        let frame = Frame {
            offset: 0,
            locals: vec![VType::object(), VType::Long, VType::Top, VType::Integer, VType::Top],
            stack: vec![],
        };
        assert_eq!(
            frame.compact_locals(),
            vec![&VType::object(), &VType::Long, &VType::Integer]
        );
    }

    #[test]
    fn test_encode_full_frames() {
        let mut pool = ConstantPool::new();
        let frames = vec![
            Frame {
                offset: 4,
                locals: vec![VType::Integer],
                stack: vec![],
            },
            Frame {
                offset: 10,
                locals: vec![VType::Integer],
                stack: vec![VType::Null],
            },
        ];
        let bytes = encode_stack_map_table(&frames, &mut pool).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 2, // entries
                255, 0, 4, 0, 1, 1, 0, 0, // offset 4
                255, 0, 5, 0, 1, 1, 0, 1, 5, // offset 10
            ]
        );
    }
}
