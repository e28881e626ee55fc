//! Constant pool with interning
//!
//! Index 0 is unused and `long`/`double` entries take two slots, as the
//! class-file format requires. Adding an entry that is already present
//! returns the existing index.

use crate::encoder::{encode_modified_utf8, ByteReader, ByteWriter, DecodeError};
use crate::error::ClassFileError;
use rustc_hash::FxHashMap;

/// Constant pool tags
pub mod tag {
    /// `CONSTANT_Utf8`
    pub const UTF8: u8 = 1;
    /// `CONSTANT_Integer`
    pub const INTEGER: u8 = 3;
    /// `CONSTANT_Float`
    pub const FLOAT: u8 = 4;
    /// `CONSTANT_Long`
    pub const LONG: u8 = 5;
    /// `CONSTANT_Double`
    pub const DOUBLE: u8 = 6;
    /// `CONSTANT_Class`
    pub const CLASS: u8 = 7;
    /// `CONSTANT_String`
    pub const STRING: u8 = 8;
    /// `CONSTANT_Fieldref`
    pub const FIELDREF: u8 = 9;
    /// `CONSTANT_Methodref`
    pub const METHODREF: u8 = 10;
    /// `CONSTANT_InterfaceMethodref`
    pub const INTERFACE_METHODREF: u8 = 11;
    /// `CONSTANT_NameAndType`
    pub const NAME_AND_TYPE: u8 = 12;
}

/// A constant pool entry
///
/// Floating-point values are stored as their bit patterns so that entries
/// can be hashed and interned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// A string in modified UTF-8
    Utf8(String),
    /// An `int`
    Integer(i32),
    /// A `float`, as bits
    Float(u32),
    /// A `long`
    Long(i64),
    /// A `double`, as bits
    Double(u64),
    /// A class, by its Utf8 internal name
    Class(u16),
    /// A `java.lang.String` literal, by its Utf8 value
    String(u16),
    /// A field reference
    Fieldref {
        /// Class entry of the owner
        class: u16,
        /// NameAndType entry
        name_and_type: u16,
    },
    /// A class method reference
    Methodref {
        /// Class entry of the owner
        class: u16,
        /// NameAndType entry
        name_and_type: u16,
    },
    /// An interface method reference
    InterfaceMethodref {
        /// Class entry of the owner
        class: u16,
        /// NameAndType entry
        name_and_type: u16,
    },
    /// A member name with its descriptor
    NameAndType {
        /// Utf8 entry of the name
        name: u16,
        /// Utf8 entry of the descriptor
        descriptor: u16,
    },
}

impl Constant {
    /// The tag byte of this entry
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => tag::UTF8,
            Constant::Integer(_) => tag::INTEGER,
            Constant::Float(_) => tag::FLOAT,
            Constant::Long(_) => tag::LONG,
            Constant::Double(_) => tag::DOUBLE,
            Constant::Class(_) => tag::CLASS,
            Constant::String(_) => tag::STRING,
            Constant::Fieldref { .. } => tag::FIELDREF,
            Constant::Methodref { .. } => tag::METHODREF,
            Constant::InterfaceMethodref { .. } => tag::INTERFACE_METHODREF,
            Constant::NameAndType { .. } => tag::NAME_AND_TYPE,
        }
    }

    /// Number of pool slots the entry occupies
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    /// Whether `ldc`/`ldc_w` may load this entry
    pub fn is_loadable(&self) -> bool {
        matches!(
            self,
            Constant::Integer(_) | Constant::Float(_) | Constant::String(_) | Constant::Class(_)
        )
    }

    /// Whether `ldc2_w` may load this entry
    pub fn is_wide_loadable(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }
}

/// The kind of a member reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// `Fieldref`
    Field,
    /// `Methodref`
    Method,
    /// `InterfaceMethodref`
    InterfaceMethod,
}

/// A resolved field or method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    /// Kind of reference
    pub kind: MemberKind,
    /// Internal name of the owner class
    pub owner: &'a str,
    /// Member name
    pub name: &'a str,
    /// Member descriptor
    pub descriptor: &'a str,
}

/// The constant pool of a class file
#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Option<Constant>>,
    index: FxHashMap<Constant, u16>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            entries: vec![None],
            index: FxHashMap::default(),
        }
    }

    /// The `constant_pool_count` value: one more than the highest index
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Get the entry at `index`
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize).and_then(Option::as_ref)
    }

    /// Iterate over the entries with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|c| (i as u16, c)))
    }

    /// Add an entry, returning the index of an equal existing entry if there is one
    pub fn add(&mut self, constant: Constant) -> Result<u16, ClassFileError> {
        if let Some(&index) = self.index.get(&constant) {
            return Ok(index);
        }
        let width = constant.width();
        if self.entries.len() + width > u16::MAX as usize {
            return Err(ClassFileError::ConstantPoolOverflow);
        }
        let index = self.entries.len() as u16;
        self.index.insert(constant.clone(), index);
        self.entries.push(Some(constant));
        if width == 2 {
            self.entries.push(None);
        }
        Ok(index)
    }

    // ===== Typed Entries =====

    /// Add a Utf8 entry
    pub fn utf8(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let length = encode_modified_utf8(value).len();
        if length > u16::MAX as usize {
            return Err(ClassFileError::StringTooLong { length });
        }
        self.add(Constant::Utf8(value.to_string()))
    }

    /// Add an Integer entry
    pub fn integer(&mut self, value: i32) -> Result<u16, ClassFileError> {
        self.add(Constant::Integer(value))
    }

    /// Add a Float entry
    pub fn float(&mut self, value: f32) -> Result<u16, ClassFileError> {
        self.add(Constant::Float(value.to_bits()))
    }

    /// Add a Long entry
    pub fn long(&mut self, value: i64) -> Result<u16, ClassFileError> {
        self.add(Constant::Long(value))
    }

    /// Add a Double entry
    pub fn double(&mut self, value: f64) -> Result<u16, ClassFileError> {
        self.add(Constant::Double(value.to_bits()))
    }

    /// Add a Class entry for an internal name
    pub fn class(&mut self, internal_name: &str) -> Result<u16, ClassFileError> {
        let name = self.utf8(internal_name)?;
        self.add(Constant::Class(name))
    }

    /// Add a String entry
    pub fn string(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let utf8 = self.utf8(value)?;
        self.add(Constant::String(utf8))
    }

    /// Add a NameAndType entry
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.add(Constant::NameAndType { name, descriptor })
    }

    /// Add a Fieldref entry
    pub fn field_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ClassFileError> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::Fieldref {
            class,
            name_and_type,
        })
    }

    /// Add a Methodref entry
    pub fn method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ClassFileError> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::Methodref {
            class,
            name_and_type,
        })
    }

    /// Add an InterfaceMethodref entry
    pub fn interface_method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ClassFileError> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::InterfaceMethodref {
            class,
            name_and_type,
        })
    }

    // ===== Lookups =====

    /// The string of a Utf8 entry
    pub fn utf8_at(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// The internal name of a Class entry
    pub fn class_name_at(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8_at(*name),
            _ => None,
        }
    }

    /// The name and descriptor of a NameAndType entry
    pub fn name_and_type_at(&self, index: u16) -> Option<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Some((self.utf8_at(*name)?, self.utf8_at(*descriptor)?))
            }
            _ => None,
        }
    }

    /// Resolve a Fieldref, Methodref or InterfaceMethodref entry
    pub fn member_ref_at(&self, index: u16) -> Option<MemberRef<'_>> {
        let (kind, class, name_and_type) = match self.get(index)? {
            Constant::Fieldref {
                class,
                name_and_type,
            } => (MemberKind::Field, *class, *name_and_type),
            Constant::Methodref {
                class,
                name_and_type,
            } => (MemberKind::Method, *class, *name_and_type),
            Constant::InterfaceMethodref {
                class,
                name_and_type,
            } => (MemberKind::InterfaceMethod, *class, *name_and_type),
            _ => return None,
        };
        let owner = self.class_name_at(class)?;
        let (name, descriptor) = self.name_and_type_at(name_and_type)?;
        Some(MemberRef {
            kind,
            owner,
            name,
            descriptor,
        })
    }

    /// A short human-readable description of an entry, for listings
    pub fn describe(&self, index: u16) -> String {
        let Some(constant) = self.get(index) else {
            return format!("<invalid #{}>", index);
        };
        match constant {
            Constant::Utf8(value) => value.clone(),
            Constant::Integer(value) => format!("int {}", value),
            Constant::Float(bits) => format!("float {}", f32::from_bits(*bits)),
            Constant::Long(value) => format!("long {}", value),
            Constant::Double(bits) => format!("double {}", f64::from_bits(*bits)),
            Constant::Class(_) => format!("class {}", self.class_name_at(index).unwrap_or("?")),
            Constant::String(utf8) => format!("String {:?}", self.utf8_at(*utf8).unwrap_or("?")),
            Constant::NameAndType { .. } => match self.name_and_type_at(index) {
                Some((name, descriptor)) => format!("{}:{}", name, descriptor),
                None => "?".to_string(),
            },
            _ => match self.member_ref_at(index) {
                Some(member) => format!("{}.{}:{}", member.owner, member.name, member.descriptor),
                None => "?".to_string(),
            },
        }
    }

    // ===== Encoding =====

    /// Write `constant_pool_count` followed by the entries
    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.emit_u16(self.count());
        for (_, constant) in self.iter() {
            writer.emit_u8(constant.tag());
            match constant {
                Constant::Utf8(value) => writer.emit_utf8(value),
                Constant::Integer(value) => writer.emit_i32(*value),
                Constant::Float(bits) => writer.emit_u32(*bits),
                Constant::Long(value) => writer.emit_i64(*value),
                Constant::Double(bits) => writer.emit_i64(*bits as i64),
                Constant::Class(index) | Constant::String(index) => writer.emit_u16(*index),
                Constant::Fieldref {
                    class,
                    name_and_type,
                }
                | Constant::Methodref {
                    class,
                    name_and_type,
                }
                | Constant::InterfaceMethodref {
                    class,
                    name_and_type,
                } => {
                    writer.emit_u16(*class);
                    writer.emit_u16(*name_and_type);
                }
                Constant::NameAndType { name, descriptor } => {
                    writer.emit_u16(*name);
                    writer.emit_u16(*descriptor);
                }
            }
        }
    }

    /// Read `constant_pool_count` followed by the entries
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_u16()? as usize;
        let mut pool = Self::new();
        while pool.entries.len() < count {
            let offset = reader.position();
            let tag = reader.read_u8()?;
            let constant = match tag {
                tag::UTF8 => Constant::Utf8(reader.read_utf8()?),
                tag::INTEGER => Constant::Integer(reader.read_i32()?),
                tag::FLOAT => Constant::Float(reader.read_u32()?),
                tag::LONG => Constant::Long(reader.read_i64()?),
                tag::DOUBLE => Constant::Double(reader.read_i64()? as u64),
                tag::CLASS => Constant::Class(reader.read_u16()?),
                tag::STRING => Constant::String(reader.read_u16()?),
                tag::FIELDREF => Constant::Fieldref {
                    class: reader.read_u16()?,
                    name_and_type: reader.read_u16()?,
                },
                tag::METHODREF => Constant::Methodref {
                    class: reader.read_u16()?,
                    name_and_type: reader.read_u16()?,
                },
                tag::INTERFACE_METHODREF => Constant::InterfaceMethodref {
                    class: reader.read_u16()?,
                    name_and_type: reader.read_u16()?,
                },
                tag::NAME_AND_TYPE => Constant::NameAndType {
                    name: reader.read_u16()?,
                    descriptor: reader.read_u16()?,
                },
                _ => return Err(DecodeError::InvalidTag { tag, offset }),
            };
            let index = pool.entries.len() as u16;
            let width = constant.width();
            pool.index.entry(constant.clone()).or_insert(index);
            pool.entries.push(Some(constant));
            if width == 2 {
                pool.entries.push(None);
            }
        }
        Ok(pool)
    }
}
