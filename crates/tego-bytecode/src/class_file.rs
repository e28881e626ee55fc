//! Class-file model, serialization and parsing

use crate::constant_pool::ConstantPool;
use crate::encoder::{ByteReader, ByteWriter, DecodeError};

/// Magic number of class files
pub const MAGIC: u32 = 0xCAFE_BABE;

/// First class-file version whose verifier requires `StackMapTable` frames
pub const STACK_MAP_VERSION: u16 = 50;

/// Access flags
pub mod access {
    /// `ACC_PUBLIC`
    pub const PUBLIC: u16 = 0x0001;
    /// `ACC_PRIVATE`
    pub const PRIVATE: u16 = 0x0002;
    /// `ACC_PROTECTED`
    pub const PROTECTED: u16 = 0x0004;
    /// `ACC_STATIC`
    pub const STATIC: u16 = 0x0008;
    /// `ACC_FINAL`
    pub const FINAL: u16 = 0x0010;
    /// `ACC_SUPER` on classes
    pub const SUPER: u16 = 0x0020;
    /// `ACC_BRIDGE` on methods
    pub const BRIDGE: u16 = 0x0040;
    /// `ACC_INTERFACE`
    pub const INTERFACE: u16 = 0x0200;
    /// `ACC_ABSTRACT`
    pub const ABSTRACT: u16 = 0x0400;
    /// `ACC_SYNTHETIC`
    pub const SYNTHETIC: u16 = 0x1000;
}

/// Well-known attribute names
pub mod attr {
    /// Method body
    pub const CODE: &str = "Code";
    /// Generic signature
    pub const SIGNATURE: &str = "Signature";
    /// Debug names of locals
    pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
    /// Verifier frames
    pub const STACK_MAP_TABLE: &str = "StackMapTable";
}

/// A raw attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Utf8 entry of the attribute name
    pub name_index: u16,
    /// Attribute body
    pub info: Vec<u8>,
}

/// A field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Access flags
    pub access_flags: u16,
    /// Utf8 entry of the name
    pub name_index: u16,
    /// Utf8 entry of the descriptor
    pub descriptor_index: u16,
    /// Member attributes
    pub attributes: Vec<Attribute>,
}

/// An exception handler of a `Code` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// First covered offset
    pub start_pc: u16,
    /// Offset past the covered range
    pub end_pc: u16,
    /// Handler offset
    pub handler_pc: u16,
    /// Class entry of the caught type, or 0 for any
    pub catch_type: u16,
}

/// A decoded `Code` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Maximum operand stack depth in slots
    pub max_stack: u16,
    /// Number of local slots
    pub max_locals: u16,
    /// Instructions
    pub code: Vec<u8>,
    /// Exception handlers
    pub exception_table: Vec<ExceptionHandler>,
    /// Nested attributes
    pub attributes: Vec<Attribute>,
}

impl CodeAttribute {
    /// Encode the attribute body
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.code.len() + 32);
        writer.emit_u16(self.max_stack);
        writer.emit_u16(self.max_locals);
        writer.emit_u32(self.code.len() as u32);
        writer.emit_bytes(&self.code);
        writer.emit_u16(self.exception_table.len() as u16);
        for handler in &self.exception_table {
            writer.emit_u16(handler.start_pc);
            writer.emit_u16(handler.end_pc);
            writer.emit_u16(handler.handler_pc);
            writer.emit_u16(handler.catch_type);
        }
        write_attributes(&mut writer, &self.attributes);
        writer.into_bytes()
    }

    /// Decode an attribute body
    pub fn decode(info: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(info);
        let max_stack = reader.read_u16()?;
        let max_locals = reader.read_u16()?;
        let code_len = reader.read_u32()? as usize;
        let code = reader.read_bytes(code_len)?.to_vec();
        let handler_count = reader.read_u16()?;
        let mut exception_table = Vec::with_capacity(handler_count as usize);
        for _ in 0..handler_count {
            exception_table.push(ExceptionHandler {
                start_pc: reader.read_u16()?,
                end_pc: reader.read_u16()?,
                handler_pc: reader.read_u16()?,
                catch_type: reader.read_u16()?,
            });
        }
        let attributes = read_attributes(&mut reader)?;
        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}

/// An entry of a `LocalVariableTable` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableEntry {
    /// First offset where the local has a value
    pub start_pc: u16,
    /// Length of the range
    pub length: u16,
    /// Utf8 entry of the name
    pub name_index: u16,
    /// Utf8 entry of the descriptor
    pub descriptor_index: u16,
    /// Slot
    pub index: u16,
}

/// Decode the body of a `LocalVariableTable` attribute
pub fn decode_local_variable_table(info: &[u8]) -> Result<Vec<LocalVariableEntry>, DecodeError> {
    let mut reader = ByteReader::new(info);
    let count = reader.read_u16()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        entries.push(LocalVariableEntry {
            start_pc: reader.read_u16()?,
            length: reader.read_u16()?,
            name_index: reader.read_u16()?,
            descriptor_index: reader.read_u16()?,
            index: reader.read_u16()?,
        });
    }
    Ok(entries)
}

/// Encode the body of a `LocalVariableTable` attribute
pub fn encode_local_variable_table(entries: &[LocalVariableEntry]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(2 + entries.len() * 10);
    writer.emit_u16(entries.len() as u16);
    for entry in entries {
        writer.emit_u16(entry.start_pc);
        writer.emit_u16(entry.length);
        writer.emit_u16(entry.name_index);
        writer.emit_u16(entry.descriptor_index);
        writer.emit_u16(entry.index);
    }
    writer.into_bytes()
}

/// A complete class file
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Minor version
    pub minor_version: u16,
    /// Major version
    pub major_version: u16,
    /// Constant pool
    pub constant_pool: ConstantPool,
    /// Class access flags
    pub access_flags: u16,
    /// Class entry of this class
    pub this_class: u16,
    /// Class entry of the super class
    pub super_class: u16,
    /// Class entries of implemented interfaces
    pub interfaces: Vec<u16>,
    /// Fields
    pub fields: Vec<MemberInfo>,
    /// Methods
    pub methods: Vec<MemberInfo>,
    /// Class attributes
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Serialize to class-file bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(1024);
        writer.emit_u32(MAGIC);
        writer.emit_u16(self.minor_version);
        writer.emit_u16(self.major_version);
        self.constant_pool.encode(&mut writer);
        writer.emit_u16(self.access_flags);
        writer.emit_u16(self.this_class);
        writer.emit_u16(self.super_class);
        writer.emit_u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            writer.emit_u16(*interface);
        }
        write_members(&mut writer, &self.fields);
        write_members(&mut writer, &self.methods);
        write_attributes(&mut writer, &self.attributes);
        writer.into_bytes()
    }

    /// Parse class-file bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic(magic));
        }
        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        let constant_pool = ConstantPool::decode(&mut reader)?;
        let access_flags = reader.read_u16()?;
        let this_class = reader.read_u16()?;
        let super_class = reader.read_u16()?;
        let interface_count = reader.read_u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(reader.read_u16()?);
        }
        let fields = read_members(&mut reader)?;
        let methods = read_members(&mut reader)?;
        let attributes = read_attributes(&mut reader)?;
        if reader.has_more() {
            return Err(DecodeError::UnexpectedEnd(reader.position()));
        }
        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    // ===== Queries =====

    /// Internal name of this class
    pub fn this_class_name(&self) -> Option<&str> {
        self.constant_pool.class_name_at(self.this_class)
    }

    /// Internal name of the super class
    pub fn super_class_name(&self) -> Option<&str> {
        self.constant_pool.class_name_at(self.super_class)
    }

    /// Internal names of the implemented interfaces
    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces
            .iter()
            .filter_map(|&index| self.constant_pool.class_name_at(index))
            .collect()
    }

    /// Name of a field or method
    pub fn member_name(&self, member: &MemberInfo) -> Option<&str> {
        self.constant_pool.utf8_at(member.name_index)
    }

    /// Descriptor of a field or method
    pub fn member_descriptor(&self, member: &MemberInfo) -> Option<&str> {
        self.constant_pool.utf8_at(member.descriptor_index)
    }

    /// Find a method by name and, optionally, descriptor
    pub fn find_method(&self, name: &str, descriptor: Option<&str>) -> Option<&MemberInfo> {
        self.methods.iter().find(|m| {
            self.member_name(m) == Some(name)
                && descriptor.map_or(true, |d| self.member_descriptor(m) == Some(d))
        })
    }

    /// Find a field by name
    pub fn find_field(&self, name: &str) -> Option<&MemberInfo> {
        self.fields.iter().find(|f| self.member_name(f) == Some(name))
    }

    /// Find an attribute by name in `attributes`
    pub fn find_attribute<'a>(&self, attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
        attributes
            .iter()
            .find(|a| self.constant_pool.utf8_at(a.name_index) == Some(name))
    }

    /// The value of a `Signature` attribute in `attributes`
    pub fn signature_in(&self, attributes: &[Attribute]) -> Option<&str> {
        let attribute = self.find_attribute(attributes, attr::SIGNATURE)?;
        let bytes: [u8; 2] = attribute.info.as_slice().try_into().ok()?;
        self.constant_pool.utf8_at(u16::from_be_bytes(bytes))
    }

    /// The decoded `Code` attribute of a method
    pub fn code_of(&self, method: &MemberInfo) -> Option<Result<CodeAttribute, DecodeError>> {
        self.find_attribute(&method.attributes, attr::CODE)
            .map(|a| CodeAttribute::decode(&a.info))
    }
}

fn write_attributes(writer: &mut ByteWriter, attributes: &[Attribute]) {
    writer.emit_u16(attributes.len() as u16);
    for attribute in attributes {
        writer.emit_u16(attribute.name_index);
        writer.emit_u32(attribute.info.len() as u32);
        writer.emit_bytes(&attribute.info);
    }
}

fn read_attributes(reader: &mut ByteReader<'_>) -> Result<Vec<Attribute>, DecodeError> {
    let count = reader.read_u16()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.read_u16()?;
        let len = reader.read_u32()? as usize;
        let info = reader.read_bytes(len)?.to_vec();
        attributes.push(Attribute { name_index, info });
    }
    Ok(attributes)
}

fn write_members(writer: &mut ByteWriter, members: &[MemberInfo]) {
    writer.emit_u16(members.len() as u16);
    for member in members {
        writer.emit_u16(member.access_flags);
        writer.emit_u16(member.name_index);
        writer.emit_u16(member.descriptor_index);
        write_attributes(writer, &member.attributes);
    }
}

fn read_members(reader: &mut ByteReader<'_>) -> Result<Vec<MemberInfo>, DecodeError> {
    let count = reader.read_u16()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        members.push(MemberInfo {
            access_flags: reader.read_u16()?,
            name_index: reader.read_u16()?,
            descriptor_index: reader.read_u16()?,
            attributes: read_attributes(reader)?,
        });
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_class() -> ClassFile {
        let mut pool = ConstantPool::new();
        let this_class = pool.class("a/Empty").unwrap();
        let super_class = pool.class("java/lang/Object").unwrap();
        let name_index = pool.utf8("count").unwrap();
        let descriptor_index = pool.utf8("I").unwrap();
        ClassFile {
            minor_version: 0,
            major_version: 52,
            constant_pool: pool,
            access_flags: access::PUBLIC | access::SUPER,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![MemberInfo {
                access_flags: access::PRIVATE,
                name_index,
                descriptor_index,
                attributes: vec![],
            }],
            methods: vec![],
            attributes: vec![],
        }
    }

    #[test]
    fn test_class_file_roundtrip() {
        let class = minimal_class();
        let bytes = class.to_bytes();
        assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);

        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.major_version, 52);
        assert_eq!(parsed.this_class_name(), Some("a/Empty"));
        assert_eq!(parsed.super_class_name(), Some("java/lang/Object"));
        let field = parsed.find_field("count").unwrap();
        assert_eq!(parsed.member_descriptor(field), Some("I"));
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = minimal_class().to_bytes();
        bytes[0] = 0;
        assert_eq!(
            ClassFile::parse(&bytes).unwrap_err(),
            DecodeError::InvalidMagic(0x00FE_BABE)
        );
    }

    #[test]
    fn test_truncated_and_trailing_bytes() {
        let bytes = minimal_class().to_bytes();
        assert!(ClassFile::parse(&bytes[..bytes.len() - 1]).is_err());
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(ClassFile::parse(&longer).is_err());
    }

    #[test]
    fn test_code_attribute_roundtrip() {
        let code = CodeAttribute {
            max_stack: 2,
            max_locals: 1,
            code: vec![0x2a, 0xb0],
            exception_table: vec![],
            attributes: vec![],
        };
        assert_eq!(CodeAttribute::decode(&code.encode()).unwrap(), code);
    }

    #[test]
    fn test_local_variable_table_roundtrip() {
        let entries = vec![LocalVariableEntry {
            start_pc: 0,
            length: 5,
            name_index: 3,
            descriptor_index: 4,
            index: 1,
        }];
        let bytes = encode_local_variable_table(&entries);
        assert_eq!(decode_local_variable_table(&bytes).unwrap(), entries);
    }
}
