//! Decoding method code into instructions

use crate::constant_pool::ConstantPool;
use crate::encoder::{ByteReader, DecodeError};
use crate::opcode::Opcode;
use std::fmt::Write as _;

/// A decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the instruction (of the `wide` prefix if widened)
    pub offset: usize,
    /// The opcode; for a widened instruction, the inner load or store
    pub opcode: Opcode,
    /// Whether the instruction carries a `wide` prefix
    pub wide: bool,
    /// Operand bytes
    pub operands: Vec<u8>,
}

impl Instruction {
    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        if self.wide {
            2 + self.operands.len()
        } else {
            1 + self.operands.len()
        }
    }

    /// Offset of the next instruction
    pub fn next_offset(&self) -> usize {
        self.offset + self.size()
    }

    fn u16_operand(&self) -> Option<u16> {
        match self.operands.as_slice() {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    /// Absolute target of a branch
    pub fn branch_target(&self) -> Option<isize> {
        if !self.opcode.is_branch() {
            return None;
        }
        let relative = self.u16_operand()? as i16;
        Some(self.offset as isize + relative as isize)
    }

    /// Constant pool index referenced by the instruction
    pub fn constant_index(&self) -> Option<u16> {
        match self.opcode {
            Opcode::Ldc => self.operands.first().map(|&b| b as u16),
            Opcode::LdcW
            | Opcode::Ldc2W
            | Opcode::Getstatic
            | Opcode::Putstatic
            | Opcode::Getfield
            | Opcode::Putfield
            | Opcode::Invokevirtual
            | Opcode::Invokespecial
            | Opcode::Invokestatic
            | Opcode::Invokeinterface
            | Opcode::New
            | Opcode::Checkcast
            | Opcode::Instanceof => self.u16_operand(),
            _ => None,
        }
    }

    /// Local slot and slot width accessed by a load or store
    pub fn local_slot(&self) -> Option<(u16, u16)> {
        if let Some(implicit) = self.opcode.implicit_local() {
            return Some(implicit);
        }
        if !self.opcode.is_local_access() {
            return None;
        }
        let slot = if self.wide {
            self.u16_operand()?
        } else {
            *self.operands.first()? as u16
        };
        let width = match self.opcode {
            Opcode::Lload | Opcode::Dload | Opcode::Lstore | Opcode::Dstore => 2,
            _ => 1,
        };
        Some((slot, width))
    }

    /// Render the instruction for a listing, resolving pool references
    pub fn display(&self, pool: &ConstantPool) -> String {
        let mut out = format!("{:>5}: ", self.offset);
        if self.wide {
            out.push_str("wide ");
        }
        out.push_str(self.opcode.name());
        if let Some(target) = self.branch_target() {
            let _ = write!(out, " {}", target);
        } else if let Some(index) = self.constant_index() {
            let _ = write!(out, " #{} // {}", index, pool.describe(index));
        } else if let Some((slot, _)) = self.local_slot() {
            if self.opcode.implicit_local().is_none() {
                let _ = write!(out, " {}", slot);
            }
        } else {
            match self.opcode {
                Opcode::Bipush => {
                    if let Some(&value) = self.operands.first() {
                        let _ = write!(out, " {}", value as i8);
                    }
                }
                Opcode::Sipush => {
                    let _ = write!(out, " {}", self.u16_operand().unwrap_or(0) as i16);
                }
                _ => {}
            }
        }
        out
    }
}

/// Decode all instructions of a method body
pub fn decode_code(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut instructions = Vec::new();
    let mut reader = ByteReader::new(code);

    while reader.has_more() {
        let offset = reader.position();
        let byte = reader.read_u8()?;
        let opcode = Opcode::from_u8(byte).ok_or(DecodeError::InvalidOpcode {
            opcode: byte,
            offset,
        })?;

        let instruction = if opcode == Opcode::Wide {
            let inner_offset = reader.position();
            let inner = reader.read_u8()?;
            let inner_opcode = Opcode::from_u8(inner)
                .filter(|op| op.is_local_access())
                .ok_or(DecodeError::InvalidOpcode {
                    opcode: inner,
                    offset: inner_offset,
                })?;
            Instruction {
                offset,
                opcode: inner_opcode,
                wide: true,
                operands: reader.read_bytes(2)?.to_vec(),
            }
        } else {
            Instruction {
                offset,
                opcode,
                wide: false,
                operands: reader.read_bytes(opcode.operand_size())?.to_vec(),
            }
        };
        instructions.push(instruction);
    }

    Ok(instructions)
}
