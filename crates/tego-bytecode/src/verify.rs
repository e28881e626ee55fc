//! Structural verification of class files
//!
//! This is not the JVM verifier. It checks what the class writer is
//! responsible for getting right: that every method body decodes, that
//! branches land on instruction boundaries, that the operand stack depth is
//! consistent along every path and stays within `max_stack`, that constant
//! and local references are in range and of the right kind, and that
//! execution never runs off the end of the code.

use crate::class_file::{access, ClassFile, CodeAttribute};
use crate::constant_pool::{Constant, ConstantPool};
use crate::encoder::DecodeError;
use crate::instruction::{decode_code, Instruction};
use crate::opcode::Opcode;
use rustc_hash::FxHashMap;
use tego_jvm::parse::parse_method_descriptor;
use tego_jvm::JvmType;

/// Class verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Invalid opcode
    #[error("Invalid opcode {opcode:#x} at offset {offset}")]
    InvalidOpcode {
        /// The byte found
        opcode: u8,
        /// Where it was found
        offset: usize,
    },

    /// Stack underflow
    #[error("Stack underflow at offset {0}")]
    StackUnderflow(usize),

    /// Stack depth exceeds `max_stack`
    #[error("Stack overflow at offset {offset} (depth: {depth}, max: {max})")]
    StackOverflow {
        /// Offset of the instruction
        offset: usize,
        /// Depth after the instruction
        depth: u32,
        /// Declared `max_stack`
        max: u16,
    },

    /// Two paths reach an instruction with different stack depths
    #[error("Inconsistent stack depth at offset {offset}: {first} vs {second}")]
    InconsistentStack {
        /// Offset of the instruction
        offset: usize,
        /// Depth seen first
        first: u32,
        /// Conflicting depth
        second: u32,
    },

    /// Invalid jump target
    #[error("Invalid jump target {target} at offset {offset}")]
    InvalidJumpTarget {
        /// Computed target
        target: isize,
        /// Offset of the branch
        offset: usize,
    },

    /// Constant pool reference out of range or of the wrong kind
    #[error("Invalid constant pool reference: index {index} at offset {offset}")]
    InvalidConstantRef {
        /// Pool index
        index: u16,
        /// Offset of the instruction
        offset: usize,
    },

    /// Invalid local variable reference
    #[error("Invalid local variable reference: index {index} (max {max}) at offset {offset}")]
    InvalidLocalRef {
        /// Slot
        index: usize,
        /// Declared `max_locals`
        max: usize,
        /// Offset of the instruction
        offset: usize,
    },

    /// Execution falls off end
    #[error("Execution falls off end of method at offset {0}")]
    FallOffEnd(usize),

    /// A concrete method without a `Code` attribute, or an undecodable structure
    #[error("Malformed class: {0}")]
    MalformedClass(String),

    /// Decode error
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// An error inside a method body
    #[error("In method {method}: {source}")]
    Method {
        /// `name` followed by the descriptor
        method: String,
        /// The underlying error
        #[source]
        source: Box<VerifyError>,
    },
}

/// Parse and verify a class file
pub fn verify_class(bytes: &[u8]) -> Result<ClassFile, VerifyError> {
    let class = ClassFile::parse(bytes)?;
    verify_class_file(&class)?;
    Ok(class)
}

/// Verify every method of a parsed class
pub fn verify_class_file(class: &ClassFile) -> Result<(), VerifyError> {
    let pool = &class.constant_pool;
    if pool.class_name_at(class.this_class).is_none() {
        return Err(VerifyError::MalformedClass(
            "this_class is not a class constant".to_string(),
        ));
    }

    for method in &class.methods {
        let name = class.member_name(method).unwrap_or("?");
        let descriptor = class.member_descriptor(method).unwrap_or("?");
        let in_method = |source: VerifyError| VerifyError::Method {
            method: format!("{}{}", name, descriptor),
            source: Box::new(source),
        };

        match class.code_of(method) {
            Some(code) => {
                let code = code.map_err(|e| in_method(e.into()))?;
                verify_code(&code, pool).map_err(in_method)?;
            }
            None if method.access_flags & access::ABSTRACT != 0 => {}
            None => {
                return Err(in_method(VerifyError::MalformedClass(
                    "concrete method without Code".to_string(),
                )))
            }
        }
    }
    Ok(())
}

/// Verify one method body
pub fn verify_code(code: &CodeAttribute, pool: &ConstantPool) -> Result<(), VerifyError> {
    let instructions = decode_code(&code.code).map_err(|e| match e {
        DecodeError::InvalidOpcode { opcode, offset } => VerifyError::InvalidOpcode { opcode, offset },
        other => other.into(),
    })?;
    if instructions.is_empty() {
        return Err(VerifyError::MalformedClass("empty Code attribute".to_string()));
    }

    let index_of: FxHashMap<usize, usize> = instructions
        .iter()
        .enumerate()
        .map(|(i, instr)| (instr.offset, i))
        .collect();

    // Verify all jump targets are valid instruction boundaries
    for instr in &instructions {
        if let Some(target) = instr.branch_target() {
            if target < 0 || !index_of.contains_key(&(target as usize)) {
                return Err(VerifyError::InvalidJumpTarget {
                    target,
                    offset: instr.offset,
                });
            }
        }
    }

    verify_constant_refs(&instructions, pool)?;
    verify_local_refs(&instructions, code.max_locals)?;
    verify_stack_depth(&instructions, &index_of, code.max_stack, pool)?;

    Ok(())
}

fn verify_constant_refs(instructions: &[Instruction], pool: &ConstantPool) -> Result<(), VerifyError> {
    for instr in instructions {
        let Some(index) = instr.constant_index() else {
            continue;
        };
        let constant = pool.get(index);
        let valid = match (instr.opcode, constant) {
            (Opcode::Ldc | Opcode::LdcW, Some(c)) => c.is_loadable(),
            (Opcode::Ldc2W, Some(c)) => c.is_wide_loadable(),
            (
                Opcode::Getstatic | Opcode::Putstatic | Opcode::Getfield | Opcode::Putfield,
                Some(Constant::Fieldref { .. }),
            ) => true,
            (
                Opcode::Invokevirtual | Opcode::Invokespecial | Opcode::Invokestatic,
                Some(Constant::Methodref { .. } | Constant::InterfaceMethodref { .. }),
            ) => true,
            (Opcode::Invokeinterface, Some(Constant::InterfaceMethodref { .. })) => true,
            (Opcode::New | Opcode::Checkcast | Opcode::Instanceof, Some(Constant::Class(_))) => true,
            _ => false,
        };
        if !valid {
            return Err(VerifyError::InvalidConstantRef {
                index,
                offset: instr.offset,
            });
        }
    }
    Ok(())
}

fn verify_local_refs(instructions: &[Instruction], max_locals: u16) -> Result<(), VerifyError> {
    for instr in instructions {
        if let Some((slot, width)) = instr.local_slot() {
            if slot as usize + width as usize > max_locals as usize {
                return Err(VerifyError::InvalidLocalRef {
                    index: slot as usize,
                    max: max_locals as usize,
                    offset: instr.offset,
                });
            }
        }
    }
    Ok(())
}

/// Propagate stack depths along all paths from the method entry
fn verify_stack_depth(
    instructions: &[Instruction],
    index_of: &FxHashMap<usize, usize>,
    max_stack: u16,
    pool: &ConstantPool,
) -> Result<(), VerifyError> {
    let mut depths: Vec<Option<u32>> = vec![None; instructions.len()];
    let mut worklist = vec![(0usize, 0u32)];

    while let Some((index, depth)) = worklist.pop() {
        let instr = &instructions[index];
        match depths[index] {
            Some(seen) if seen == depth => continue,
            Some(seen) => {
                return Err(VerifyError::InconsistentStack {
                    offset: instr.offset,
                    first: seen,
                    second: depth,
                })
            }
            None => depths[index] = Some(depth),
        }

        let (pops, pushes) = stack_effect(instr, pool)
            .ok_or(VerifyError::InvalidConstantRef {
                index: instr.constant_index().unwrap_or(0),
                offset: instr.offset,
            })?;
        if pops > depth {
            return Err(VerifyError::StackUnderflow(instr.offset));
        }
        let after = depth - pops + pushes;
        if after > max_stack as u32 {
            return Err(VerifyError::StackOverflow {
                offset: instr.offset,
                depth: after,
                max: max_stack,
            });
        }

        if let Some(target) = instr.branch_target() {
            // boundaries were checked before
            if let Some(&target_index) = index_of.get(&(target as usize)) {
                worklist.push((target_index, after));
            }
        }
        if !instr.opcode.is_terminator() {
            if index + 1 >= instructions.len() {
                return Err(VerifyError::FallOffEnd(instr.offset));
            }
            worklist.push((index + 1, after));
        }
    }

    Ok(())
}

/// Slots popped and pushed by an instruction
fn stack_effect(instr: &Instruction, pool: &ConstantPool) -> Option<(u32, u32)> {
    use Opcode::*;

    let effect = match instr.opcode {
        Nop | Goto | Return | Wide => (0, 0),
        AconstNull | IconstM1 | Iconst0 | Iconst1 | Iconst2 | Iconst3 | Iconst4 | Iconst5
        | Fconst0 | Fconst1 | Fconst2 | Bipush | Sipush | Ldc | LdcW => (0, 1),
        Lconst0 | Lconst1 | Dconst0 | Dconst1 | Ldc2W => (0, 2),
        Iload | Fload | Aload | Iload0 | Iload1 | Iload2 | Iload3 | Fload0 | Fload1 | Fload2
        | Fload3 | Aload0 | Aload1 | Aload2 | Aload3 => (0, 1),
        Lload | Dload | Lload0 | Lload1 | Lload2 | Lload3 | Dload0 | Dload1 | Dload2 | Dload3 => {
            (0, 2)
        }
        Istore | Fstore | Astore | Istore0 | Istore1 | Istore2 | Istore3 | Fstore0 | Fstore1
        | Fstore2 | Fstore3 | Astore0 | Astore1 | Astore2 | Astore3 => (1, 0),
        Lstore | Dstore | Lstore0 | Lstore1 | Lstore2 | Lstore3 | Dstore0 | Dstore1 | Dstore2
        | Dstore3 => (2, 0),
        Pop => (1, 0),
        Pop2 => (2, 0),
        Dup => (1, 2),
        DupX1 => (2, 3),
        Swap => (2, 2),
        Ifeq | Ifne | Ifnull | Ifnonnull => (1, 0),
        Ireturn | Freturn | Areturn | Athrow => (1, 0),
        Lreturn | Dreturn => (2, 0),
        New => (0, 1),
        Checkcast | Instanceof => (1, 1),
        Getstatic | Putstatic | Getfield | Putfield => {
            let member = pool.member_ref_at(instr.constant_index()?)?;
            let size = JvmType::from_descriptor(member.descriptor).ok()?.slot_size() as u32;
            match instr.opcode {
                Getstatic => (0, size),
                Putstatic => (size, 0),
                Getfield => (1, size),
                _ => (1 + size, 0),
            }
        }
        Invokevirtual | Invokespecial | Invokestatic | Invokeinterface => {
            let member = pool.member_ref_at(instr.constant_index()?)?;
            let (params, result) = parse_method_descriptor(member.descriptor).ok()?;
            let mut pops: u32 = params.iter().map(|p| p.slot_size() as u32).sum();
            if instr.opcode != Invokestatic {
                pops += 1;
            }
            (pops, result.slot_size() as u32)
        }
    };
    Some(effect)
}
