//! Class and method builders
//!
//! [`ClassBuilder`] owns the constant pool and collects members.
//! [`MethodBuilder`] emits code in one pass: it allocates local slots,
//! patches forward branches when the method is finished, and tracks the
//! verifier types on the operand stack so that `max_stack` and the
//! `StackMapTable` frames come out of the emission itself.

use crate::class_file::{
    access, attr, encode_local_variable_table, Attribute, ClassFile, CodeAttribute,
    LocalVariableEntry, MemberInfo, STACK_MAP_VERSION,
};
use crate::constant_pool::ConstantPool;
use crate::encoder::ByteWriter;
use crate::error::ClassFileError;
use crate::frame::{encode_stack_map_table, Frame, VType};
use crate::opcode::Opcode;
use tego_jvm::parse::parse_method_descriptor;
use tego_jvm::{known, JvmMethodSignature, JvmObject, JvmType};
use tracing::trace;

/// Builder for a class file
pub struct ClassBuilder {
    version: u16,
    access_flags: u16,
    name: String,
    pool: ConstantPool,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<Attribute>,
}

impl ClassBuilder {
    /// Start a class with the given major version, access flags, internal name and super class
    pub fn new(
        version: u16,
        access_flags: u16,
        name: &str,
        super_name: &str,
    ) -> Result<Self, ClassFileError> {
        let mut pool = ConstantPool::new();
        let this_class = pool.class(name)?;
        let super_class = pool.class(super_name)?;
        Ok(Self {
            version,
            access_flags,
            name: name.to_string(),
            pool,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        })
    }

    /// Internal name of the class being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class-file major version
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The constant pool
    pub fn pool_mut(&mut self) -> &mut ConstantPool {
        &mut self.pool
    }

    /// Declare an implemented interface
    pub fn add_interface(&mut self, internal_name: &str) -> Result<(), ClassFileError> {
        let index = self.pool.class(internal_name)?;
        if !self.interfaces.contains(&index) {
            self.interfaces.push(index);
        }
        Ok(())
    }

    /// Attach a generic class signature
    pub fn set_signature(&mut self, signature: &str) -> Result<(), ClassFileError> {
        let attribute = self.signature_attribute(signature)?;
        self.attributes.push(attribute);
        Ok(())
    }

    fn signature_attribute(&mut self, signature: &str) -> Result<Attribute, ClassFileError> {
        let name_index = self.pool.utf8(attr::SIGNATURE)?;
        let value = self.pool.utf8(signature)?;
        Ok(Attribute {
            name_index,
            info: value.to_be_bytes().to_vec(),
        })
    }

    /// Declare a field; a generic `ty` also gets a `Signature` attribute
    pub fn add_field(
        &mut self,
        access_flags: u16,
        name: &str,
        ty: &JvmType,
    ) -> Result<(), ClassFileError> {
        let name_index = self.pool.utf8(name)?;
        let descriptor = ty.descriptor()?;
        let descriptor_index = self.pool.utf8(&descriptor)?;
        let signature = ty.signature();
        let mut attributes = Vec::new();
        if signature != descriptor {
            attributes.push(self.signature_attribute(&signature)?);
        }
        self.fields.push(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        });
        Ok(())
    }

    /// Start a method
    ///
    /// Parameters get local slots in declaration order after `this`; they are
    /// named by `parameter_names`, or `argN` where no name is given.
    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        signature: &JvmMethodSignature,
        parameter_names: &[&str],
    ) -> Result<MethodBuilder<'_>, ClassFileError> {
        MethodBuilder::new(self, access_flags, name, signature, parameter_names)
    }

    /// Assemble the class file model
    pub fn into_class_file(self) -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: self.version,
            constant_pool: self.pool,
            access_flags: self.access_flags,
            this_class: self.this_class,
            super_class: self.super_class,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            attributes: self.attributes,
        }
    }

    /// Serialize the class
    pub fn build(self) -> Vec<u8> {
        self.into_class_file().to_bytes()
    }
}

/// A branch target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

/// A local variable of the method being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Local {
    index: usize,
    slot: u16,
}

impl Local {
    /// The first slot of the variable
    pub fn slot(&self) -> u16 {
        self.slot
    }
}

#[derive(Debug)]
struct LocalVar {
    name: String,
    ty: JvmType,
    slot: u16,
    /// Offset from which the variable holds a value
    start_pc: Option<usize>,
}

#[derive(Debug, Default)]
struct LabelState {
    offset: Option<usize>,
    /// Verifier state on entry
    frame: Option<(Vec<VType>, Vec<VType>)>,
    targeted: bool,
}

#[derive(Debug)]
struct Patch {
    instruction: usize,
    operand: usize,
    label: usize,
}

/// Builder for one method body
pub struct MethodBuilder<'c> {
    class: &'c mut ClassBuilder,
    access_flags: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    code: ByteWriter,
    locals: Vec<LocalVar>,
    local_types: Vec<VType>,
    stack: Vec<VType>,
    stack_slots: u16,
    max_stack: u16,
    reachable: bool,
    labels: Vec<LabelState>,
    patches: Vec<Patch>,
    error: Option<ClassFileError>,
}

impl<'c> MethodBuilder<'c> {
    fn new(
        class: &'c mut ClassBuilder,
        access_flags: u16,
        name: &str,
        signature: &JvmMethodSignature,
        parameter_names: &[&str],
    ) -> Result<Self, ClassFileError> {
        let descriptor = signature.descriptor()?;
        let generic = signature.signature();
        let mut builder = Self {
            class,
            access_flags,
            name: name.to_string(),
            signature: (generic != descriptor).then_some(generic),
            descriptor,
            code: ByteWriter::new(),
            locals: Vec::new(),
            local_types: Vec::new(),
            stack: Vec::new(),
            stack_slots: 0,
            max_stack: 0,
            reachable: true,
            labels: Vec::new(),
            patches: Vec::new(),
            error: None,
        };

        if access_flags & access::STATIC == 0 {
            let this_type = JvmType::Object(JvmObject::new(builder.class.name.clone()));
            let this = builder.declare("this", this_type)?;
            builder.locals[this.index].start_pc = Some(0);
            if name == "<init>" {
                builder.local_types[0] = VType::UninitializedThis;
            }
        }
        for (i, param) in signature.parameters.iter().enumerate() {
            let param_name = parameter_names
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("arg{}", i));
            let local = builder.declare(&param_name, param.clone())?;
            builder.locals[local.index].start_pc = Some(0);
        }
        Ok(builder)
    }

    /// Name of the method being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current code offset
    pub fn offset(&self) -> usize {
        self.code.offset()
    }

    /// Maximum stack depth seen so far, in slots
    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    /// Number of local slots allocated so far
    pub fn max_locals(&self) -> u16 {
        self.local_types.len() as u16
    }

    /// Whether the next instruction can be reached
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// The internal name of the class this method belongs to
    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    // ===== Locals =====

    fn declare(&mut self, name: &str, ty: JvmType) -> Result<Local, ClassFileError> {
        let slot = self.local_types.len();
        let width = ty.slot_size().max(1) as usize;
        if slot + width > u16::MAX as usize {
            return Err(ClassFileError::LocalIndexOverflow {
                method: self.name.clone(),
            });
        }
        self.local_types.push(VType::of(&ty));
        if width == 2 {
            self.local_types.push(VType::Top);
        }
        let index = self.locals.len();
        self.locals.push(LocalVar {
            name: name.to_string(),
            ty,
            slot: slot as u16,
            start_pc: None,
        });
        Ok(Local {
            index,
            slot: slot as u16,
        })
    }

    /// Allocate a new named local
    ///
    /// The slot holds no value until the first [`store`](Self::store).
    pub fn new_local(&mut self, name: &str, ty: &JvmType) -> Result<Local, ClassFileError> {
        let local = self.declare(name, ty.clone())?;
        self.local_types[local.slot as usize] = VType::Top;
        Ok(local)
    }

    /// The `this` local of an instance method
    pub fn this(&self) -> Option<Local> {
        if self.access_flags & access::STATIC != 0 {
            return None;
        }
        Some(Local { index: 0, slot: 0 })
    }

    /// The local holding parameter `i`
    pub fn parameter(&self, i: usize) -> Option<Local> {
        let offset = usize::from(self.access_flags & access::STATIC == 0);
        let var = self.locals.get(offset + i)?;
        var.start_pc?;
        Some(Local {
            index: offset + i,
            slot: var.slot,
        })
    }

    /// Declared type of a local
    pub fn local_type(&self, local: Local) -> &JvmType {
        &self.locals[local.index].ty
    }

    // ===== Stack Tracking =====

    fn push(&mut self, ty: VType) {
        self.stack_slots += ty.size();
        self.max_stack = self.max_stack.max(self.stack_slots);
        self.stack.push(ty);
    }

    fn pop(&mut self) -> VType {
        match self.stack.pop() {
            Some(ty) => {
                self.stack_slots -= ty.size();
                ty
            }
            None => {
                if self.error.is_none() {
                    self.error = Some(ClassFileError::StackUnderflow {
                        method: self.name.clone(),
                        offset: self.code.offset(),
                    });
                }
                VType::Top
            }
        }
    }

    fn op(&mut self, opcode: Opcode) {
        self.code.emit_u8(opcode.to_u8());
    }

    fn terminate(&mut self) {
        self.reachable = false;
        self.stack.clear();
        self.stack_slots = 0;
    }

    // ===== Constants =====

    /// Push `null`
    pub fn aconst_null(&mut self) {
        self.op(Opcode::AconstNull);
        self.push(VType::Null);
    }

    /// Push an `int` using the shortest encoding
    pub fn iconst(&mut self, value: i32) -> Result<(), ClassFileError> {
        match value {
            -1..=5 => self.code.emit_u8((Opcode::Iconst0.to_u8() as i32 + value) as u8),
            -128..=127 => {
                self.op(Opcode::Bipush);
                self.code.emit_i8(value as i8);
            }
            -32768..=32767 => {
                self.op(Opcode::Sipush);
                self.code.emit_i16(value as i16);
            }
            _ => {
                let index = self.class.pool.integer(value)?;
                self.ldc_index(index);
            }
        }
        self.push(VType::Integer);
        Ok(())
    }

    /// Push a `long`
    pub fn lconst(&mut self, value: i64) -> Result<(), ClassFileError> {
        match value {
            0 => self.op(Opcode::Lconst0),
            1 => self.op(Opcode::Lconst1),
            _ => {
                let index = self.class.pool.long(value)?;
                self.op(Opcode::Ldc2W);
                self.code.emit_u16(index);
            }
        }
        self.push(VType::Long);
        Ok(())
    }

    /// Push a `float`
    pub fn fconst(&mut self, value: f32) -> Result<(), ClassFileError> {
        if value.to_bits() == 0.0f32.to_bits() {
            self.op(Opcode::Fconst0);
        } else if value == 1.0 {
            self.op(Opcode::Fconst1);
        } else if value == 2.0 {
            self.op(Opcode::Fconst2);
        } else {
            let index = self.class.pool.float(value)?;
            self.ldc_index(index);
        }
        self.push(VType::Float);
        Ok(())
    }

    /// Push a `double`
    pub fn dconst(&mut self, value: f64) -> Result<(), ClassFileError> {
        if value.to_bits() == 0.0f64.to_bits() {
            self.op(Opcode::Dconst0);
        } else if value == 1.0 {
            self.op(Opcode::Dconst1);
        } else {
            let index = self.class.pool.double(value)?;
            self.op(Opcode::Ldc2W);
            self.code.emit_u16(index);
        }
        self.push(VType::Double);
        Ok(())
    }

    /// Push a string literal
    pub fn ldc_string(&mut self, value: &str) -> Result<(), ClassFileError> {
        let index = self.class.pool.string(value)?;
        self.ldc_index(index);
        self.push(VType::Object("java/lang/String".to_string()));
        Ok(())
    }

    /// Push a `java.lang.Class` literal
    pub fn ldc_class(&mut self, internal_name: &str) -> Result<(), ClassFileError> {
        let index = self.class.pool.class(internal_name)?;
        self.ldc_index(index);
        self.push(VType::Object("java/lang/Class".to_string()));
        Ok(())
    }

    fn ldc_index(&mut self, index: u16) {
        if index <= u8::MAX as u16 {
            self.op(Opcode::Ldc);
            self.code.emit_u8(index as u8);
        } else {
            self.op(Opcode::LdcW);
            self.code.emit_u16(index);
        }
    }

    // ===== Loads and Stores =====

    /// Push the value of a local
    pub fn load(&mut self, local: Local) {
        let var = &self.locals[local.index];
        let family = LocalFamily::of(&var.ty);
        let ty = match &self.local_types[local.slot as usize] {
            VType::Top => VType::of(&var.ty),
            current => current.clone(),
        };
        self.emit_local_op(family.load_ops(), local.slot);
        self.push(ty);
    }

    /// Pop the top of the stack into a local
    pub fn store(&mut self, local: Local) {
        let var = &self.locals[local.index];
        let family = LocalFamily::of(&var.ty);
        let ty = VType::of(&var.ty);
        self.pop();
        self.emit_local_op(family.store_ops(), local.slot);
        let offset = self.code.offset();
        let var = &mut self.locals[local.index];
        if var.start_pc.is_none() {
            var.start_pc = Some(offset);
        }
        self.local_types[local.slot as usize] = ty;
    }

    /// Push `this`
    pub fn load_this(&mut self) {
        if let Some(this) = self.this() {
            self.load(this);
        }
    }

    fn emit_local_op(&mut self, (short, explicit): (Opcode, Opcode), slot: u16) {
        match slot {
            0..=3 => self.code.emit_u8(short.to_u8() + slot as u8),
            4..=255 => {
                self.op(explicit);
                self.code.emit_u8(slot as u8);
            }
            _ => {
                self.op(Opcode::Wide);
                self.op(explicit);
                self.code.emit_u16(slot);
            }
        }
    }

    // ===== Stack =====

    /// Discard the top value, one or two slots wide
    pub fn pop_value(&mut self) {
        let ty = self.pop();
        self.op(if ty.size() == 2 { Opcode::Pop2 } else { Opcode::Pop });
    }

    /// Duplicate the top one-slot value
    pub fn dup(&mut self) {
        self.op(Opcode::Dup);
        let ty = self.pop();
        self.push(ty.clone());
        self.push(ty);
    }

    /// Swap the top two one-slot values
    pub fn swap(&mut self) {
        self.op(Opcode::Swap);
        let a = self.pop();
        let b = self.pop();
        self.push(a);
        self.push(b);
    }

    // ===== Objects =====

    /// Allocate an uninitialized instance
    pub fn new_object(&mut self, internal_name: &str) -> Result<(), ClassFileError> {
        let offset = self.code.offset() as u16;
        let index = self.class.pool.class(internal_name)?;
        self.op(Opcode::New);
        self.code.emit_u16(index);
        self.push(VType::Uninitialized(offset));
        Ok(())
    }

    /// Cast the top reference to `ty`
    ///
    /// Casting to `java/lang/Object` (including erased type variables) emits nothing.
    pub fn checkcast(&mut self, ty: &JvmType) -> Result<(), ClassFileError> {
        let target = VType::of(ty);
        let VType::Object(name) = &target else {
            return Err(tego_jvm::TypeError::NotAnObject {
                actual: ty.to_string(),
            }
            .into());
        };
        if name == "java/lang/Object" {
            return Ok(());
        }
        let index = self.class.pool.class(name)?;
        self.op(Opcode::Checkcast);
        self.code.emit_u16(index);
        self.pop();
        self.push(target);
        Ok(())
    }

    /// Throw the exception on top of the stack
    pub fn athrow(&mut self) {
        self.op(Opcode::Athrow);
        self.pop();
        self.terminate();
    }

    // ===== Fields =====

    /// Push a static field
    pub fn getstatic(&mut self, owner: &str, name: &str, ty: &JvmType) -> Result<(), ClassFileError> {
        let index = self.class.pool.field_ref(owner, name, &ty.descriptor()?)?;
        self.op(Opcode::Getstatic);
        self.code.emit_u16(index);
        self.push(VType::of(ty));
        Ok(())
    }

    /// Pop into a static field
    pub fn putstatic(&mut self, owner: &str, name: &str, ty: &JvmType) -> Result<(), ClassFileError> {
        let index = self.class.pool.field_ref(owner, name, &ty.descriptor()?)?;
        self.op(Opcode::Putstatic);
        self.code.emit_u16(index);
        self.pop();
        Ok(())
    }

    // ===== Invocation =====

    /// Call a class method through virtual dispatch
    pub fn invokevirtual(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<(), ClassFileError> {
        self.invoke(Opcode::Invokevirtual, owner, name, descriptor)
    }

    /// Call a constructor, private method or super method
    pub fn invokespecial(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<(), ClassFileError> {
        self.invoke(Opcode::Invokespecial, owner, name, descriptor)
    }

    /// Call a static method
    pub fn invokestatic(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<(), ClassFileError> {
        self.invoke(Opcode::Invokestatic, owner, name, descriptor)
    }

    /// Call an interface method
    pub fn invokeinterface(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<(), ClassFileError> {
        self.invoke(Opcode::Invokeinterface, owner, name, descriptor)
    }

    fn invoke(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<(), ClassFileError> {
        let (params, result) = parse_method_descriptor(descriptor)?;
        let index = if opcode == Opcode::Invokeinterface {
            self.class.pool.interface_method_ref(owner, name, descriptor)?
        } else {
            self.class.pool.method_ref(owner, name, descriptor)?
        };
        self.op(opcode);
        self.code.emit_u16(index);
        if opcode == Opcode::Invokeinterface {
            let arg_slots: u16 = 1 + params.iter().map(JvmType::slot_size).sum::<u16>();
            self.code.emit_u8(arg_slots as u8);
            self.code.emit_u8(0);
        }

        for _ in &params {
            self.pop();
        }
        if opcode != Opcode::Invokestatic {
            let receiver = self.pop();
            if opcode == Opcode::Invokespecial && name == "<init>" {
                let initialized = match receiver {
                    VType::UninitializedThis => VType::Object(self.class.name.clone()),
                    _ => VType::Object(owner.to_string()),
                };
                self.initialize(&receiver, initialized);
            }
        }
        if result != JvmType::Void {
            self.push(VType::of(&result));
        }
        Ok(())
    }

    /// Replace every occurrence of an uninitialized type once its constructor ran
    fn initialize(&mut self, uninitialized: &VType, initialized: VType) {
        for ty in self.stack.iter_mut().chain(self.local_types.iter_mut()) {
            if ty == uninitialized {
                *ty = initialized.clone();
            }
        }
    }

    // ===== Boxing =====

    /// Box the primitive on top of the stack; references are left alone
    pub fn box_value(&mut self, ty: &JvmType) -> Result<(), ClassFileError> {
        let Some(wrapper) = known::boxed(ty) else {
            return Ok(());
        };
        let owner = wrapper.internal_name()?;
        let descriptor = format!("({}){}", ty.descriptor()?, wrapper.descriptor()?);
        self.invokestatic(&owner, "valueOf", &descriptor)
    }

    /// Unbox the reference on top of the stack into primitive `ty`
    ///
    /// For a reference `ty` this is a plain [`checkcast`](Self::checkcast).
    pub fn unbox_value(&mut self, ty: &JvmType) -> Result<(), ClassFileError> {
        let (Some(wrapper), Some(method)) = (known::boxed(ty), known::unbox_method(ty)) else {
            return self.checkcast(ty);
        };
        self.checkcast(&wrapper)?;
        let owner = wrapper.internal_name()?;
        let descriptor = format!("(){}", ty.descriptor()?);
        self.invokevirtual(&owner, method, &descriptor)
    }

    // ===== Control Flow =====

    /// Create a label to be bound later
    pub fn new_label(&mut self) -> Label {
        self.labels.push(LabelState::default());
        Label(self.labels.len() - 1)
    }

    fn snapshot(&self) -> (Vec<VType>, Vec<VType>) {
        (self.local_types.clone(), self.stack.clone())
    }

    /// Bind a label to the current offset
    ///
    /// After binding, the verifier state is the one recorded by the first
    /// branch to the label, or the fall-through state if nothing branched yet.
    pub fn bind(&mut self, label: Label) {
        let offset = self.code.offset();
        let snapshot = self.snapshot();
        let state = &mut self.labels[label.0];
        if state.offset.is_some() {
            if self.error.is_none() {
                self.error = Some(ClassFileError::LabelRebound {
                    label: label.0,
                    method: self.name.clone(),
                });
            }
            return;
        }
        state.offset = Some(offset);
        let (mut locals, stack) = state.frame.get_or_insert(snapshot).clone();
        locals.resize(self.local_types.len(), VType::Top);
        self.local_types = locals;
        self.stack_slots = stack.iter().map(VType::size).sum();
        self.stack = stack;
        self.reachable = true;
    }

    fn branch(&mut self, opcode: Opcode, label: Label) {
        let instruction = self.code.offset();
        self.op(opcode);
        let operand = self.code.reserve_u16();
        self.patches.push(Patch {
            instruction,
            operand,
            label: label.0,
        });
        let snapshot = self.snapshot();
        let state = &mut self.labels[label.0];
        state.targeted = true;
        if state.frame.is_none() {
            state.frame = Some(snapshot);
        }
    }

    /// Jump to `label`
    pub fn goto(&mut self, label: Label) {
        self.branch(Opcode::Goto, label);
        self.terminate();
    }

    /// Pop a reference and jump to `label` if it is null
    pub fn ifnull(&mut self, label: Label) {
        self.pop();
        self.branch(Opcode::Ifnull, label);
    }

    /// Pop a reference and jump to `label` if it is not null
    pub fn ifnonnull(&mut self, label: Label) {
        self.pop();
        self.branch(Opcode::Ifnonnull, label);
    }

    /// Return the top of the stack, or nothing for `void`
    pub fn return_value(&mut self, ty: &JvmType) {
        let opcode = match LocalFamily::of(ty) {
            _ if *ty == JvmType::Void => Opcode::Return,
            LocalFamily::Int => Opcode::Ireturn,
            LocalFamily::Long => Opcode::Lreturn,
            LocalFamily::Float => Opcode::Freturn,
            LocalFamily::Double => Opcode::Dreturn,
            LocalFamily::Reference => Opcode::Areturn,
        };
        if opcode != Opcode::Return {
            self.pop();
        }
        self.op(opcode);
        self.terminate();
    }

    // ===== Finishing =====

    /// Resolve branches, compute frames and add the method to the class
    pub fn finish(mut self) -> Result<(), ClassFileError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        for patch in &self.patches {
            let target = self.labels[patch.label].offset.ok_or_else(|| {
                ClassFileError::UnboundLabel {
                    label: patch.label,
                    method: self.name.clone(),
                }
            })?;
            let relative = target as i64 - patch.instruction as i64;
            let relative = i16::try_from(relative).map_err(|_| ClassFileError::BranchOutOfRange {
                offset: patch.instruction,
                target,
            })?;
            self.code.patch_i16(patch.operand, relative);
        }

        let code_len = self.code.offset();
        if code_len == 0 || code_len > u16::MAX as usize {
            return Err(ClassFileError::CodeTooLarge {
                method: self.name.clone(),
                size: code_len,
            });
        }

        let mut code_attributes = Vec::new();

        let mut entries = Vec::new();
        for var in &self.locals {
            let Some(start) = var.start_pc.filter(|&s| s < code_len) else {
                continue;
            };
            entries.push(LocalVariableEntry {
                start_pc: start as u16,
                length: (code_len - start) as u16,
                name_index: self.class.pool.utf8(&var.name)?,
                descriptor_index: self.class.pool.utf8(&var.ty.descriptor()?)?,
                index: var.slot,
            });
        }
        if !entries.is_empty() {
            code_attributes.push(Attribute {
                name_index: self.class.pool.utf8(attr::LOCAL_VARIABLE_TABLE)?,
                info: encode_local_variable_table(&entries),
            });
        }

        if self.class.version >= STACK_MAP_VERSION {
            let mut frames: Vec<Frame> = self
                .labels
                .iter()
                .filter(|state| state.targeted)
                .filter_map(|state| {
                    let offset = state.offset?;
                    let (locals, stack) = state.frame.clone()?;
                    Some(Frame {
                        offset: offset as u16,
                        locals,
                        stack,
                    })
                })
                .collect();
            frames.sort_by_key(|frame| frame.offset);
            frames.dedup_by_key(|frame| frame.offset);
            if !frames.is_empty() {
                let info = encode_stack_map_table(&frames, &mut self.class.pool)?;
                code_attributes.push(Attribute {
                    name_index: self.class.pool.utf8(attr::STACK_MAP_TABLE)?,
                    info,
                });
            }
        }

        let max_locals = self.local_types.len() as u16;
        let code = CodeAttribute {
            max_stack: self.max_stack,
            max_locals,
            code: std::mem::take(&mut self.code).into_bytes(),
            exception_table: Vec::new(),
            attributes: code_attributes,
        };

        let mut attributes = vec![Attribute {
            name_index: self.class.pool.utf8(attr::CODE)?,
            info: code.encode(),
        }];
        if let Some(signature) = &self.signature {
            attributes.push(self.class.signature_attribute(signature)?);
        }

        let name_index = self.class.pool.utf8(&self.name)?;
        let descriptor_index = self.class.pool.utf8(&self.descriptor)?;
        self.class.methods.push(MemberInfo {
            access_flags: self.access_flags,
            name_index,
            descriptor_index,
            attributes,
        });

        trace!(
            class = %self.class.name,
            method = %self.name,
            code_len,
            max_stack = self.max_stack,
            max_locals,
            "method assembled"
        );
        Ok(())
    }
}

/// Which family of load/store/return opcodes a type uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalFamily {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl LocalFamily {
    fn of(ty: &JvmType) -> Self {
        match ty {
            JvmType::Boolean | JvmType::Char | JvmType::Byte | JvmType::Short | JvmType::Int => {
                LocalFamily::Int
            }
            JvmType::Long => LocalFamily::Long,
            JvmType::Float => LocalFamily::Float,
            JvmType::Double => LocalFamily::Double,
            _ => LocalFamily::Reference,
        }
    }

    /// The `_0` short form and the explicit-slot form
    fn load_ops(self) -> (Opcode, Opcode) {
        match self {
            LocalFamily::Int => (Opcode::Iload0, Opcode::Iload),
            LocalFamily::Long => (Opcode::Lload0, Opcode::Lload),
            LocalFamily::Float => (Opcode::Fload0, Opcode::Fload),
            LocalFamily::Double => (Opcode::Dload0, Opcode::Dload),
            LocalFamily::Reference => (Opcode::Aload0, Opcode::Aload),
        }
    }

    fn store_ops(self) -> (Opcode, Opcode) {
        match self {
            LocalFamily::Int => (Opcode::Istore0, Opcode::Istore),
            LocalFamily::Long => (Opcode::Lstore0, Opcode::Lstore),
            LocalFamily::Float => (Opcode::Fstore0, Opcode::Fstore),
            LocalFamily::Double => (Opcode::Dstore0, Opcode::Dstore),
            LocalFamily::Reference => (Opcode::Astore0, Opcode::Astore),
        }
    }
}
