//! JVM opcodes
//!
//! Only the instructions the compiler emits are modelled. Anything else is
//! rejected by [`Opcode::from_u8`], which makes the verifier strict about
//! what can appear in generated code.

macro_rules! opcodes {
    ($($(#[$doc:meta])* $variant:ident = $byte:literal => $name:literal,)*) => {
        /// Bytecode opcode enumeration
        ///
        /// Discriminants are the opcode bytes of the JVM instruction set.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($(#[$doc])* $variant = $byte,)*
        }

        impl Opcode {
            /// Convert byte to opcode
            ///
            /// Returns None if the byte is not an opcode of the supported subset.
            pub fn from_u8(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The mnemonic used in disassembly listings
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

opcodes! {
    // ===== Constants (0x00-0x14) =====
    /// Do nothing
    Nop = 0x00 => "nop",
    /// Push `null`
    AconstNull = 0x01 => "aconst_null",
    /// Push int -1
    IconstM1 = 0x02 => "iconst_m1",
    /// Push int 0
    Iconst0 = 0x03 => "iconst_0",
    /// Push int 1
    Iconst1 = 0x04 => "iconst_1",
    /// Push int 2
    Iconst2 = 0x05 => "iconst_2",
    /// Push int 3
    Iconst3 = 0x06 => "iconst_3",
    /// Push int 4
    Iconst4 = 0x07 => "iconst_4",
    /// Push int 5
    Iconst5 = 0x08 => "iconst_5",
    /// Push long 0
    Lconst0 = 0x09 => "lconst_0",
    /// Push long 1
    Lconst1 = 0x0a => "lconst_1",
    /// Push float 0
    Fconst0 = 0x0b => "fconst_0",
    /// Push float 1
    Fconst1 = 0x0c => "fconst_1",
    /// Push float 2
    Fconst2 = 0x0d => "fconst_2",
    /// Push double 0
    Dconst0 = 0x0e => "dconst_0",
    /// Push double 1
    Dconst1 = 0x0f => "dconst_1",
    /// Push a sign-extended byte (operand: i8)
    Bipush = 0x10 => "bipush",
    /// Push a sign-extended short (operand: i16)
    Sipush = 0x11 => "sipush",
    /// Push a constant (operand: u8 pool index)
    Ldc = 0x12 => "ldc",
    /// Push a constant (operand: u16 pool index)
    LdcW = 0x13 => "ldc_w",
    /// Push a long or double constant (operand: u16 pool index)
    Ldc2W = 0x14 => "ldc2_w",

    // ===== Loads (0x15-0x2D) =====
    /// Load int local (operand: u8 slot)
    Iload = 0x15 => "iload",
    /// Load long local (operand: u8 slot)
    Lload = 0x16 => "lload",
    /// Load float local (operand: u8 slot)
    Fload = 0x17 => "fload",
    /// Load double local (operand: u8 slot)
    Dload = 0x18 => "dload",
    /// Load reference local (operand: u8 slot)
    Aload = 0x19 => "aload",
    /// Load int local 0
    Iload0 = 0x1a => "iload_0",
    /// Load int local 1
    Iload1 = 0x1b => "iload_1",
    /// Load int local 2
    Iload2 = 0x1c => "iload_2",
    /// Load int local 3
    Iload3 = 0x1d => "iload_3",
    /// Load long local 0
    Lload0 = 0x1e => "lload_0",
    /// Load long local 1
    Lload1 = 0x1f => "lload_1",
    /// Load long local 2
    Lload2 = 0x20 => "lload_2",
    /// Load long local 3
    Lload3 = 0x21 => "lload_3",
    /// Load float local 0
    Fload0 = 0x22 => "fload_0",
    /// Load float local 1
    Fload1 = 0x23 => "fload_1",
    /// Load float local 2
    Fload2 = 0x24 => "fload_2",
    /// Load float local 3
    Fload3 = 0x25 => "fload_3",
    /// Load double local 0
    Dload0 = 0x26 => "dload_0",
    /// Load double local 1
    Dload1 = 0x27 => "dload_1",
    /// Load double local 2
    Dload2 = 0x28 => "dload_2",
    /// Load double local 3
    Dload3 = 0x29 => "dload_3",
    /// Load reference local 0
    Aload0 = 0x2a => "aload_0",
    /// Load reference local 1
    Aload1 = 0x2b => "aload_1",
    /// Load reference local 2
    Aload2 = 0x2c => "aload_2",
    /// Load reference local 3
    Aload3 = 0x2d => "aload_3",

    // ===== Stores (0x36-0x4E) =====
    /// Store int local (operand: u8 slot)
    Istore = 0x36 => "istore",
    /// Store long local (operand: u8 slot)
    Lstore = 0x37 => "lstore",
    /// Store float local (operand: u8 slot)
    Fstore = 0x38 => "fstore",
    /// Store double local (operand: u8 slot)
    Dstore = 0x39 => "dstore",
    /// Store reference local (operand: u8 slot)
    Astore = 0x3a => "astore",
    /// Store int local 0
    Istore0 = 0x3b => "istore_0",
    /// Store int local 1
    Istore1 = 0x3c => "istore_1",
    /// Store int local 2
    Istore2 = 0x3d => "istore_2",
    /// Store int local 3
    Istore3 = 0x3e => "istore_3",
    /// Store long local 0
    Lstore0 = 0x3f => "lstore_0",
    /// Store long local 1
    Lstore1 = 0x40 => "lstore_1",
    /// Store long local 2
    Lstore2 = 0x41 => "lstore_2",
    /// Store long local 3
    Lstore3 = 0x42 => "lstore_3",
    /// Store float local 0
    Fstore0 = 0x43 => "fstore_0",
    /// Store float local 1
    Fstore1 = 0x44 => "fstore_1",
    /// Store float local 2
    Fstore2 = 0x45 => "fstore_2",
    /// Store float local 3
    Fstore3 = 0x46 => "fstore_3",
    /// Store double local 0
    Dstore0 = 0x47 => "dstore_0",
    /// Store double local 1
    Dstore1 = 0x48 => "dstore_1",
    /// Store double local 2
    Dstore2 = 0x49 => "dstore_2",
    /// Store double local 3
    Dstore3 = 0x4a => "dstore_3",
    /// Store reference local 0
    Astore0 = 0x4b => "astore_0",
    /// Store reference local 1
    Astore1 = 0x4c => "astore_1",
    /// Store reference local 2
    Astore2 = 0x4d => "astore_2",
    /// Store reference local 3
    Astore3 = 0x4e => "astore_3",

    // ===== Stack (0x57-0x5F) =====
    /// Pop a one-slot value
    Pop = 0x57 => "pop",
    /// Pop two slots
    Pop2 = 0x58 => "pop2",
    /// Duplicate the top one-slot value
    Dup = 0x59 => "dup",
    /// Duplicate the top value below the second
    DupX1 = 0x5a => "dup_x1",
    /// Swap the top two one-slot values
    Swap = 0x5f => "swap",

    // ===== Control flow (0x99-0xB1) =====
    /// Branch if int is zero (operand: i16 offset)
    Ifeq = 0x99 => "ifeq",
    /// Branch if int is non-zero (operand: i16 offset)
    Ifne = 0x9a => "ifne",
    /// Unconditional branch (operand: i16 offset)
    Goto = 0xa7 => "goto",
    /// Return int
    Ireturn = 0xac => "ireturn",
    /// Return long
    Lreturn = 0xad => "lreturn",
    /// Return float
    Freturn = 0xae => "freturn",
    /// Return double
    Dreturn = 0xaf => "dreturn",
    /// Return reference
    Areturn = 0xb0 => "areturn",
    /// Return void
    Return = 0xb1 => "return",

    // ===== Fields and invocation (0xB2-0xB9) =====
    /// Read static field (operand: u16 Fieldref)
    Getstatic = 0xb2 => "getstatic",
    /// Write static field (operand: u16 Fieldref)
    Putstatic = 0xb3 => "putstatic",
    /// Read instance field (operand: u16 Fieldref)
    Getfield = 0xb4 => "getfield",
    /// Write instance field (operand: u16 Fieldref)
    Putfield = 0xb5 => "putfield",
    /// Virtual call (operand: u16 Methodref)
    Invokevirtual = 0xb6 => "invokevirtual",
    /// Constructor, private or super call (operand: u16 Methodref)
    Invokespecial = 0xb7 => "invokespecial",
    /// Static call (operand: u16 Methodref)
    Invokestatic = 0xb8 => "invokestatic",
    /// Interface call (operands: u16 InterfaceMethodref, u8 count, u8 zero)
    Invokeinterface = 0xb9 => "invokeinterface",

    // ===== Objects (0xBB-0xC7) =====
    /// Allocate an uninitialized object (operand: u16 Class)
    New = 0xbb => "new",
    /// Throw the exception on top of the stack
    Athrow = 0xbf => "athrow",
    /// Check a reference against a class (operand: u16 Class)
    Checkcast = 0xc0 => "checkcast",
    /// Test a reference against a class (operand: u16 Class)
    Instanceof = 0xc1 => "instanceof",
    /// Widen the local index of the following load or store
    Wide = 0xc4 => "wide",
    /// Branch if reference is null (operand: i16 offset)
    Ifnull = 0xc6 => "ifnull",
    /// Branch if reference is not null (operand: i16 offset)
    Ifnonnull = 0xc7 => "ifnonnull",
}

impl Opcode {
    /// Convert opcode to byte
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode
    ///
    /// For [`Opcode::Wide`] this is the size of the widened load or store:
    /// the inner opcode byte plus a u16 slot.
    pub fn operand_size(self) -> usize {
        match self {
            Self::Bipush | Self::Ldc => 1,
            Self::Iload | Self::Lload | Self::Fload | Self::Dload | Self::Aload => 1,
            Self::Istore | Self::Lstore | Self::Fstore | Self::Dstore | Self::Astore => 1,
            Self::Sipush | Self::LdcW | Self::Ldc2W => 2,
            Self::Ifeq | Self::Ifne | Self::Goto | Self::Ifnull | Self::Ifnonnull => 2,
            Self::Getstatic | Self::Putstatic | Self::Getfield | Self::Putfield => 2,
            Self::Invokevirtual | Self::Invokespecial | Self::Invokestatic => 2,
            Self::New | Self::Checkcast | Self::Instanceof => 2,
            Self::Invokeinterface => 4,
            Self::Wide => 3,
            _ => 0,
        }
    }

    /// Check if this opcode is a branch with an i16 offset
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Ifeq | Self::Ifne | Self::Goto | Self::Ifnull | Self::Ifnonnull
        )
    }

    /// Check if this opcode is a return instruction
    pub fn is_return(self) -> bool {
        matches!(
            self,
            Self::Ireturn
                | Self::Lreturn
                | Self::Freturn
                | Self::Dreturn
                | Self::Areturn
                | Self::Return
        )
    }

    /// Check if control never falls through to the next instruction
    pub fn is_terminator(self) -> bool {
        self.is_return() || matches!(self, Self::Goto | Self::Athrow)
    }

    /// Check if this opcode invokes a method
    pub fn is_invoke(self) -> bool {
        matches!(
            self,
            Self::Invokevirtual | Self::Invokespecial | Self::Invokestatic | Self::Invokeinterface
        )
    }

    /// Check if this opcode loads or stores a local variable by explicit slot
    pub fn is_local_access(self) -> bool {
        matches!(
            self,
            Self::Iload
                | Self::Lload
                | Self::Fload
                | Self::Dload
                | Self::Aload
                | Self::Istore
                | Self::Lstore
                | Self::Fstore
                | Self::Dstore
                | Self::Astore
        )
    }

    /// The local slot and slot width addressed by a short-form load or store
    ///
    /// Returns `(slot, width)` for `iload_0` through `astore_3`.
    pub fn implicit_local(self) -> Option<(u16, u16)> {
        let byte = self.to_u8();
        let (base, width) = match byte {
            0x1a..=0x1d => (0x1a, 1),
            0x1e..=0x21 => (0x1e, 2),
            0x22..=0x25 => (0x22, 1),
            0x26..=0x29 => (0x26, 2),
            0x2a..=0x2d => (0x2a, 1),
            0x3b..=0x3e => (0x3b, 1),
            0x3f..=0x42 => (0x3f, 2),
            0x43..=0x46 => (0x43, 1),
            0x47..=0x4a => (0x47, 2),
            0x4b..=0x4e => (0x4b, 1),
            _ => return None,
        };
        Some(((byte - base) as u16, width))
    }
}
