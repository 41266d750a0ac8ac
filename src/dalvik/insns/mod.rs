//! Dalvik executable instruction set.
//!
//! One static row per opcode: mnemonic, instruction format, operand syntax
//! and a short description, mirroring the upstream bytecode and
//! instruction-format tables. The table is the authoritative source for
//! instruction lengths; it never depends on a parsed Dex.

pub mod format;
pub use format::*;

pub mod payload;
pub use payload::*;

/// Row of the instruction table.
pub struct InsnDescriptor {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub format: FormatKind,
    /// Operand syntax with placeholder letters, mnemonic excluded.
    pub syntax: &'static str,
    pub desc: &'static str,
}

impl InsnDescriptor {
    #[inline(always)]
    pub fn of(opcode: u8) -> &'static InsnDescriptor {
        &OPCODES[opcode as usize]
    }

    #[inline(always)]
    pub fn fmt(&self) -> &'static FormatSpec {
        self.format.spec()
    }

    /// Instruction length in bytes.
    #[inline(always)]
    pub fn size_in_bytes(&self) -> usize {
        self.fmt().insn_len as usize * 2
    }
}

macro_rules! insn {
    ($op:literal, $name:literal, $fmt:ident, $syntax:literal, $desc:literal) => {
        InsnDescriptor {
            opcode: $op,
            mnemonic: $name,
            format: FormatKind::$fmt,
            syntax: $syntax,
            desc: $desc,
        }
    };
    // Unused opcodes keep a 1-unit 10x row so linear walks stay in sync.
    ($op:literal, $name:literal) => {
        InsnDescriptor {
            opcode: $op,
            mnemonic: $name,
            format: FormatKind::k10x,
            syntax: "",
            desc: "(unused)",
        }
    };
}

#[rustfmt::skip]
pub static OPCODES: [InsnDescriptor; 256] = [
    insn! { 0x00, "nop", k10x, "", "Waste cycles." },
    // move ops
    insn! { 0x01, "move", k12x, "vA, vB", "Move the contents of one non-object register to another." },
    insn! { 0x02, "move/from16", k22x, "vAA, vBBBB", "Move the contents of one non-object register to another." },
    insn! { 0x03, "move/16", k32x, "vAAAA, vBBBB", "Move the contents of one non-object register to another." },
    insn! { 0x04, "move-wide", k12x, "vA, vB", "Move the contents of one register-pair to another." },
    insn! { 0x05, "move-wide/from16", k22x, "vAA, vBBBB", "Move the contents of one register-pair to another." },
    insn! { 0x06, "move-wide/16", k32x, "vAAAA, vBBBB", "Move the contents of one register-pair to another." },
    insn! { 0x07, "move-object", k12x, "vA, vB", "Move the contents of one object-bearing register to another." },
    insn! { 0x08, "move-object/from16", k22x, "vAA, vBBBB", "Move the contents of one object-bearing register to another." },
    insn! { 0x09, "move-object/16", k32x, "vAAAA, vBBBB", "Move the contents of one object-bearing register to another." },
    insn! { 0x0a, "move-result", k11x, "vAA", "Move the single-word result of the most recent invoke." },
    insn! { 0x0b, "move-result-wide", k11x, "vAA", "Move the double-word result of the most recent invoke." },
    insn! { 0x0c, "move-result-object", k11x, "vAA", "Move the object result of the most recent invoke." },
    insn! { 0x0d, "move-exception", k11x, "vAA", "Save a just-caught exception into the given register." },
    // return ops
    insn! { 0x0e, "return-void", k10x, "", "Return from a void method." },
    insn! { 0x0f, "return", k11x, "vAA", "Return from a single-width (32-bit) non-object value-returning method." },
    insn! { 0x10, "return-wide", k11x, "vAA", "Return from a double-width (64-bit) value-returning method." },
    insn! { 0x11, "return-object", k11x, "vAA", "Return from an object-returning method." },
    // const ops
    insn! { 0x12, "const/4", k11n, "vA, #+B", "Move the given literal value (sign-extended) into the specified register." },
    insn! { 0x13, "const/16", k21s, "vAA, #+BBBB", "Move the given literal value (sign-extended) into the specified register." },
    insn! { 0x14, "const", k31i, "vAA, #+BBBBBBBB", "Move the given literal value into the specified register." },
    insn! { 0x15, "const/high16", k21h, "vAA, #+BBBB0000", "Move the given literal value (right-zero-extended) into the specified register." },
    insn! { 0x16, "const-wide/16", k21s, "vAA, #+BBBB", "Move the given literal value (sign-extended) into the specified register-pair." },
    insn! { 0x17, "const-wide/32", k31i, "vAA, #+BBBBBBBB", "Move the given literal value (sign-extended) into the specified register-pair." },
    insn! { 0x18, "const-wide", k51l, "vAA, #+BBBBBBBBBBBBBBBB", "Move the given literal value into the specified register-pair." },
    insn! { 0x19, "const-wide/high16", k21h, "vAA, #+BBBB000000000000", "Move the given literal value (right-zero-extended) into the specified register-pair." },
    insn! { 0x1a, "const-string", k21c, "vAA, string@BBBB", "Move a reference to the string specified by the given index into the specified register." },
    insn! { 0x1b, "const-string/jumbo", k31c, "vAA, string@BBBBBBBB", "Move a reference to the string specified by the given index into the specified register." },
    insn! { 0x1c, "const-class", k21c, "vAA, type@BBBB", "Move a reference to the class specified by the given index into the specified register." },
    // monitor ops
    insn! { 0x1d, "monitor-enter", k11x, "vAA", "Acquire the monitor for the indicated object." },
    insn! { 0x1e, "monitor-exit", k11x, "vAA", "Release the monitor for the indicated object." },
    insn! { 0x1f, "check-cast", k21c, "vAA, type@BBBB", "Throw a ClassCastException if the reference cannot be cast to the indicated type." },
    insn! { 0x20, "instance-of", k22c, "vA, vB, type@CCCC", "Store 1 if the indicated reference is an instance of the given type, 0 otherwise." },
    insn! { 0x21, "array-length", k12x, "vA, vB", "Store the length of the indicated array." },
    // new-* ops
    insn! { 0x22, "new-instance", k21c, "vAA, type@BBBB", "Construct a new instance of the indicated type." },
    insn! { 0x23, "new-array", k22c, "vA, vB, type@CCCC", "Construct a new array of the indicated type and size." },
    insn! { 0x24, "filled-new-array", k35c, "{vC, vD, vE, vF, vG}, type@BBBB", "Construct an array of the given type and size, filling it with the supplied contents." },
    insn! { 0x25, "filled-new-array/range", k3rc, "{vCCCC .. vNNNN}, type@BBBB", "Construct an array of the given type and size, filling it with the supplied contents." },
    insn! { 0x26, "fill-array-data", k31t, "vAA, +BBBBBBBB", "Fill the given array with the indicated data." },
    insn! { 0x27, "throw", k11x, "vAA", "Throw the indicated exception." },
    // goto ops
    insn! { 0x28, "goto", k10t, "+AA", "Unconditionally jump to the indicated instruction." },
    insn! { 0x29, "goto/16", k20t, "+AAAA", "Unconditionally jump to the indicated instruction." },
    insn! { 0x2a, "goto/32", k30t, "+AAAAAAAA", "Unconditionally jump to the indicated instruction." },
    // switch ops
    insn! { 0x2b, "packed-switch", k31t, "vAA, +BBBBBBBB", "Jump to a new instruction based on the value in the given register, using a table of offsets for values in a contiguous range." },
    insn! { 0x2c, "sparse-switch", k31t, "vAA, +BBBBBBBB", "Jump to a new instruction based on the value in the given register, using an ordered table of value-offset pairs." },
    // compare ops
    insn! { 0x2d, "cmpl-float", k23x, "vAA, vBB, vCC", "Perform the indicated floating point or long comparison." },
    insn! { 0x2e, "cmpg-float", k23x, "vAA, vBB, vCC", "Perform the indicated floating point or long comparison." },
    insn! { 0x2f, "cmpl-double", k23x, "vAA, vBB, vCC", "Perform the indicated floating point or long comparison." },
    insn! { 0x30, "cmpg-double", k23x, "vAA, vBB, vCC", "Perform the indicated floating point or long comparison." },
    insn! { 0x31, "cmp-long", k23x, "vAA, vBB, vCC", "Perform the indicated floating point or long comparison." },
    // if-test ops
    insn! { 0x32, "if-eq", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x33, "if-ne", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x34, "if-lt", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x35, "if-ge", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x36, "if-gt", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x37, "if-le", k22t, "vA, vB, +CCCC", "Branch to the given destination if the given two registers' values compare as specified." },
    insn! { 0x38, "if-eqz", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x39, "if-nez", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x3a, "if-ltz", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x3b, "if-gez", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x3c, "if-gtz", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x3d, "if-lez", k21t, "vAA, +BBBB", "Branch to the given destination if the given register's value compares with 0 as specified." },
    insn! { 0x3e, "unused-3e" },
    insn! { 0x3f, "unused-3f" },
    insn! { 0x40, "unused-40" },
    insn! { 0x41, "unused-41" },
    insn! { 0x42, "unused-42" },
    insn! { 0x43, "unused-43" },
    // array ops
    insn! { 0x44, "aget", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x45, "aget-wide", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x46, "aget-object", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x47, "aget-boolean", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x48, "aget-byte", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x49, "aget-char", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4a, "aget-short", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4b, "aput", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4c, "aput-wide", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4d, "aput-object", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4e, "aput-boolean", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x4f, "aput-byte", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x50, "aput-char", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    insn! { 0x51, "aput-short", k23x, "vAA, vBB, vCC", "Perform the identified array operation at the identified index of the given array." },
    // instance field ops
    insn! { 0x52, "iget", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x53, "iget-wide", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x54, "iget-object", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x55, "iget-boolean", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x56, "iget-byte", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x57, "iget-char", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x58, "iget-short", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x59, "iput", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5a, "iput-wide", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5b, "iput-object", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5c, "iput-boolean", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5d, "iput-byte", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5e, "iput-char", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    insn! { 0x5f, "iput-short", k22c, "vA, vB, field@CCCC", "Perform the identified object instance field operation." },
    // static field ops
    insn! { 0x60, "sget", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x61, "sget-wide", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x62, "sget-object", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x63, "sget-boolean", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x64, "sget-byte", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x65, "sget-char", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x66, "sget-short", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x67, "sput", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x68, "sput-wide", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x69, "sput-object", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x6a, "sput-boolean", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x6b, "sput-byte", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x6c, "sput-char", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    insn! { 0x6d, "sput-short", k21c, "vAA, field@BBBB", "Perform the identified static field operation." },
    // invoke ops
    insn! { 0x6e, "invoke-virtual", k35c, "{vC, vD, vE, vF, vG}, meth@BBBB", "Call the indicated method." },
    insn! { 0x6f, "invoke-super", k35c, "{vC, vD, vE, vF, vG}, meth@BBBB", "Call the indicated method." },
    insn! { 0x70, "invoke-direct", k35c, "{vC, vD, vE, vF, vG}, meth@BBBB", "Call the indicated method." },
    insn! { 0x71, "invoke-static", k35c, "{vC, vD, vE, vF, vG}, meth@BBBB", "Call the indicated method." },
    insn! { 0x72, "invoke-interface", k35c, "{vC, vD, vE, vF, vG}, meth@BBBB", "Call the indicated method." },
    insn! { 0x73, "unused-73" },
    insn! { 0x74, "invoke-virtual/range", k3rc, "{vCCCC .. vNNNN}, meth@BBBB", "Call the indicated method." },
    insn! { 0x75, "invoke-super/range", k3rc, "{vCCCC .. vNNNN}, meth@BBBB", "Call the indicated method." },
    insn! { 0x76, "invoke-direct/range", k3rc, "{vCCCC .. vNNNN}, meth@BBBB", "Call the indicated method." },
    insn! { 0x77, "invoke-static/range", k3rc, "{vCCCC .. vNNNN}, meth@BBBB", "Call the indicated method." },
    insn! { 0x78, "invoke-interface/range", k3rc, "{vCCCC .. vNNNN}, meth@BBBB", "Call the indicated method." },
    insn! { 0x79, "unused-79" },
    insn! { 0x7a, "unused-7a" },
    // unary ops
    insn! { 0x7b, "neg-int", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x7c, "not-int", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x7d, "neg-long", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x7e, "not-long", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x7f, "neg-float", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x80, "neg-double", k12x, "vA, vB", "Perform the identified unary operation." },
    insn! { 0x81, "int-to-long", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x82, "int-to-float", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x83, "int-to-double", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x84, "long-to-int", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x85, "long-to-float", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x86, "long-to-double", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x87, "float-to-int", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x88, "float-to-long", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x89, "float-to-double", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8a, "double-to-int", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8b, "double-to-long", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8c, "double-to-float", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8d, "int-to-byte", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8e, "int-to-char", k12x, "vA, vB", "Perform the identified primitive conversion." },
    insn! { 0x8f, "int-to-short", k12x, "vA, vB", "Perform the identified primitive conversion." },
    // binary ops
    insn! { 0x90, "add-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x91, "sub-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x92, "mul-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x93, "div-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x94, "rem-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x95, "and-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x96, "or-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x97, "xor-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x98, "shl-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x99, "shr-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9a, "ushr-int", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9b, "add-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9c, "sub-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9d, "mul-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9e, "div-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0x9f, "rem-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa0, "and-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa1, "or-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa2, "xor-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa3, "shl-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa4, "shr-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa5, "ushr-long", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa6, "add-float", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa7, "sub-float", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa8, "mul-float", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xa9, "div-float", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xaa, "rem-float", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xab, "add-double", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xac, "sub-double", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xad, "mul-double", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xae, "div-double", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    insn! { 0xaf, "rem-double", k23x, "vAA, vBB, vCC", "Perform the identified binary operation on the two source registers." },
    // binary ops /2addr
    insn! { 0xb0, "add-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb1, "sub-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb2, "mul-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb3, "div-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb4, "rem-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb5, "and-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb6, "or-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb7, "xor-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb8, "shl-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xb9, "shr-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xba, "ushr-int/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xbb, "add-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xbc, "sub-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xbd, "mul-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xbe, "div-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xbf, "rem-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc0, "and-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc1, "or-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc2, "xor-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc3, "shl-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc4, "shr-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc5, "ushr-long/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc6, "add-float/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc7, "sub-float/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc8, "mul-float/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xc9, "div-float/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xca, "rem-float/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xcb, "add-double/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xcc, "sub-double/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xcd, "mul-double/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xce, "div-double/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    insn! { 0xcf, "rem-double/2addr", k12x, "vA, vB", "Perform the identified binary operation, storing the result in the first source register." },
    // binary ops /lit16
    insn! { 0xd0, "add-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd1, "rsub-int", k22s, "vA, vB, #+CCCC", "Perform a reverse subtraction on a register and a literal value." },
    insn! { 0xd2, "mul-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd3, "div-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd4, "rem-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd5, "and-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd6, "or-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd7, "xor-int/lit16", k22s, "vA, vB, #+CCCC", "Perform the indicated binary operation on a register and a literal value." },
    // binary ops /lit8
    insn! { 0xd8, "add-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xd9, "rsub-int/lit8", k22b, "vAA, vBB, #+CC", "Perform a reverse subtraction on a register and a literal value." },
    insn! { 0xda, "mul-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xdb, "div-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xdc, "rem-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xdd, "and-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xde, "or-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xdf, "xor-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xe0, "shl-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xe1, "shr-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xe2, "ushr-int/lit8", k22b, "vAA, vBB, #+CC", "Perform the indicated binary operation on a register and a literal value." },
    insn! { 0xe3, "unused-e3" },
    insn! { 0xe4, "unused-e4" },
    insn! { 0xe5, "unused-e5" },
    insn! { 0xe6, "unused-e6" },
    insn! { 0xe7, "unused-e7" },
    insn! { 0xe8, "unused-e8" },
    insn! { 0xe9, "unused-e9" },
    insn! { 0xea, "unused-ea" },
    insn! { 0xeb, "unused-eb" },
    insn! { 0xec, "unused-ec" },
    insn! { 0xed, "unused-ed" },
    insn! { 0xee, "unused-ee" },
    insn! { 0xef, "unused-ef" },
    insn! { 0xf0, "unused-f0" },
    insn! { 0xf1, "unused-f1" },
    insn! { 0xf2, "unused-f2" },
    insn! { 0xf3, "unused-f3" },
    insn! { 0xf4, "unused-f4" },
    insn! { 0xf5, "unused-f5" },
    insn! { 0xf6, "unused-f6" },
    insn! { 0xf7, "unused-f7" },
    insn! { 0xf8, "unused-f8" },
    insn! { 0xf9, "unused-f9" },
    insn! { 0xfa, "invoke-polymorphic", k45cc, "{vC, vD, vE, vF, vG}, meth@BBBB, proto@HHHH", "Invoke the indicated signature polymorphic method." },
    insn! { 0xfb, "invoke-polymorphic/range", k4rcc, "{vCCCC .. vNNNN}, meth@BBBB, proto@HHHH", "Invoke the indicated signature polymorphic method." },
    insn! { 0xfc, "invoke-custom", k35c, "{vC, vD, vE, vF, vG}, call_site@BBBB", "Resolve and invoke the indicated call site." },
    insn! { 0xfd, "invoke-custom/range", k3rc, "{vCCCC .. vNNNN}, call_site@BBBB", "Resolve and invoke the indicated call site." },
    insn! { 0xfe, "const-method-handle", k21c, "vAA, method_handle@BBBB", "Move a reference to the indicated method handle into the specified register." },
    insn! { 0xff, "const-method-type", k21c, "vAA, proto@BBBB", "Move a reference to the indicated method prototype into the specified register." },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_opcode() {
        for (i, insn) in OPCODES.iter().enumerate() {
            assert_eq!(insn.opcode as usize, i, "row {} out of place", insn.mnemonic);
        }
    }

    #[test]
    fn test_all_lengths_are_legal() {
        for insn in OPCODES.iter() {
            assert!(
                matches!(insn.fmt().insn_len, 1 | 2 | 3 | 4 | 5),
                "{} has length {}",
                insn.mnemonic,
                insn.fmt().insn_len
            );
        }
    }

    #[test]
    fn test_known_rows() {
        assert_eq!(InsnDescriptor::of(0x0e).mnemonic, "return-void");
        assert_eq!(InsnDescriptor::of(0x0e).size_in_bytes(), 2);
        assert_eq!(InsnDescriptor::of(0x18).mnemonic, "const-wide");
        assert_eq!(InsnDescriptor::of(0x18).fmt().insn_len, 5);
        assert_eq!(InsnDescriptor::of(0x28).mnemonic, "goto");
        assert_eq!(InsnDescriptor::of(0x2b).mnemonic, "packed-switch");
        assert_eq!(InsnDescriptor::of(0x6e).fmt().id, "35c");
        assert_eq!(InsnDescriptor::of(0xfa).fmt().id, "45cc");
        assert_eq!(InsnDescriptor::of(0xfa).fmt().insn_len, 4);
    }

    #[test]
    fn test_unused_rows_are_single_unit() {
        for op in [0x3eu8, 0x73, 0x79, 0x7a, 0xe3, 0xf9] {
            let insn = InsnDescriptor::of(op);
            assert!(insn.mnemonic.starts_with("unused-"));
            assert_eq!(insn.fmt().insn_len, 1);
        }
    }
}
