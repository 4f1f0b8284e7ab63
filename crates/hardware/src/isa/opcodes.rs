//! Instruction field layout and opcode constants.
//!
//! A 32-bit instruction word is laid out MIPS-style:
//!
//! ```text
//! R-type:  [31:26 opcode=0] [25:21 rs] [20:16 rt] [15:11 rd] [10:6 shamt] [5:0 funct]
//! I-type:  [31:26 opcode]   [25:21 rs] [20:16 rt] [15:0 imm]
//! J-type:  [31:26 opcode]   [25:0 target]
//! ```

use crate::common::Word;

/// Bit position of the primary opcode field.
pub const OPCODE_SHIFT: u32 = 26;
/// Mask for the primary opcode after shifting.
pub const OPCODE_MASK: Word = 0x3F;

/// Shift for the `rs` register field.
pub const RS_SHIFT: u32 = 21;
/// Shift for the `rt` register field.
pub const RT_SHIFT: u32 = 16;
/// Shift for the `rd` register field.
pub const RD_SHIFT: u32 = 11;
/// Shift for the shift-amount field.
pub const SHAMT_SHIFT: u32 = 6;
/// Mask for a 5-bit register index field.
pub const REG_MASK: Word = 0x1F;
/// Mask for the 16-bit immediate field.
pub const IMM_MASK: Word = 0xFFFF;
/// Mask for the 26-bit jump target field.
pub const TARGET_MASK: Word = 0x03FF_FFFF;
/// Mask for the R-type `funct` field.
pub const FUNCT_MASK: Word = 0x3F;

/// R-type instructions (funct selects the operation).
pub const OP_RTYPE: Word = 0x00;
/// Absolute jump.
pub const OP_J: Word = 0x02;
/// Branch when equal.
pub const OP_BEQ: Word = 0x04;
/// Branch when not equal.
pub const OP_BNE: Word = 0x05;
/// Add immediate.
pub const OP_ADDI: Word = 0x08;
/// Load word.
pub const OP_LW: Word = 0x23;
/// Store word.
pub const OP_SW: Word = 0x2B;
/// Print the value of `rs` through the I/O subsystem.
pub const OP_PRINT: Word = 0x3E;
/// End-of-program opcode (six leading one bits).
pub const OP_HALT: Word = 0x3F;

/// Shift left logical.
pub const FUNCT_SLL: Word = 0x00;
/// Addition.
pub const FUNCT_ADD: Word = 0x20;
/// Subtraction.
pub const FUNCT_SUB: Word = 0x22;
/// Bitwise and.
pub const FUNCT_AND: Word = 0x24;
/// Bitwise or.
pub const FUNCT_OR: Word = 0x25;
/// Set when less than (signed).
pub const FUNCT_SLT: Word = 0x2A;

/// End-of-program sentinel: `OP_HALT` in the opcode field, 26 zero bits below.
///
/// Fetching this word stops instruction issue and lets the pipeline drain.
pub const END_SENTINEL: Word = OP_HALT << OPCODE_SHIFT;

/// Extracts the primary opcode of a raw instruction word.
#[inline]
pub fn opcode(raw: Word) -> Word {
    (raw >> OPCODE_SHIFT) & OPCODE_MASK
}
