//! Instruction set of the simulated machine.
//!
//! The workload ISA is a small MIPS-flavored 32-bit encoding:
//! 1. **R-type:** opcode 0 plus a `funct` field (add, sub, and, or, slt, sll).
//! 2. **I-type:** immediate arithmetic, loads, stores, and branches.
//! 3. **J-type:** absolute jumps.
//! 4. **I/O:** a `print` opcode that suspends the process on a device request.
//! 5. **End sentinel:** the all-ones opcode with a zero payload marks the end
//!    of a program's code segment.
//!
//! Branch and jump targets are absolute instruction indices within the code
//! segment; the loader's label table holds exactly these indices.

/// Instruction field layout and opcode/funct constants.
pub mod opcodes;

/// Instruction word decoding into a typed form.
pub mod decode;

pub use decode::decode;
pub use decode::{AluOp, BranchCond, Decoded};
pub use opcodes::END_SENTINEL;
