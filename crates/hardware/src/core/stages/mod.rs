//! Pipeline stage bodies.
//!
//! One module per stage, each a free function over the in-flight slot and
//! whatever context the stage touches. The pipeline decides *when* a stage
//! fires; the stage decides *what* it does.

/// Instruction fetch.
pub mod fetch;

/// Instruction decode.
pub mod decode;

/// Execute: ALU, branches, and I/O dispatch.
pub mod execute;

/// Memory access (loads and stores).
pub mod memory;

/// Register writeback.
pub mod writeback;
