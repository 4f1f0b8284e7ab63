//! Writeback stage.
//!
//! Commits results to the register bank. Stores, branches, jumps, and I/O
//! instructions have nothing to commit.

use crate::core::pipeline::Slot;
use crate::isa::Decoded;
use crate::process::{Counters, Pcb};

/// Commits the slot's result, if it produces one.
pub fn writeback_stage(slot: &mut Slot, pcb: &mut Pcb) {
    Counters::bump(&pcb.counters.stage_invocations);
    match slot.decoded {
        Some(Decoded::Alu { rd, .. }) => pcb.regs.write(rd, slot.alu_out),
        Some(Decoded::AluImm { rt, .. }) => pcb.regs.write(rt, slot.alu_out),
        Some(Decoded::Load { rt, .. }) => pcb.regs.write(rt, slot.mem_out),
        _ => {}
    }
}
