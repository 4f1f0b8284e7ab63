//! Execute stage: ALU operations, branch resolution, and I/O dispatch.
//!
//! Branches and jumps resolve here; a taken redirect rewrites the process pc
//! and the pipeline squashes the younger slots. A `print` instruction builds
//! an [`IoRequest`] into the core's outgoing buffer, rewinds the pc to the
//! following instruction, and blocks the process: the core emits the
//! blocking event at the drain boundary.

use tracing::warn;

use crate::core::alu;
use crate::core::pipeline::Slot;
use crate::core::PRINT_COST_TICKS;
use crate::io::IoRequest;
use crate::isa::{AluOp, BranchCond, Decoded};
use crate::process::{Counters, Pcb, ProcId, State};

/// Control-flow effect of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Fall through.
    Continue,
    /// The pc was rewritten; younger slots must be squashed.
    Redirect,
    /// The process blocked on I/O; younger slots must be squashed.
    Block,
}

/// Executes the slot's decoded instruction.
pub fn execute_stage(
    slot: &mut Slot,
    id: ProcId,
    pcb: &mut Pcb,
    io_out: &mut Vec<IoRequest>,
) -> ExecOutcome {
    Counters::bump(&pcb.counters.stage_invocations);
    let Some(decoded) = slot.decoded.clone() else {
        return ExecOutcome::Continue;
    };

    match decoded {
        Decoded::Alu {
            op: AluOp::Sll,
            rt,
            shamt,
            ..
        } => {
            // Shifts take the amount from the shamt field, not a register.
            slot.alu_out = alu::execute(AluOp::Sll, pcb.regs.read(rt), shamt);
            ExecOutcome::Continue
        }
        Decoded::Alu { op, rs, rt, .. } => {
            slot.alu_out = alu::execute(op, pcb.regs.read(rs), pcb.regs.read(rt));
            ExecOutcome::Continue
        }
        Decoded::AluImm { op, rs, imm, .. } => {
            slot.alu_out = alu::execute(op, pcb.regs.read(rs), imm as u32);
            ExecOutcome::Continue
        }
        Decoded::Load { base, offset, .. } | Decoded::Store { base, offset, .. } => {
            slot.alu_out = pcb.regs.read(base).wrapping_add_signed(offset);
            ExecOutcome::Continue
        }
        Decoded::Branch {
            cond, rs, rt, target,
        } => {
            let a = pcb.regs.read(rs);
            let b = pcb.regs.read(rt);
            let taken = match cond {
                BranchCond::Eq => a == b,
                BranchCond::Ne => a != b,
            };
            if taken {
                pcb.regs.pc = pcb.data_len() + target;
                ExecOutcome::Redirect
            } else {
                ExecOutcome::Continue
            }
        }
        Decoded::Jump { target } => {
            pcb.regs.pc = pcb.data_len() + target;
            ExecOutcome::Redirect
        }
        Decoded::Print { rs } => {
            let value = pcb.regs.read(rs);
            io_out.push(IoRequest::print(
                id,
                format!("r{rs}={value}"),
                PRINT_COST_TICKS,
            ));
            // Resume right after the print once I/O completes.
            pcb.regs.pc = slot.pc + 1;
            pcb.state = State::Blocked;
            ExecOutcome::Block
        }
        Decoded::Halt => ExecOutcome::Continue,
        Decoded::Unknown { raw } => {
            warn!(pid = pcb.pid, pc = slot.pc, raw, "unknown instruction");
            ExecOutcome::Continue
        }
    }
}
