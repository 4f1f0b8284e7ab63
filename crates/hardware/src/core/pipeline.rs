//! The 5-stage windowed pipeline.
//!
//! All five stages fire within a single tick, each operating on a different
//! in-flight slot; the window achieves one instruction per tick in steady
//! state. With `c` the number of dispatched instructions and `e` the drain
//! counter (5 while issuing):
//!
//! - writeback fires on slot `c-4` when `c >= 4` and `e >= 1`,
//! - memory on `c-3` when `c >= 3` and `e >= 2`,
//! - execute on `c-2` when `c >= 2` and `e >= 3`,
//! - decode on `c-1` when `c >= 1` and `e >= 4`,
//! - fetch pushes slot `c` only while `e == 5`.
//!
//! Once the program ends, the quantum expires, or the process blocks, `e`
//! counts down one per tick; issued instructions keep flowing through the
//! later stages until the window closes. A pc redirect (branch, jump, or an
//! I/O dispatch) squashes the younger in-flight slots so the process resumes
//! at the right instruction.

use crate::common::Word;
use crate::io::IoRequest;
use crate::isa::Decoded;
use crate::memory::MemoryManager;
use crate::process::{Pcb, ProcId, State};

use super::stages;
use super::stages::execute::ExecOutcome;

/// Drain counter start value: the pipeline depth.
pub const DRAIN_START: u32 = 5;

/// One in-flight instruction descriptor, indexed by dispatch number.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    /// False for bubbles; stages skip invalid slots.
    pub valid: bool,
    /// Logical word index this instruction was fetched from.
    pub pc: Word,
    /// Raw instruction word.
    pub raw: Word,
    /// Filled by the decode stage.
    pub decoded: Option<Decoded>,
    /// ALU result or effective address, filled by execute.
    pub alu_out: Word,
    /// Loaded value, filled by the memory stage.
    pub mem_out: Word,
}

impl Slot {
    /// An empty slot that every stage skips.
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// Pipeline state for one core.
#[derive(Debug)]
pub struct Pipeline {
    slots: Vec<Slot>,
    counter: usize,
    drain: u32,
    /// Set when the end sentinel was fetched or a fatal access ended the
    /// process.
    pub end_program: bool,
    /// Set when the pipeline has stopped issuing and is draining.
    pub end_execution: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Creates an idle pipeline.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            counter: 0,
            drain: DRAIN_START,
            end_program: false,
            end_execution: false,
        }
    }

    /// Resets all pipeline state for a fresh assignment.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.counter = 0;
        self.drain = DRAIN_START;
        self.end_program = false;
        self.end_execution = false;
    }

    /// Instructions dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.counter
    }

    /// Counts down the drain window; returns true once it has closed.
    pub fn drain_tick(&mut self) -> bool {
        self.drain = self.drain.saturating_sub(1);
        self.drain == 0
    }

    /// Advances every stage slot by one tick.
    pub fn tick(
        &mut self,
        id: ProcId,
        pcb: &mut Pcb,
        mem: &mut MemoryManager,
        io_out: &mut Vec<IoRequest>,
    ) {
        let c = self.counter;

        if c >= 4 && self.drain >= 1 {
            let slot = &mut self.slots[c - 4];
            if slot.valid {
                stages::writeback::writeback_stage(slot, pcb);
            }
        }

        if c >= 3 && self.drain >= 2 {
            let slot = &mut self.slots[c - 3];
            if slot.valid && stages::memory::memory_stage(slot, pcb, mem).is_err() {
                // Fatal at process level: terminate through the normal drain.
                self.end_program = true;
            }
        }

        if c >= 2 && self.drain >= 3 {
            let slot = &mut self.slots[c - 2];
            if slot.valid {
                match stages::execute::execute_stage(slot, id, pcb, io_out) {
                    ExecOutcome::Continue => {}
                    ExecOutcome::Redirect | ExecOutcome::Block => self.squash_after(c - 2),
                }
            }
        }

        if c >= 1 && self.drain >= 4 {
            let slot = &mut self.slots[c - 1];
            if slot.valid {
                stages::decode::decode_stage(slot, pcb);
            }
        }

        if self.drain == DRAIN_START && !self.end_program && pcb.state != State::Blocked {
            let fetched = stages::fetch::fetch_stage(pcb, mem);
            if fetched.end_program {
                self.end_program = true;
            }
            self.slots.push(fetched.slot);
        } else {
            self.slots.push(Slot::bubble());
        }

        self.counter += 1;
    }

    /// Turns every slot younger than `index` into a bubble.
    fn squash_after(&mut self, index: usize) {
        for slot in self.slots.iter_mut().skip(index + 1) {
            *slot = Slot::bubble();
        }
    }
}
