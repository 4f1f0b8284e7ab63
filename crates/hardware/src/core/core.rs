//! One simulated core.
//!
//! A core holds at most one process context, advances the pipeline one tick
//! per [`Core::step_one_cycle`] call, and produces at most one terminal
//! event per tick. The local state machine:
//!
//! ```text
//! Idle -(assign)-> Running -(Finished | Preempted)-> Idle
//!                          -(Blocked)-> WaitingIo -(assign)-> Running
//! ```
//!
//! `WaitingIo` is bookkeeping only: the context is already clear, so the
//! core accepts a new assignment; the state flips back through `assign` once
//! the pool reuses the core.

use tracing::debug;

use crate::io::IoRequest;
use crate::memory::MemoryManager;
use crate::process::{Counters, Pcb, ProcId, ProcessTable, State};

use super::pipeline::Pipeline;

/// Local execution state of a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoreState {
    /// No context; accepts assignment.
    #[default]
    Idle,
    /// Actively stepping a process.
    Running,
    /// Last process left for the I/O queue; accepts assignment.
    WaitingIo,
}

/// What a core reported for one tick.
///
/// Carries owned I/O requests on the blocking arm, so the type is move-only
/// by construction (no `Clone`).
#[derive(Debug)]
pub struct CoreEvent {
    /// Id of the reporting core.
    pub core_id: usize,
    /// The terminal transition.
    pub kind: CoreEventKind,
}

/// Terminal transitions a core can report.
#[derive(Debug)]
pub enum CoreEventKind {
    /// The program fetched its end sentinel and drained.
    Finished(ProcId),
    /// The process issued I/O; its requests ride along.
    Blocked(ProcId, Vec<IoRequest>),
    /// The quantum expired and the pipeline drained.
    Preempted(ProcId),
}

/// One simulated core.
#[derive(Debug)]
pub struct Core {
    id: usize,
    state: CoreState,
    current: Option<ProcId>,
    pipeline: Pipeline,
    clock_counter: u64,
    io_buffer: Vec<IoRequest>,

    /// Ticks spent with a process running.
    pub time_running: u64,
    /// Ticks spent idle.
    pub time_idle: u64,
    /// Ticks spent after blocking a process, before reuse.
    pub time_waiting_io: u64,
}

impl Core {
    /// Creates an idle core.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: CoreState::Idle,
            current: None,
            pipeline: Pipeline::new(),
            clock_counter: 0,
            io_buffer: Vec::new(),
            time_running: 0,
            time_idle: 0,
            time_waiting_io: 0,
        }
    }

    /// The core's id within the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// True when the core can accept an assignment.
    pub fn is_idle(&self) -> bool {
        self.state != CoreState::Running
    }

    /// Local execution state.
    pub fn state(&self) -> CoreState {
        self.state
    }

    /// Currently assigned process, if any.
    pub fn current(&self) -> Option<ProcId> {
        self.current
    }

    /// Takes a process onto the core.
    ///
    /// Fails when the core is already running one. Resets all pipeline
    /// counters and marks the process running.
    pub fn assign(&mut self, id: ProcId, pcb: &mut Pcb) -> bool {
        if self.state == CoreState::Running {
            return false;
        }
        debug!(core = self.id, pid = pcb.pid, "assign");
        self.current = Some(id);
        self.state = CoreState::Running;
        self.pipeline.reset();
        self.clock_counter = 0;
        self.io_buffer.clear();
        pcb.state = State::Running;
        true
    }

    /// Buckets the current tick into the per-core time counters. Called once
    /// per global tick, before stepping.
    pub fn update_core_time(&mut self) {
        match self.state {
            CoreState::Running => self.time_running += 1,
            CoreState::WaitingIo => self.time_waiting_io += 1,
            CoreState::Idle => self.time_idle += 1,
        }
    }

    /// Advances the core by one tick.
    ///
    /// Returns a terminal event when the assigned process finished, blocked,
    /// or was preempted this tick; the context is cleared so a subsequent
    /// `assign` can happen. Never returns more than one event per tick.
    pub fn step_one_cycle(
        &mut self,
        procs: &mut ProcessTable,
        mem: &mut MemoryManager,
    ) -> Option<CoreEvent> {
        let id = self.current?;

        if self.pipeline.end_execution && self.pipeline.drain_tick() {
            return Some(self.retire(id, procs));
        }

        let pcb = procs.get_mut(id);
        self.pipeline.tick(id, pcb, mem, &mut self.io_buffer);
        self.clock_counter += 1;
        Counters::bump(&pcb.counters.pipeline_cycles);

        let quantum_expired = pcb.quantum > 0 && self.clock_counter >= u64::from(pcb.quantum);
        if quantum_expired || self.pipeline.end_program || pcb.state == State::Blocked {
            self.pipeline.end_execution = true;
        }
        None
    }

    /// Emits the terminal event for a fully drained pipeline and clears the
    /// context.
    fn retire(&mut self, id: ProcId, procs: &mut ProcessTable) -> CoreEvent {
        let pcb = procs.get_mut(id);
        let kind = if pcb.state == State::Blocked {
            CoreEventKind::Blocked(id, std::mem::take(&mut self.io_buffer))
        } else if self.pipeline.end_program {
            pcb.state = State::Finished;
            CoreEventKind::Finished(id)
        } else {
            CoreEventKind::Preempted(id)
        };

        debug!(core = self.id, pid = pcb.pid, ?kind, "retire");
        self.state = if matches!(&kind, CoreEventKind::Blocked(..)) {
            CoreState::WaitingIo
        } else {
            CoreState::Idle
        };
        self.current = None;
        CoreEvent {
            core_id: self.id,
            kind,
        }
    }
}
