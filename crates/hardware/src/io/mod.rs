//! Asynchronous I/O subsystem.
//!
//! Blocked processes queue here together with their pending requests. The
//! simulation loop drives progress by calling [`IoManager::step`] once per
//! global tick; each call subtracts a fixed delta from every entry's
//! remaining service time. Completed entries execute their requests' side
//! effects, credit the process's I/O cycles, mark it ready, and fire the
//! registered ready-callback.
//!
//! The queue is mutex-protected so registration is safe from concurrent
//! callers, and completions are handed back through the callback rather than
//! by touching the scheduler directly: the loop drains them from a
//! thread-safe inbox.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::config::IoConfig;
use crate::process::{Counters, Pcb, ProcId, ProcessTable, State};

/// Kind of device operation a request performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoOp {
    /// Write a line to the output log.
    Print,
    /// Occupy the device without a side effect.
    Nop,
    /// Anything the device does not know; logged and dropped.
    Other(String),
}

/// One device request, immutable after enqueue.
///
/// Requests transfer by move from the core's outgoing buffer, through the
/// blocking event, into the I/O queue; they are never duplicated.
#[derive(Debug)]
pub struct IoRequest {
    /// Device operation.
    pub op: IoOp,
    /// Payload (the text printed for [`IoOp::Print`]).
    pub message: String,
    /// Requesting process, when one exists.
    pub proc: Option<ProcId>,
    /// Estimated service cost in ticks.
    pub cost_ticks: u64,
}

impl IoRequest {
    /// Builds a print request on behalf of a process.
    pub fn print(proc: ProcId, message: impl Into<String>, cost_ticks: u64) -> Self {
        Self {
            op: IoOp::Print,
            message: message.into(),
            proc: Some(proc),
            cost_ticks,
        }
    }
}

/// Callback fired once per completed entry with the readied process.
pub type ReadyCallback = Box<dyn Fn(ProcId) + Send>;

/// One queued blocked process with its requests.
#[derive(Debug)]
struct Entry {
    proc: Option<ProcId>,
    requests: Vec<IoRequest>,
    remaining: i64,
    enqueued_at: u64,
}

/// Queue state behind the mutex: entries plus the manager's own clock.
#[derive(Debug, Default)]
struct QueueState {
    entries: Vec<Entry>,
    now: u64,
}

/// The I/O manager.
pub struct IoManager {
    state: Mutex<QueueState>,
    step_delta: u64,
    ready_callback: Option<ReadyCallback>,
    output: Option<File>,
}

impl std::fmt::Debug for IoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoManager")
            .field("pending", &self.pending_count())
            .field("step_delta", &self.step_delta)
            .finish()
    }
}

impl IoManager {
    /// Creates a manager with the given timing and no output log.
    pub fn new(config: &IoConfig) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            step_delta: config.step_delta.max(1),
            ready_callback: None,
            output: None,
        }
    }

    /// Creates a manager that appends print side effects to a log file in
    /// `dir`. A file that cannot be opened is logged and skipped; output
    /// then goes to the structured log only.
    pub fn with_output_dir(config: &IoConfig, dir: &Path) -> Self {
        let mut mgr = Self::new(config);
        let path = dir.join("io_output.dat");
        match File::create(&path) {
            Ok(file) => mgr.output = Some(file),
            Err(err) => warn!("cannot open {}: {err}", path.display()),
        }
        mgr
    }

    /// Registers the callback fired once per completed entry.
    pub fn set_ready_callback(&mut self, callback: ReadyCallback) {
        self.ready_callback = Some(callback);
    }

    /// Queues a blocked process with its requests.
    ///
    /// The remaining service time is the device latency plus the summed
    /// request costs, never less than one tick. Safe to call concurrently.
    pub fn register(&self, id: ProcId, pcb: &mut Pcb, requests: Vec<IoRequest>, latency: u64) {
        pcb.state = State::Blocked;
        let cost: u64 = requests.iter().map(|r| r.cost_ticks).sum();
        let remaining = (latency + cost).max(1) as i64;

        let mut state = self.state.lock().expect("io queue poisoned");
        let enqueued_at = state.now;
        state.entries.push(Entry {
            proc: Some(id),
            requests,
            remaining,
            enqueued_at,
        });
    }

    /// Queues a bare request with no owning process; executed fire-and-forget
    /// on completion.
    pub fn add_request(&self, request: IoRequest) {
        let mut state = self.state.lock().expect("io queue poisoned");
        let enqueued_at = state.now;
        state.entries.push(Entry {
            proc: request.proc,
            remaining: request.cost_ticks.max(1) as i64,
            requests: vec![request],
            enqueued_at,
        });
    }

    /// Advances every queued entry by the configured delta and completes the
    /// ones that reach zero.
    pub fn step(&mut self, procs: &mut ProcessTable) {
        let (completed, now) = {
            let mut state = self.state.lock().expect("io queue poisoned");
            state.now += self.step_delta;
            let delta = self.step_delta as i64;
            for entry in &mut state.entries {
                entry.remaining -= delta;
            }
            let mut done = Vec::new();
            let mut i = 0;
            while i < state.entries.len() {
                if state.entries[i].remaining <= 0 {
                    done.push(state.entries.remove(i));
                } else {
                    i += 1;
                }
            }
            (done, state.now)
        };

        for entry in completed {
            self.complete(entry, procs, now);
        }
    }

    /// Number of entries still waiting for their device.
    pub fn pending_count(&self) -> usize {
        self.state.lock().expect("io queue poisoned").entries.len()
    }

    /// Executes a completed entry: side effects, counters, state, callback.
    fn complete(&mut self, entry: Entry, procs: &mut ProcessTable, now: u64) {
        let Some(id) = entry.proc else {
            for request in &entry.requests {
                self.execute(request, "no-pcb");
            }
            return;
        };

        let pcb = procs.get_mut(id);
        let label = format!("pid={}", pcb.pid);
        for request in &entry.requests {
            self.execute(request, &label);
        }

        // Wait plus service: everything from enqueue to completion.
        Counters::add(&pcb.counters.io_cycles, now.saturating_sub(entry.enqueued_at));
        pcb.state = State::Ready;

        if let Some(callback) = &self.ready_callback {
            callback(id);
        }
    }

    /// Performs one request's side effect.
    fn execute(&mut self, request: &IoRequest, label: &str) {
        match &request.op {
            IoOp::Print => {
                info!("[IO] ({label}) PRINT: {}", request.message);
                if let Some(file) = &mut self.output {
                    if let Err(err) = writeln!(file, "{label},PRINT,{}", request.message) {
                        warn!("io output write failed: {err}");
                    }
                }
            }
            IoOp::Nop => {}
            IoOp::Other(op) => {
                warn!("[IO] ({label}) unknown op '{op}' msg={}", request.message);
            }
        }
    }
}
