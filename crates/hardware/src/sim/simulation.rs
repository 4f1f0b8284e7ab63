//! The simulation driver.
//!
//! Owns the process table, scheduler, memory manager, I/O manager, and core
//! pool, and drives them one global tick at a time until everything drains:
//! the scheduler is empty, no core is running, no process waits for a
//! partition, and the I/O queue is empty.
//!
//! Each tick:
//! 1. retry deferred partition allocations,
//! 2. fill idle cores from the scheduler (stamping first-dispatch times),
//! 3. step every core and collect events,
//! 4. route events: finishes release partitions, blocks enter the I/O
//!    queue, preemptions rejoin the scheduler,
//! 5. step the I/O manager and drain its ready inbox back into the
//!    scheduler,
//! 6. snapshot temporal metrics on the configured interval.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::config::Config;
use crate::core::{CoreEventKind, MultiCore};
use crate::io::IoManager;
use crate::memory::MemoryManager;
use crate::metrics::{CoreReport, PcbReport, TemporalCollector, TemporalSnapshot};
use crate::process::{Counters, Pcb, ProcId, ProcessTable};
use crate::sched::Scheduler;

/// Everything a finished run reports.
#[derive(Debug)]
pub struct RunSummary {
    /// Global ticks the run took.
    pub total_ticks: u64,
    /// Processes that ran to completion.
    pub completed: usize,
    /// Per-process reports.
    pub reports: Vec<PcbReport>,
    /// Per-core reports.
    pub core_reports: Vec<CoreReport>,
    /// Temporal snapshots.
    pub temporal: Vec<TemporalSnapshot>,
}

/// The simulator: all components plus the global tick counter.
pub struct Simulation {
    procs: ProcessTable,
    sched: Scheduler,
    mem: MemoryManager,
    io: IoManager,
    cores: MultiCore,
    pending: Vec<ProcId>,
    ready_inbox: Arc<Mutex<Vec<ProcId>>>,
    temporal: TemporalCollector,
    tick: u64,
    completed: usize,
    io_latency: u64,
    snapshot_interval: u64,
    max_ticks: u64,
}

impl Simulation {
    /// Builds a simulation over the given processes.
    ///
    /// Every process starts in the deferred-allocation list; the first tick
    /// binds partitions and admits what fits. The I/O manager is `io` so the
    /// caller decides whether completions log to a file.
    pub fn new(config: &Config, procs: ProcessTable, mut io: IoManager) -> Self {
        let num_cores = crate::config::GeneralConfig::clamp_cores(config.general.num_cores);
        let mem = MemoryManager::from_config(&config.memory);

        let ready_inbox: Arc<Mutex<Vec<ProcId>>> = Arc::new(Mutex::new(Vec::new()));
        let inbox = Arc::clone(&ready_inbox);
        io.set_ready_callback(Box::new(move |id| {
            inbox.lock().expect("ready inbox poisoned").push(id);
        }));

        let pending: Vec<ProcId> = procs.ids().collect();
        Self {
            procs,
            sched: Scheduler::new(config.general.policy),
            mem,
            io,
            cores: MultiCore::new(num_cores),
            pending,
            ready_inbox,
            temporal: TemporalCollector::new(num_cores),
            tick: 0,
            completed: 0,
            io_latency: config.io.latency,
            snapshot_interval: config.general.snapshot_interval.max(1),
            max_ticks: config.general.max_ticks,
        }
    }

    /// The process table (for inspection after a run).
    pub fn procs(&self) -> &ProcessTable {
        &self.procs
    }

    /// The memory manager (for inspection after a run).
    pub fn memory(&self) -> &MemoryManager {
        &self.mem
    }

    /// Global tick counter.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// True when every queue and core has drained.
    pub fn drained(&self) -> bool {
        self.sched.is_empty()
            && !self.cores.has_active_cores()
            && self.pending.is_empty()
            && self.io.pending_count() == 0
    }

    /// Runs the loop to completion and returns the summary.
    pub fn run(mut self) -> RunSummary {
        info!(
            processes = self.procs.len(),
            cores = self.cores.len(),
            policy = %self.sched.policy(),
            "simulation start"
        );

        while !self.drained() {
            if self.tick >= self.max_ticks {
                error!(tick = self.tick, "simulation did not drain; aborting run");
                break;
            }
            self.tick_once();
        }

        self.mem.dirty_flush();
        info!(ticks = self.tick, completed = self.completed, "simulation end");

        RunSummary {
            total_ticks: self.tick,
            completed: self.completed,
            reports: PcbReport::collect(&self.procs),
            core_reports: CoreReport::collect(&self.cores),
            temporal: self.temporal.into_snapshots(),
        }
    }

    /// Advances the whole system by one global tick.
    pub fn tick_once(&mut self) {
        self.retry_pending();

        let tick = self.tick;
        let sched = &mut self.sched;
        self.cores
            .assign_ready(&mut self.procs, &mut |procs: &mut ProcessTable| {
                let id = sched.fetch_next()?;
                let pcb = procs.get_mut(id);
                if pcb.start_time == 0 {
                    // A zero start means "never dispatched", so a tick-0
                    // dispatch stamps 1.
                    pcb.start_time = tick.max(1);
                    pcb.response_time = tick.saturating_sub(pcb.arrival_time);
                }
                Some(id)
            });

        let events = self.cores.step_all(&mut self.procs, &mut self.mem);
        for event in events {
            match event.kind {
                CoreEventKind::Finished(id) => self.on_finished(id),
                CoreEventKind::Blocked(id, requests) => {
                    let pcb = self.procs.get_mut(id);
                    self.io.register(id, pcb, requests, self.io_latency);
                }
                CoreEventKind::Preempted(id) => {
                    debug!(%id, "preempted; rejoining ready queue");
                    self.sched.add(id, self.procs.get_mut(id));
                }
            }
        }

        self.io.step(&mut self.procs);
        let readied: Vec<ProcId> = {
            let mut inbox = self.ready_inbox.lock().expect("ready inbox poisoned");
            inbox.drain(..).collect()
        };
        for id in readied {
            self.sched.unblock(id, self.procs.get_mut(id));
        }

        if self.tick % self.snapshot_interval == 0 {
            self.temporal.collect(
                self.tick,
                self.cores.count_active_cores(),
                self.mem.occupied_partitions(),
                self.mem.partitions().len(),
                self.completed,
            );
        }

        self.tick += 1;
    }

    /// Retries deferred allocations; successes load their image and join the
    /// ready queue.
    fn retry_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let waiting = std::mem::take(&mut self.pending);
        for id in waiting {
            let required = self.procs.get(id).image_len();
            if required > self.mem.largest_partition() {
                // No tiling will ever fit this image; dropping it beats
                // spinning forever.
                let pcb = self.procs.get_mut(id);
                error!(
                    pid = pcb.pid,
                    required, "image exceeds every partition; dropping process"
                );
                pcb.state = crate::process::State::Finished;
                pcb.finish_time = self.tick;
                continue;
            }

            let pcb = self.procs.get_mut(id);
            if self.mem.allocate_fixed_partition(pcb, required).is_some() {
                if let Err(err) = self.mem.load_image(self.procs.get(id)) {
                    error!(%id, "image load failed: {err}");
                    let pcb = self.procs.get_mut(id);
                    pcb.state = crate::process::State::Finished;
                    pcb.finish_time = self.tick;
                    self.mem.free_partition(pcb.pid);
                    continue;
                }
                self.sched.add(id, self.procs.get_mut(id));
            } else {
                debug!(%id, "no free partition; deferring");
                self.pending.push(id);
            }
        }
    }

    /// Handles a finished process: timestamps, waiting time, partition
    /// release.
    fn on_finished(&mut self, id: ProcId) {
        let tick = self.tick;
        let pcb = self.procs.get_mut(id);
        pcb.finish_time = tick;
        let turnaround = pcb.finish_time.saturating_sub(pcb.arrival_time);
        let service = Counters::get(&pcb.counters.pipeline_cycles);
        pcb.wait_time = turnaround.saturating_sub(service);
        let pid = pcb.pid;
        self.mem.free_partition(pid);
        self.completed += 1;
        info!(pid, tick, "process finished");
    }
}

/// Builds a process table from loaded PCBs, stamping arrival at tick 0.
pub fn admit_all(pcbs: Vec<Pcb>) -> ProcessTable {
    let mut table = ProcessTable::new();
    for mut pcb in pcbs {
        pcb.arrival_time = 0;
        let _ = table.insert(pcb);
    }
    table
}
