//! Per-process and per-core reports.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::MultiCore;
use crate::process::{Counters, Pcb, ProcessTable};

/// Snapshot of one process's metrics after a run.
#[derive(Debug, Clone, Serialize)]
pub struct PcbReport {
    /// External pid.
    pub pid: i32,
    /// Process name.
    pub name: String,
    /// Tick the process entered the system.
    pub arrival: u64,
    /// Tick of first dispatch.
    pub start: u64,
    /// Tick the process finished.
    pub finish: u64,
    /// Finish minus arrival.
    pub turnaround: u64,
    /// Turnaround minus service time.
    pub waiting: u64,
    /// First-dispatch delay.
    pub response: u64,
    /// Ticks spent occupying a pipeline.
    pub pipeline_cycles: u64,
    /// Cache hits observed for this process.
    pub cache_hits: u64,
    /// Cache misses observed for this process.
    pub cache_misses: u64,
    /// Total memory operations.
    pub mem_accesses: u64,
    /// Ticks spent blocked on I/O.
    pub io_cycles: u64,
}

impl PcbReport {
    /// Builds the report for one PCB.
    pub fn from_pcb(pcb: &Pcb) -> Self {
        let turnaround = pcb.finish_time.saturating_sub(pcb.arrival_time);
        let service = Counters::get(&pcb.counters.pipeline_cycles);
        Self {
            pid: pcb.pid,
            name: pcb.name.clone(),
            arrival: pcb.arrival_time,
            start: pcb.start_time,
            finish: pcb.finish_time,
            turnaround,
            waiting: turnaround.saturating_sub(service),
            response: pcb.response_time,
            pipeline_cycles: service,
            cache_hits: Counters::get(&pcb.counters.cache_hits),
            cache_misses: Counters::get(&pcb.counters.cache_misses),
            mem_accesses: Counters::get(&pcb.counters.mem_accesses_total),
            io_cycles: Counters::get(&pcb.counters.io_cycles),
        }
    }

    /// Builds reports for every process, in arrival order.
    pub fn collect(procs: &ProcessTable) -> Vec<Self> {
        procs.iter().map(|(_, pcb)| Self::from_pcb(pcb)).collect()
    }

    /// Prints the reports to stdout.
    pub fn print_console(reports: &[Self]) {
        println!("\n================ PROCESS METRICS ================");
        for r in reports {
            println!("PID {} ({})", r.pid, r.name);
            println!("  arrival        {}", r.arrival);
            println!("  start          {}", r.start);
            println!("  finish         {}", r.finish);
            println!("  turnaround     {}", r.turnaround);
            println!("  waiting        {}", r.waiting);
            println!("  response       {}", r.response);
            println!("  pipeline_cyc   {}", r.pipeline_cycles);
            println!("  cache hits     {}", r.cache_hits);
            println!("  cache misses   {}", r.cache_misses);
            println!("  mem accesses   {}", r.mem_accesses);
            println!("  io cycles      {}", r.io_cycles);
            println!("-------------------------------------------------");
        }
    }

    /// Writes `metrics.csv`: one row per process.
    pub fn write_csv(reports: &[Self], path: &Path) -> io::Result<()> {
        let mut f = File::create(path)?;
        writeln!(
            f,
            "pid,name,arrival,start,finish,turnaround,waiting,response,\
             pipeline,cache_hits,cache_misses,mem_accesses,io_cycles"
        )?;
        for r in reports {
            writeln!(
                f,
                "{},{},{},{},{},{},{},{},{},{},{},{},{}",
                r.pid,
                r.name,
                r.arrival,
                r.start,
                r.finish,
                r.turnaround,
                r.waiting,
                r.response,
                r.pipeline_cycles,
                r.cache_hits,
                r.cache_misses,
                r.mem_accesses,
                r.io_cycles
            )?;
        }
        Ok(())
    }

    /// Writes `metrics.json`: the same rows as a JSON array.
    pub fn write_json(reports: &[Self], path: &Path) -> io::Result<()> {
        let f = File::create(path)?;
        serde_json::to_writer_pretty(f, reports).map_err(io::Error::other)
    }
}

/// Per-core tick accounting after a run.
#[derive(Debug, Clone, Serialize)]
pub struct CoreReport {
    /// Core id within the pool.
    pub core_id: usize,
    /// Ticks spent running a process.
    pub running: u64,
    /// Ticks spent after blocking a process, before reuse.
    pub waiting_io: u64,
    /// Ticks spent idle.
    pub idle: u64,
}

impl CoreReport {
    /// Builds reports for every core in the pool.
    pub fn collect(cores: &MultiCore) -> Vec<Self> {
        cores
            .cores()
            .iter()
            .map(|c| Self {
                core_id: c.id(),
                running: c.time_running,
                waiting_io: c.time_waiting_io,
                idle: c.time_idle,
            })
            .collect()
    }

    /// Prints the core reports to stdout.
    pub fn print_console(reports: &[Self]) {
        println!("\n================ CORE METRICS ===================");
        for c in reports {
            println!("CORE {}", c.core_id);
            println!("  running        {}", c.running);
            println!("  waiting io     {}", c.waiting_io);
            println!("  idle           {}", c.idle);
            println!("-------------------------------------------------");
        }
    }

    /// Writes `core_metrics.csv`: one row per core.
    pub fn write_csv(reports: &[Self], path: &Path) -> io::Result<()> {
        let mut f = File::create(path)?;
        writeln!(f, "core_id,running,waiting_io,idle")?;
        for c in reports {
            writeln!(f, "{},{},{},{}", c.core_id, c.running, c.waiting_io, c.idle)?;
        }
        Ok(())
    }
}
