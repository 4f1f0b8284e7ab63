//! Temporal metrics: the run's shape over time.
//!
//! The simulation loop feeds the collector a snapshot every few ticks; each
//! snapshot captures CPU usage (active cores over pool size), memory usage
//! (occupied partitions over total), and the instantaneous throughput since
//! the previous snapshot.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// One point of the time series.
#[derive(Debug, Clone, Serialize)]
pub struct TemporalSnapshot {
    /// Global tick of the snapshot.
    pub tick: u64,
    /// Active cores over pool size, as a percentage.
    pub cpu_usage_percent: f64,
    /// Occupied partitions over total, as a percentage.
    pub memory_usage_percent: f64,
    /// Processes completed per tick since the previous snapshot.
    pub throughput_instant: f64,
    /// Cores running a process at snapshot time.
    pub active_processes: usize,
    /// Processes completed so far.
    pub completed_processes: usize,
}

/// Snapshot accumulator for one run.
#[derive(Debug)]
pub struct TemporalCollector {
    snapshots: Vec<TemporalSnapshot>,
    num_cores: usize,
    last_completed: usize,
    last_tick: u64,
}

impl TemporalCollector {
    /// Creates a collector for a pool of `num_cores` cores.
    pub fn new(num_cores: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            num_cores,
            last_completed: 0,
            last_tick: 0,
        }
    }

    /// Records one snapshot.
    pub fn collect(
        &mut self,
        tick: u64,
        active_cores: usize,
        occupied_partitions: usize,
        total_partitions: usize,
        completed: usize,
    ) {
        let cpu_usage_percent = if self.num_cores > 0 {
            active_cores as f64 / self.num_cores as f64 * 100.0
        } else {
            0.0
        };
        let memory_usage_percent = if total_partitions > 0 {
            occupied_partitions as f64 / total_partitions as f64 * 100.0
        } else {
            0.0
        };
        let throughput_instant = if tick > self.last_tick {
            (completed - self.last_completed) as f64 / (tick - self.last_tick) as f64
        } else {
            0.0
        };

        self.snapshots.push(TemporalSnapshot {
            tick,
            cpu_usage_percent,
            memory_usage_percent,
            throughput_instant,
            active_processes: active_cores,
            completed_processes: completed,
        });
        self.last_completed = completed;
        self.last_tick = tick;
    }

    /// The snapshots recorded so far.
    pub fn snapshots(&self) -> &[TemporalSnapshot] {
        &self.snapshots
    }

    /// Consumes the collector, yielding the snapshots.
    pub fn into_snapshots(self) -> Vec<TemporalSnapshot> {
        self.snapshots
    }

    /// Writes `temporal_metrics.csv`: one row per snapshot.
    pub fn write_csv(snapshots: &[TemporalSnapshot], path: &Path) -> io::Result<()> {
        let mut f = File::create(path)?;
        writeln!(
            f,
            "tick,cpu_usage_percent,memory_usage_percent,throughput_instant,\
             active_processes,completed_processes"
        )?;
        for s in snapshots {
            writeln!(
                f,
                "{},{:.2},{:.2},{:.4},{},{}",
                s.tick,
                s.cpu_usage_percent,
                s.memory_usage_percent,
                s.throughput_instant,
                s.active_processes,
                s.completed_processes
            )?;
        }
        Ok(())
    }
}
