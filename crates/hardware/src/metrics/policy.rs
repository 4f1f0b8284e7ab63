//! Aggregate metrics per scheduling policy and per core count.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sched::SchedPolicy;

use super::report::PcbReport;

/// Aggregates for one run under one scheduling policy.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyMetrics {
    /// The policy the run used.
    pub policy: String,
    /// Mean waiting time across processes.
    pub avg_waiting: f64,
    /// Mean turnaround time across processes.
    pub avg_turnaround: f64,
    /// Service time over available core-ticks, as a percentage (capped at
    /// 100).
    pub cpu_utilization: f64,
    /// Completed processes per tick.
    pub throughput: f64,
    /// Throughput over normalized utilization.
    pub efficiency: f64,
    /// Number of processes in the run.
    pub num_processes: usize,
    /// Global ticks the run took.
    pub total_cycles: u64,
}

impl PolicyMetrics {
    /// Computes the aggregates for one run.
    pub fn calculate(
        reports: &[PcbReport],
        policy: SchedPolicy,
        total_cycles: u64,
        num_cores: usize,
    ) -> Self {
        let n = reports.len();
        if n == 0 || total_cycles == 0 || num_cores == 0 {
            return Self {
                policy: policy.to_string(),
                avg_waiting: 0.0,
                avg_turnaround: 0.0,
                cpu_utilization: 0.0,
                throughput: 0.0,
                efficiency: 0.0,
                num_processes: n,
                total_cycles,
            };
        }

        let total_waiting: u64 = reports.iter().map(|r| r.waiting).sum();
        let total_turnaround: u64 = reports.iter().map(|r| r.turnaround).sum();
        let total_service: u64 = reports.iter().map(|r| r.pipeline_cycles).sum();

        let avg_waiting = total_waiting as f64 / n as f64;
        let avg_turnaround = total_turnaround as f64 / n as f64;
        let cpu_utilization =
            (total_service as f64 / (total_cycles * num_cores as u64) as f64 * 100.0).min(100.0);
        let throughput = n as f64 / total_cycles as f64;
        let efficiency = if cpu_utilization > 0.0 {
            throughput / (cpu_utilization / 100.0)
        } else {
            0.0
        };

        Self {
            policy: policy.to_string(),
            avg_waiting,
            avg_turnaround,
            cpu_utilization,
            throughput,
            efficiency,
            num_processes: n,
            total_cycles,
        }
    }

    /// Writes `policy_metrics.csv`: the single aggregate row.
    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        let mut f = File::create(path)?;
        writeln!(
            f,
            "policy,avg_waiting,avg_turnaround,cpu_utilization_percent,\
             throughput,efficiency,num_processes,total_cycles"
        )?;
        writeln!(
            f,
            "{},{:.2},{:.2},{:.2},{:.6},{:.6},{},{}",
            self.policy,
            self.avg_waiting,
            self.avg_turnaround,
            self.cpu_utilization,
            self.throughput,
            self.efficiency,
            self.num_processes,
            self.total_cycles
        )?;
        Ok(())
    }
}

/// One row of the core-count comparison.
#[derive(Debug, Clone, Serialize)]
pub struct CoreComparison {
    /// Core count of the compared run.
    pub num_cores: usize,
    /// Mean waiting time.
    pub avg_waiting: f64,
    /// Mean turnaround time.
    pub avg_turnaround: f64,
    /// CPU utilization percentage.
    pub cpu_utilization: f64,
    /// Completed processes per tick.
    pub throughput: f64,
    /// Throughput relative to the single-core baseline (baseline = 1.0).
    pub speedup: f64,
}

impl CoreComparison {
    /// Builds the baseline row (speedup fixed at 1.0).
    pub fn baseline(reports: &[PcbReport], total_cycles: u64, num_cores: usize) -> Self {
        let m = PolicyMetrics::calculate(reports, SchedPolicy::default(), total_cycles, num_cores);
        Self {
            num_cores,
            avg_waiting: m.avg_waiting,
            avg_turnaround: m.avg_turnaround,
            cpu_utilization: m.cpu_utilization,
            throughput: m.throughput,
            speedup: 1.0,
        }
    }

    /// Builds a row relative to `baseline`.
    pub fn versus(
        baseline: &Self,
        reports: &[PcbReport],
        total_cycles: u64,
        num_cores: usize,
    ) -> Self {
        let mut row = Self::baseline(reports, total_cycles, num_cores);
        row.speedup = if baseline.throughput > 0.0 {
            row.throughput / baseline.throughput
        } else {
            0.0
        };
        row
    }

    /// Writes `core_comparison.csv`: one row per compared core count.
    pub fn write_csv(rows: &[Self], path: &Path) -> io::Result<()> {
        let mut f = File::create(path)?;
        writeln!(
            f,
            "num_cores,avg_waiting,avg_turnaround,cpu_utilization,throughput,speedup"
        )?;
        for r in rows {
            writeln!(
                f,
                "{},{:.2},{:.2},{:.2},{:.6},{:.3}",
                r.num_cores,
                r.avg_waiting,
                r.avg_turnaround,
                r.cpu_utilization,
                r.throughput,
                r.speedup
            )?;
        }
        Ok(())
    }
}
