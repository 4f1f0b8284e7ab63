//! Multicore simulator CLI.
//!
//! This binary loads JSON process descriptions, runs the simulation under
//! the requested scheduling policy and core count, and writes the metric
//! artifacts under `output/policies/<policy>_<N>cores/`. When more than one
//! core is requested, a quiet single-core baseline pass over the same files
//! fills the speedup column of the core comparison.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mcsim_core::config::Config;
use mcsim_core::io::IoManager;
use mcsim_core::metrics::{CoreComparison, CoreReport, PcbReport, PolicyMetrics, TemporalCollector};
use mcsim_core::process::loader;
use mcsim_core::sched::SchedPolicy;
use mcsim_core::sim::{admit_all, RunSummary, Simulation};

#[derive(Parser, Debug)]
#[command(
    name = "mcsim",
    version,
    about = "Multicore CPU and memory-hierarchy simulator",
    long_about = "Runs JSON-described processes through a pool of pipelined cores with a \
                  shared cache, fixed memory partitions, and an asynchronous I/O queue.\n\n\
                  Examples:\n  mcsim\n  mcsim rr 2\n  mcsim priority 4 demo_counter.json"
)]
struct Cli {
    /// Scheduling policy: fcfs, rr, priority, or sjn.
    #[arg(default_value_t = SchedPolicy::Fcfs)]
    policy: SchedPolicy,

    /// Number of cores (clamped to 1..=8).
    #[arg(default_value_t = 4)]
    ncores: usize,

    /// Process files; defaults to every *.json under ./processes or
    /// ../processes.
    files: Vec<String>,

    /// Root directory for result artifacts.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let files = loader::resolve_process_files(&cli.files);
    if files.is_empty() {
        eprintln!("error: no process files found (looked in ./processes and ../processes)");
        process::exit(1);
    }

    let mut config = Config::default();
    config.general.policy = cli.policy;
    config.general.num_cores = cli.ncores.clamp(1, 8);
    config.output.root = cli.output;

    let run_dir = config.output.run_dir(cli.policy, config.general.num_cores);
    if let Err(err) = std::fs::create_dir_all(&run_dir) {
        eprintln!("error: cannot create {}: {err}", run_dir.display());
        process::exit(1);
    }

    let Some(summary) = simulate(&config, &files, Some(run_dir.as_path())) else {
        eprintln!("error: no usable process descriptions in the given files");
        process::exit(1);
    };

    PcbReport::print_console(&summary.reports);
    CoreReport::print_console(&summary.core_reports);
    write_artifacts(&config, &run_dir, &summary);
    write_comparison(&config, &run_dir, &summary, &files);

    println!(
        "\n{} processes completed in {} ticks; artifacts under {}",
        summary.completed,
        summary.total_ticks,
        run_dir.display()
    );
}

/// Loads the files and runs one simulation; `None` when nothing loaded.
///
/// With an output directory, completed I/O writes its log there; the quiet
/// baseline pass runs without one.
fn simulate(config: &Config, files: &[PathBuf], out_dir: Option<&Path>) -> Option<RunSummary> {
    let pcbs = loader::load_all(files);
    if pcbs.is_empty() {
        return None;
    }

    let io = match out_dir {
        Some(dir) => IoManager::with_output_dir(&config.io, dir),
        None => IoManager::new(&config.io),
    };
    let sim = Simulation::new(config, admit_all(pcbs), io);
    Some(sim.run())
}

/// Writes the per-run artifacts, logging and continuing on failure.
fn write_artifacts(config: &Config, dir: &Path, summary: &RunSummary) {
    let num_cores = config.general.num_cores;
    let aggregate = PolicyMetrics::calculate(
        &summary.reports,
        config.general.policy,
        summary.total_ticks,
        num_cores,
    );

    let writes: [(&str, std::io::Result<()>); 5] = [
        (
            "metrics.csv",
            PcbReport::write_csv(&summary.reports, &dir.join("metrics.csv")),
        ),
        (
            "metrics.json",
            PcbReport::write_json(&summary.reports, &dir.join("metrics.json")),
        ),
        (
            "core_metrics.csv",
            CoreReport::write_csv(&summary.core_reports, &dir.join("core_metrics.csv")),
        ),
        (
            "policy_metrics.csv",
            aggregate.write_csv(&dir.join("policy_metrics.csv")),
        ),
        (
            "temporal_metrics.csv",
            TemporalCollector::write_csv(&summary.temporal, &dir.join("temporal_metrics.csv")),
        ),
    ];
    for (name, result) in writes {
        if let Err(err) = result {
            warn!("cannot write {name}: {err}");
        }
    }
}

/// Writes `core_comparison.csv`, running a single-core baseline when needed.
fn write_comparison(config: &Config, dir: &Path, summary: &RunSummary, files: &[PathBuf]) {
    let num_cores = config.general.num_cores;

    let rows = if num_cores == 1 {
        vec![CoreComparison::baseline(
            &summary.reports,
            summary.total_ticks,
            1,
        )]
    } else {
        let mut baseline_config = config.clone();
        baseline_config.general.num_cores = 1;
        let Some(base) = simulate(&baseline_config, files, None) else {
            warn!("baseline pass loaded no processes; skipping core comparison");
            return;
        };
        let baseline = CoreComparison::baseline(&base.reports, base.total_ticks, 1);
        let multi =
            CoreComparison::versus(&baseline, &summary.reports, summary.total_ticks, num_cores);
        vec![baseline, multi]
    };

    if let Err(err) = CoreComparison::write_csv(&rows, &dir.join("core_comparison.csv")) {
        warn!("cannot write core_comparison.csv: {err}");
    }
}
