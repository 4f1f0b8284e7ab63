//! End-to-end simulation tests: whole runs through the tick loop.

use mcsim_core::common::Word;
use mcsim_core::config::Config;
use mcsim_core::io::IoManager;
use mcsim_core::isa::decode::encode;
use mcsim_core::isa::opcodes;
use mcsim_core::process::{Pcb, State};
use mcsim_core::sched::SchedPolicy;
use mcsim_core::sim::{admit_all, Simulation};
use pretty_assertions::assert_eq;

use crate::common::{nop_program, program_pcb};

fn test_config(policy: SchedPolicy, cores: usize) -> Config {
    let mut config = Config::default();
    config.general.policy = policy;
    config.general.num_cores = cores;
    config.general.max_ticks = 100_000;
    config.memory.primary_words = 1024;
    config.memory.secondary_words = 1024;
    config.memory.partition_words = 128;
    config.memory.cache_capacity = 16;
    config
}

fn run(policy: SchedPolicy, cores: usize, pcbs: Vec<Pcb>) -> mcsim_core::sim::RunSummary {
    let config = test_config(policy, cores);
    let io = IoManager::new(&config.io);
    Simulation::new(&config, admit_all(pcbs), io).run()
}

/// One core, one `[nop, nop, nop, halt]` program: it finishes with at least
/// issue + drain pipeline cycles.
#[test]
fn single_nop_program_drains() {
    let summary = run(
        SchedPolicy::Fcfs,
        1,
        vec![program_pcb(1, vec![], nop_program(3))],
    );
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.reports.len(), 1);
    assert!(summary.reports[0].pipeline_cycles >= 8);
    assert!(summary.total_ticks >= 8);
}

/// Timestamps are consistent once set: finish >= start >= arrival.
#[test]
fn timestamps_are_ordered() {
    let pcbs = (1..=3)
        .map(|pid| program_pcb(pid, vec![], nop_program(5)))
        .collect();
    let summary = run(SchedPolicy::Fcfs, 2, pcbs);

    assert_eq!(summary.completed, 3);
    for r in &summary.reports {
        assert!(r.finish >= r.start, "pid {}", r.pid);
        assert!(r.start >= r.arrival, "pid {}", r.pid);
        assert_eq!(r.turnaround, r.finish - r.arrival);
    }
}

/// More processes than partitions: deferred allocations are retried and
/// everything still completes.
#[test]
fn deferred_allocations_complete() {
    // 1024-word store in 128-word partitions = 8 slots; 12 processes.
    let pcbs = (1..=12)
        .map(|pid| program_pcb(pid, vec![], nop_program(4)))
        .collect();
    let summary = run(SchedPolicy::Fcfs, 4, pcbs);
    assert_eq!(summary.completed, 12);
}

/// An image too large for any partition is dropped instead of wedging the
/// run.
#[test]
fn oversized_image_is_dropped() {
    let pcbs = vec![
        program_pcb(1, vec![0; 200], nop_program(4)),
        program_pcb(2, vec![], nop_program(4)),
    ];
    let summary = run(SchedPolicy::Fcfs, 1, pcbs);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.reports.len(), 2);
}

/// A program that prints blocks, waits out the device, is re-admitted, and
/// finishes with I/O cycles on the books.
#[test]
fn print_round_trips_through_io() {
    let code: Vec<Word> = vec![
        encode::itype(opcodes::OP_PRINT, 0, 0, 0),
        opcodes::END_SENTINEL,
    ];
    let summary = run(SchedPolicy::Fcfs, 1, vec![program_pcb(1, vec![], code)]);

    assert_eq!(summary.completed, 1);
    assert!(summary.reports[0].io_cycles > 0);
    assert!(summary.reports[0].pipeline_cycles > 0);
}

/// Round-robin with a small quantum still finishes long programs, and no
/// process runs more than `quantum` issue ticks per dispatch.
#[test]
fn round_robin_completes_under_small_quantum() {
    let pcbs: Vec<Pcb> = (1..=3)
        .map(|pid| {
            let mut pcb = program_pcb(pid, vec![], nop_program(20));
            pcb.quantum = 5;
            pcb
        })
        .collect();
    let summary = run(SchedPolicy::Rr, 1, pcbs);
    assert_eq!(summary.completed, 3);
}

/// The computation result of a small program is visible in its registers
/// when the run drains.
#[test]
fn computation_result_is_committed() {
    let mut code = vec![
        encode::itype(opcodes::OP_ADDI, 0, 1, 30),
        encode::nop(),
        encode::nop(),
        encode::nop(),
        encode::itype(opcodes::OP_ADDI, 1, 2, 12),
    ];
    code.extend(nop_program(3));

    let config = test_config(SchedPolicy::Fcfs, 1);
    let io = IoManager::new(&config.io);
    let mut sim = Simulation::new(
        &config,
        admit_all(vec![program_pcb(1, vec![], code)]),
        io,
    );
    let mut guard = 0;
    while !sim.drained() {
        sim.tick_once();
        guard += 1;
        assert!(guard < 10_000, "run did not drain");
    }

    let (_, pcb) = sim.procs().iter().next().unwrap();
    assert_eq!(pcb.state, State::Finished);
    assert_eq!(pcb.regs.read(2), 42);
}

/// Per-core accounting covers every tick of the run.
#[test]
fn core_time_buckets_sum_to_run_length() {
    let summary = run(
        SchedPolicy::Fcfs,
        2,
        vec![program_pcb(1, vec![], nop_program(6))],
    );
    for core in &summary.core_reports {
        assert_eq!(
            core.running + core.waiting_io + core.idle,
            summary.total_ticks,
            "core {}",
            core.core_id
        );
    }
}

/// Temporal snapshots are captured on the configured interval.
#[test]
fn temporal_snapshots_are_collected() {
    let summary = run(
        SchedPolicy::Fcfs,
        1,
        vec![program_pcb(1, vec![], nop_program(30))],
    );
    assert!(!summary.temporal.is_empty());
    let last = summary.temporal.last().unwrap();
    assert!(last.tick <= summary.total_ticks);
}
