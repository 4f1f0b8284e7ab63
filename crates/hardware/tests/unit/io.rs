//! I/O manager tests: registration, stepping, completion, and the
//! ready-callback.

use std::sync::{Arc, Mutex};

use mcsim_core::config::IoConfig;
use mcsim_core::io::{IoManager, IoOp, IoRequest};
use mcsim_core::process::{Counters, ProcessTable, State};
use pretty_assertions::assert_eq;

use crate::common::sched_pcb;

fn manager() -> IoManager {
    IoManager::new(&IoConfig {
        latency: 100,
        step_delta: 10,
    })
}

/// One request of cost 50 with latency 50: remaining is 100, so ten steps of
/// delta 10 complete it. The process becomes ready, accrues I/O cycles, and
/// the callback fires exactly once.
#[test]
fn block_to_ready_after_enough_steps() {
    let mut table = ProcessTable::new();
    let id = table.insert(sched_pcb(1, 0, 0));

    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let mut io = manager();
    io.set_ready_callback(Box::new(move |pid| sink.lock().unwrap().push(pid)));

    let request = IoRequest::print(id, "hello", 50);
    io.register(id, table.get_mut(id), vec![request], 50);
    assert_eq!(table.get(id).state, State::Blocked);
    assert_eq!(io.pending_count(), 1);

    for step in 0..10 {
        assert_eq!(io.pending_count(), 1, "still pending after {step} steps");
        io.step(&mut table);
    }

    assert_eq!(io.pending_count(), 0);
    assert_eq!(table.get(id).state, State::Ready);
    assert!(Counters::get(&table.get(id).counters.io_cycles) > 0);
    assert_eq!(fired.lock().unwrap().as_slice(), &[id]);
}

#[test]
fn zero_cost_registration_still_takes_one_step() {
    let mut table = ProcessTable::new();
    let id = table.insert(sched_pcb(1, 0, 0));
    let mut io = manager();

    io.register(id, table.get_mut(id), Vec::new(), 0);
    assert_eq!(io.pending_count(), 1);
    io.step(&mut table);
    assert_eq!(io.pending_count(), 0);
    assert_eq!(table.get(id).state, State::Ready);
}

/// A request with no owning process executes fire-and-forget without
/// touching the table.
#[test]
fn orphan_request_completes_without_a_process() {
    let mut table = ProcessTable::new();
    let mut io = manager();

    io.add_request(IoRequest {
        op: IoOp::Print,
        message: "orphan".into(),
        proc: None,
        cost_ticks: 5,
    });
    assert_eq!(io.pending_count(), 1);
    io.step(&mut table);
    assert_eq!(io.pending_count(), 0);
}

#[test]
fn unknown_operation_is_swallowed() {
    let mut table = ProcessTable::new();
    let id = table.insert(sched_pcb(1, 0, 0));
    let mut io = manager();

    let request = IoRequest {
        op: IoOp::Other("seek".into()),
        message: "sector 9".into(),
        proc: Some(id),
        cost_ticks: 1,
    };
    io.register(id, table.get_mut(id), vec![request], 0);
    io.step(&mut table);
    assert_eq!(table.get(id).state, State::Ready);
}

/// Entries progress independently: shorter service completes first.
#[test]
fn independent_entries_complete_in_cost_order() {
    let mut table = ProcessTable::new();
    let a = table.insert(sched_pcb(1, 0, 0));
    let b = table.insert(sched_pcb(2, 0, 0));

    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let mut io = manager();
    io.set_ready_callback(Box::new(move |pid| sink.lock().unwrap().push(pid)));

    io.register(a, table.get_mut(a), vec![IoRequest::print(a, "slow", 40)], 0);
    io.register(b, table.get_mut(b), vec![IoRequest::print(b, "fast", 10)], 0);

    io.step(&mut table); // delta 10: b completes
    assert_eq!(fired.lock().unwrap().as_slice(), &[b]);
    for _ in 0..3 {
        io.step(&mut table);
    }
    assert_eq!(fired.lock().unwrap().as_slice(), &[b, a]);
}
