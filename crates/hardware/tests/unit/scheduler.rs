//! Scheduler tests: the four policies, tie-breaks, and ordering properties.

use mcsim_core::process::{ProcId, ProcessTable, State};
use mcsim_core::sched::{SchedPolicy, Scheduler};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::sched_pcb;

/// Builds a table and scheduler from `(priority, burst)` tuples, in order.
fn setup(policy: SchedPolicy, keys: &[(i32, u64)]) -> (ProcessTable, Scheduler, Vec<ProcId>) {
    let mut table = ProcessTable::new();
    let mut sched = Scheduler::new(policy);
    let mut ids = Vec::new();
    for (i, &(priority, burst)) in keys.iter().enumerate() {
        let id = table.insert(sched_pcb(i as i32 + 1, priority, burst));
        sched.add(id, table.get_mut(id));
        ids.push(id);
    }
    (table, sched, ids)
}

fn drain(sched: &mut Scheduler) -> Vec<ProcId> {
    std::iter::from_fn(|| sched.fetch_next()).collect()
}

/// Three processes with wildly different priorities: FCFS ignores them and
/// returns arrival order.
#[test]
fn fcfs_returns_arrival_order() {
    let (_, mut sched, ids) = setup(SchedPolicy::Fcfs, &[(10, 0), (1, 0), (5, 0)]);
    assert_eq!(drain(&mut sched), ids);
}

/// Priorities {1, 5, 3} fetch as 5, 3, 1.
#[test]
fn priority_fetches_highest_first() {
    let (_, mut sched, ids) = setup(SchedPolicy::Priority, &[(1, 0), (5, 0), (3, 0)]);
    assert_eq!(drain(&mut sched), vec![ids[1], ids[2], ids[0]]);
}

/// Burst estimates {100, 50, 75} fetch as 50, 75, 100.
#[test]
fn sjn_fetches_shortest_first() {
    let (_, mut sched, ids) = setup(SchedPolicy::Sjn, &[(0, 100), (0, 50), (0, 75)]);
    assert_eq!(drain(&mut sched), vec![ids[1], ids[2], ids[0]]);
}

#[rstest]
#[case::fcfs(SchedPolicy::Fcfs)]
#[case::rr(SchedPolicy::Rr)]
#[case::priority(SchedPolicy::Priority)]
#[case::sjn(SchedPolicy::Sjn)]
fn equal_keys_keep_insertion_order(#[case] policy: SchedPolicy) {
    let (_, mut sched, ids) = setup(policy, &[(3, 9), (3, 9), (3, 9)]);
    assert_eq!(drain(&mut sched), ids);
}

#[rstest]
#[case::fcfs(SchedPolicy::Fcfs)]
#[case::priority(SchedPolicy::Priority)]
fn fetch_on_empty_returns_none(#[case] policy: SchedPolicy) {
    let mut sched = Scheduler::new(policy);
    assert!(sched.fetch_next().is_none());
    assert!(sched.is_empty());
}

#[test]
fn add_marks_ready() {
    let mut table = ProcessTable::new();
    let mut sched = Scheduler::new(SchedPolicy::Fcfs);
    let id = table.insert(sched_pcb(1, 0, 0));
    table.get_mut(id).state = State::Blocked;

    sched.unblock(id, table.get_mut(id));
    assert_eq!(table.get(id).state, State::Ready);
    assert_eq!(sched.len(), 1);
}

#[test]
fn set_policy_keeps_queued_processes() {
    let (_, mut sched, ids) = setup(SchedPolicy::Fcfs, &[(1, 30), (9, 10), (5, 20)]);
    sched.set_policy(SchedPolicy::Priority);
    assert_eq!(sched.fetch_next(), Some(ids[1]));
    sched.set_policy(SchedPolicy::Sjn);
    assert_eq!(sched.fetch_next(), Some(ids[2]));
    assert_eq!(sched.fetch_next(), Some(ids[0]));
}

proptest! {
    /// FCFS: the k-th fetched process is the k-th added, for any key mix.
    #[test]
    fn fcfs_is_arrival_order(keys in prop::collection::vec((0i32..100, 0u64..100), 0..40)) {
        let (_, mut sched, ids) = setup(SchedPolicy::Fcfs, &keys);
        prop_assert_eq!(drain(&mut sched), ids);
    }

    /// Priority: each fetched process has the highest priority of what was
    /// still queued.
    #[test]
    fn priority_never_skips_a_higher_one(keys in prop::collection::vec((0i32..10, 0u64..1), 1..30)) {
        let (table, mut sched, _) = setup(SchedPolicy::Priority, &keys);
        let mut remaining: Vec<i32> = keys.iter().map(|&(p, _)| p).collect();
        while let Some(id) = sched.fetch_next() {
            let fetched = table.get(id).priority;
            let max = *remaining.iter().max().unwrap();
            prop_assert_eq!(fetched, max);
            let pos = remaining.iter().position(|&p| p == fetched).unwrap();
            let _ = remaining.remove(pos);
        }
        prop_assert!(remaining.is_empty());
    }

    /// SJN: each fetched process has the smallest burst of what was queued.
    #[test]
    fn sjn_never_skips_a_shorter_one(keys in prop::collection::vec((0i32..1, 0u64..50), 1..30)) {
        let (table, mut sched, _) = setup(SchedPolicy::Sjn, &keys);
        let mut remaining: Vec<u64> = keys.iter().map(|&(_, b)| b).collect();
        while let Some(id) = sched.fetch_next() {
            let fetched = table.get(id).burst_estimate;
            let min = *remaining.iter().min().unwrap();
            prop_assert_eq!(fetched, min);
            let pos = remaining.iter().position(|&b| b == fetched).unwrap();
            let _ = remaining.remove(pos);
        }
        prop_assert!(remaining.is_empty());
    }
}
