// Copyright 2026 The NebulaStream-rs Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Path selection and lock discipline, per `spec.md` §4.C "Path Selection".
//! `workerNodeIdsInBFS` is recorded regardless of mode: PESSIMISTIC uses it to
//! know what to unlock on rollback, OPTIMISTIC uses it later during
//! `updateExecutionNodes` to lock-and-validate one node at a time.

use std::collections::HashSet;
use std::thread;

use nes_common::ids::WorkerId;
use nes_topology::{find_path_between, Topology, TopologyNodeWLock};
use tracing::{debug, warn};

use crate::error::PlacementError;
use crate::mode::{PlacementAmendmentMode, RetryConfig};

/// Result of path selection: the BFS-ordered node list every later phase
/// (sub-plan computation, network insertion, `updateExecutionNodes`) walks
/// over, plus any locks already held (non-empty only in PESSIMISTIC mode).
pub struct PathSelection {
    pub worker_node_ids_in_bfs: Vec<WorkerId>,
    pub held_locks: Vec<(WorkerId, TopologyNodeWLock)>,
}

pub fn select_path(
    topology: &Topology,
    mode: PlacementAmendmentMode,
    upstream: &HashSet<WorkerId>,
    downstream: &HashSet<WorkerId>,
    retry: &RetryConfig,
) -> Result<PathSelection, PlacementError> {
    let dag = find_path_between(topology, upstream, downstream);
    if dag.is_empty() {
        return Err(PlacementError::PathUnavailable);
    }

    match mode {
        PlacementAmendmentMode::Optimistic => Ok(PathSelection {
            worker_node_ids_in_bfs: dag.bfs_order,
            held_locks: Vec::new(),
        }),
        PlacementAmendmentMode::Pessimistic => {
            let backoff = retry.path_selection_backoff();
            for attempt in 0..retry.max_path_selection_retries {
                match try_lock_all(topology, &dag.bfs_order) {
                    Ok(locks) => {
                        return Ok(PathSelection {
                            worker_node_ids_in_bfs: dag.bfs_order,
                            held_locks: locks,
                        })
                    }
                    Err(failed_at) => {
                        warn!(attempt, ?failed_at, "pessimistic lock acquisition failed, retrying");
                        thread::sleep(backoff.wait_for_attempt(attempt));
                    }
                }
            }
            Err(PlacementError::RetriesExhausted(retry.max_path_selection_retries))
        }
    }
}

/// Attempts to acquire write locks on every node in `bfs_order`, in order. On
/// the first failure, releases everything acquired so far in reverse order
/// (by dropping the guards) and returns the id that failed.
fn try_lock_all(topology: &Topology, bfs_order: &[WorkerId]) -> Result<Vec<(WorkerId, TopologyNodeWLock)>, WorkerId> {
    let mut locks = Vec::with_capacity(bfs_order.len());
    for &id in bfs_order {
        match topology.lock_topology_node(id) {
            Some(guard) => locks.push((id, guard)),
            None => {
                debug!(?id, "lock unavailable, releasing held locks in reverse order");
                while let Some(lock) = locks.pop() {
                    drop(lock);
                }
                return Err(id);
            }
        }
    }
    Ok(locks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_topology::{Capacities, TopologyNode};

    fn topo() -> Topology {
        let t = Topology::new();
        t.add_node(TopologyNode::new(WorkerId(1), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        t.add_node(TopologyNode::new(WorkerId(2), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        t.add_link(WorkerId(1), WorkerId(2));
        t
    }

    #[test]
    fn pessimistic_acquires_all_locks_in_bfs_order() {
        let t = topo();
        let up: HashSet<_> = [WorkerId(1)].into_iter().collect();
        let down: HashSet<_> = [WorkerId(2)].into_iter().collect();
        let retry = RetryConfig::default();
        let selection = select_path(&t, PlacementAmendmentMode::Pessimistic, &up, &down, &retry).unwrap();
        assert_eq!(selection.held_locks.len(), 2);
        assert!(t.lock_topology_node(WorkerId(1)).is_none());
    }

    #[test]
    fn optimistic_holds_no_locks() {
        let t = topo();
        let up: HashSet<_> = [WorkerId(1)].into_iter().collect();
        let down: HashSet<_> = [WorkerId(2)].into_iter().collect();
        let retry = RetryConfig::default();
        let selection = select_path(&t, PlacementAmendmentMode::Optimistic, &up, &down, &retry).unwrap();
        assert!(selection.held_locks.is_empty());
        assert!(t.lock_topology_node(WorkerId(1)).is_some());
    }

    #[test]
    fn unreachable_pair_fails_immediately() {
        let t = Topology::new();
        t.add_node(TopologyNode::new(WorkerId(1), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        t.add_node(TopologyNode::new(WorkerId(2), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        let up: HashSet<_> = [WorkerId(1)].into_iter().collect();
        let down: HashSet<_> = [WorkerId(2)].into_iter().collect();
        let retry = RetryConfig::default();
        assert!(matches!(
            select_path(&t, PlacementAmendmentMode::Optimistic, &up, &down, &retry),
            Err(PlacementError::PathUnavailable)
        ));
    }
}
