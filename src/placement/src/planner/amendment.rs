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

//! The two-phase `plan()`/`commit()` shape: the Global Execution Plan is
//! mutated only after path selection and sub-plan computation have produced
//! a `ComputedSubQueryPlans` map entirely in memory. `plan()` never touches
//! the topology's `available_resource_slots` or the Global Execution Plan;
//! `commit()` performs the actual occupation and is the only phase that can
//! fail with `ResourceExhausted` after sub-plans already exist in memory.

use std::collections::HashSet;

use nes_common::ids::{IdGenerator, OperatorId, SharedQueryId, WorkerId};
use nes_plan::QueryPlan;
use nes_topology::Topology;
use tracing::{info, warn};

use crate::error::PlacementError;
use crate::mode::{PlacementAmendmentMode, RetryConfig};
use crate::planner::network::insert_network_operators;
use crate::planner::path_selection::{select_path, PathSelection};
use crate::planner::subplan::{compute_sub_plans, ComputedSubQueryPlans};

pub struct PlacementRequest {
    pub shared_query_id: SharedQueryId,
    pub pinned_upstream: Vec<OperatorId>,
    pub pinned_downstream: Vec<OperatorId>,
    pub pinned_upstream_workers: HashSet<WorkerId>,
    pub pinned_downstream_workers: HashSet<WorkerId>,
    pub mode: PlacementAmendmentMode,
}

/// The computed-but-uncommitted result of a placement pass: a caller can
/// inspect it, discard it (dropping any PESSIMISTIC locks it holds), or pass
/// it to [`commit`].
pub struct PlacementAmendmentPlan {
    pub sub_plans: ComputedSubQueryPlans,
    pub worker_node_ids_in_bfs: Vec<WorkerId>,
    mode: PlacementAmendmentMode,
    held_locks: Vec<(WorkerId, nes_topology::TopologyNodeWLock)>,
}

/// `plan()`: path selection + sub-plan computation + network-operator
/// insertion, entirely in memory. Per `spec.md` §4.C "Error semantics",
/// `PathUnavailable`/`ResourceExhausted` here require no rollback since
/// nothing outside this value has been mutated yet (PESSIMISTIC locks are
/// released automatically if the caller drops the returned plan without
/// committing).
pub fn plan(
    topology: &Topology,
    query_plan: &QueryPlan,
    request: &PlacementRequest,
    retry: &RetryConfig,
    id_gen: &IdGenerator,
) -> Result<PlacementAmendmentPlan, PlacementError> {
    let PathSelection {
        worker_node_ids_in_bfs,
        held_locks,
    } = select_path(
        topology,
        request.mode,
        &request.pinned_upstream_workers,
        &request.pinned_downstream_workers,
        retry,
    )?;

    let sub_plans = compute_sub_plans(query_plan, &request.pinned_upstream, &request.pinned_downstream, id_gen)?;
    let sub_plans = insert_network_operators(topology, sub_plans, request.shared_query_id, id_gen)?;

    Ok(PlacementAmendmentPlan {
        sub_plans,
        worker_node_ids_in_bfs,
        mode: request.mode,
        held_locks,
    })
}

/// `commit()` (`updateExecutionNodes`): occupies one resource slot per
/// operator placed on each worker. PESSIMISTIC reuses the locks already held
/// from `plan()`; OPTIMISTIC acquires and validates each worker's lock here,
/// for the first time, per `spec.md`'s "validate that `occupySlots` still
/// succeeds" OPTIMISTIC rule. On any failure, every slot occupied earlier in
/// this call is released before returning, leaving the topology exactly as
/// it was found (rollback, per §4.C "Error semantics").
pub fn commit(topology: &Topology, mut amendment: PlacementAmendmentPlan) -> Result<ComputedSubQueryPlans, PlacementError> {
    let mut locks_by_worker: std::collections::HashMap<WorkerId, nes_topology::TopologyNodeWLock> =
        amendment.held_locks.drain(..).collect();

    let mut occupied: Vec<(WorkerId, u32)> = Vec::new();

    for (&worker, sub_plans) in &amendment.sub_plans {
        let slots_needed: u32 = sub_plans.iter().map(|p| p.arena.len() as u32).sum();
        if slots_needed == 0 {
            continue;
        }

        let occupy_result = if let Some(guard) = locks_by_worker.get_mut(&worker) {
            guard.occupy_slots(slots_needed)
        } else {
            match topology.lock_topology_node(worker) {
                Some(mut guard) => {
                    let result = guard.occupy_slots(slots_needed);
                    // keep the lock (even on failure, nothing to release) until
                    // the whole commit finishes, so it is released exactly once
                    // below alongside every PESSIMISTIC lock.
                    locks_by_worker.insert(worker, guard);
                    result
                }
                None => {
                    rollback(&mut locks_by_worker, &occupied);
                    return Err(PlacementError::ResourceExhausted {
                        worker,
                        requested: slots_needed,
                        available: 0,
                    });
                }
            }
        };

        match occupy_result {
            Ok(()) => occupied.push((worker, slots_needed)),
            Err(e) => {
                warn!(?worker, "occupySlots failed during commit, rolling back");
                rollback(&mut locks_by_worker, &occupied);
                return Err(e.into());
            }
        }
    }

    info!(mode = ?amendment.mode, workers = amendment.sub_plans.len(), "placement amendment committed");
    // Dropping `locks_by_worker` here releases every PESSIMISTIC (and newly
    // acquired OPTIMISTIC) lock back to the topology now that the amendment
    // is durable.
    drop(locks_by_worker);

    Ok(amendment.sub_plans)
}

/// Releases every slot occupied so far in this `commit()` call, using the
/// locks this call already holds rather than re-acquiring them (the node is
/// still locked by us, so a fresh `lock_topology_node` call would simply
/// fail).
fn rollback(locks_by_worker: &mut std::collections::HashMap<WorkerId, nes_topology::TopologyNodeWLock>, occupied: &[(WorkerId, u32)]) {
    for &(worker, slots) in occupied {
        if let Some(guard) = locks_by_worker.get_mut(&worker) {
            guard.release_slots(slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::{OperatorKind, OperatorNode, QuerySubPlan};
    use nes_topology::{Capacities, TopologyNode};

    fn sub_plan_with(worker: WorkerId, id: u64, n_ops: u64) -> QuerySubPlan {
        let mut plan = QuerySubPlan::new(nes_common::ids::QuerySubPlanId(id), SharedQueryId(1), worker);
        for i in 0..n_ops {
            plan.arena.insert(OperatorNode::new(
                OperatorId(id * 100 + i),
                OperatorKind::Source { logical_source_name: "s".into() },
            ));
        }
        plan
    }

    fn plan_with_no_locks(sub_plans: ComputedSubQueryPlans) -> PlacementAmendmentPlan {
        PlacementAmendmentPlan {
            sub_plans,
            worker_node_ids_in_bfs: Vec::new(),
            mode: PlacementAmendmentMode::Optimistic,
            held_locks: Vec::new(),
        }
    }

    /// §8 "Resource non-negativity": when committing a plan whose worker
    /// set spans one worker with enough slots and one without, the failure
    /// on the under-resourced worker must leave the well-resourced worker's
    /// slots exactly as they started — no partial occupation survives a
    /// failed commit.
    #[test]
    fn commit_failure_rolls_back_already_occupied_slots() {
        let topology = Topology::new();
        let w_ok = WorkerId(1);
        let w_short = WorkerId(2);
        topology.add_node(TopologyNode::new(w_ok, "10.0.0.1", 4000, 5, Capacities::new(1 << 20, 1 << 20), 0.99));
        topology.add_node(TopologyNode::new(w_short, "10.0.0.2", 4000, 1, Capacities::new(1 << 20, 1 << 20), 0.99));

        let mut sub_plans: ComputedSubQueryPlans = std::collections::HashMap::new();
        sub_plans.insert(w_ok, vec![sub_plan_with(w_ok, 1, 2)]);
        sub_plans.insert(w_short, vec![sub_plan_with(w_short, 2, 3)]); // needs 3, only 1 available

        let amendment = plan_with_no_locks(sub_plans);
        let result = commit(&topology, amendment);

        assert!(matches!(result, Err(PlacementError::ResourceExhausted { worker, .. }) if worker == w_short));
        let node = topology.find_node_with_id(w_ok).unwrap();
        assert_eq!(node.available_resource_slots(), 5, "rollback must restore the well-resourced worker's slots");
    }

    #[test]
    fn commit_success_occupies_slots_on_every_involved_worker() {
        let topology = Topology::new();
        let w1 = WorkerId(1);
        topology.add_node(TopologyNode::new(w1, "10.0.0.1", 4000, 5, Capacities::new(1 << 20, 1 << 20), 0.99));

        let mut sub_plans: ComputedSubQueryPlans = std::collections::HashMap::new();
        sub_plans.insert(w1, vec![sub_plan_with(w1, 1, 2)]);

        let amendment = plan_with_no_locks(sub_plans);
        commit(&topology, amendment).unwrap();

        let node = topology.find_node_with_id(w1).unwrap();
        assert_eq!(node.available_resource_slots(), 3);
    }
}
