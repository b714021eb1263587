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

//! Sub-plan computation, per `spec.md` §4.C "Computing Sub-Plans". Walks the
//! logical plan strict-BFS from the pinned upstream operators, placing each
//! operator onto its pinned worker while coalescing it into existing
//! sub-plans on that worker wherever its neighbors are already there.

use std::collections::{HashMap, HashSet, VecDeque};

use nes_common::ids::{OperatorId, QuerySubPlanId, SharedQueryId, WorkerId};
use nes_common::property::{PropertyKey, PropertyValue};
use nes_plan::{LifecycleState, OperatorNode, QueryPlan, QuerySubPlan};

use crate::error::PlacementError;

pub type ComputedSubQueryPlans = HashMap<WorkerId, Vec<QuerySubPlan>>;

fn pinned_worker(op: &OperatorNode) -> Option<WorkerId> {
    op.header.properties.get(PropertyKey::PinnedWorkerId).and_then(PropertyValue::as_worker)
}

/// Finds the index of a sub-plan on `worker` that already contains an
/// operator in `neighbor_ids`.
fn find_connected_subplan_indices(plans: &[QuerySubPlan], neighbor_ids: &[OperatorId]) -> Vec<usize> {
    let mut indices = Vec::new();
    for (idx, plan) in plans.iter().enumerate() {
        if neighbor_ids.iter().any(|id| plan.contains(*id)) && !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    indices
}

/// Iterate operators strict-BFS starting from `pinned_upstream`, stopping
/// expansion past any operator in `pinned_downstream`. Returns the placed
/// sub-plans grouped by worker.
pub fn compute_sub_plans(
    query_plan: &QueryPlan,
    pinned_upstream: &[OperatorId],
    pinned_downstream: &[OperatorId],
    id_gen: &nes_common::ids::IdGenerator,
) -> Result<ComputedSubQueryPlans, PlacementError> {
    let shared_query_id: SharedQueryId = query_plan.shared_query_id;
    let downstream_set: HashSet<OperatorId> = pinned_downstream.iter().copied().collect();

    let mut plans: ComputedSubQueryPlans = HashMap::new();
    let mut visited: HashSet<OperatorId> = HashSet::new();
    let mut queue: VecDeque<OperatorId> = pinned_upstream.iter().copied().collect();

    while let Some(op_id) = queue.pop_front() {
        if !visited.insert(op_id) {
            continue;
        }
        let op = query_plan.arena.get(op_id)?.clone();
        let worker = pinned_worker(&op).ok_or_else(|| {
            PlacementError::Corruption(format!("operator {op_id} has no PINNED_WORKER_ID set"))
        })?;

        place_operator(&mut plans, worker, op.clone(), shared_query_id, id_gen)?;

        if downstream_set.contains(&op_id) {
            continue;
        }
        for parent in &op.header.parents {
            queue.push_back(*parent);
        }
    }

    Ok(plans)
}

fn place_operator(
    plans: &mut ComputedSubQueryPlans,
    worker: WorkerId,
    mut op: OperatorNode,
    shared_query_id: SharedQueryId,
    id_gen: &nes_common::ids::IdGenerator,
) -> Result<(), PlacementError> {
    let op_id = op.id();
    let children = op.header.children.clone();
    let parents = op.header.parents.clone();
    let was_placed = op.header.lifecycle == LifecycleState::Placed;

    let worker_plans = plans.entry(worker).or_default();
    let upstream_matches = find_connected_subplan_indices(worker_plans, &children);
    let downstream_matches = find_connected_subplan_indices(worker_plans, &parents);

    let mut touched: Vec<usize> = upstream_matches.iter().chain(downstream_matches.iter()).copied().collect();
    touched.sort_unstable();
    touched.dedup();

    let total_children = children.len();
    let co_located_count;

    if touched.is_empty() {
        let sub_plan_id = if was_placed {
            QuerySubPlanId::INVALID
        } else {
            id_gen.next_sub_plan_id()
        };
        let mut sub_plan = QuerySubPlan::new(sub_plan_id, shared_query_id, worker);
        co_located_count = 0;
        sub_plan.arena.insert(op.clone());
        worker_plans.push(sub_plan);
    } else {
        let primary_idx = touched[0];
        for &idx in touched.iter().skip(1).rev() {
            let other = worker_plans.remove(idx);
            worker_plans[primary_idx].merge(other);
        }
        let primary = &mut worker_plans[primary_idx];
        for &child in &children {
            if primary.contains(child) {
                let _ = primary.arena.add_edge(child, op_id);
            }
        }
        primary.arena.insert(op.clone());
        for &parent in &parents {
            if primary.contains(parent) {
                let _ = primary.arena.add_edge(op_id, parent);
            }
        }
        co_located_count = children.iter().filter(|c| primary.contains(**c)).count();
    }

    op.header
        .properties
        .set(PropertyKey::CoLocatedUpstreamOperators, PropertyValue::Bool(co_located_count == total_children));
    op.header.properties.set(PropertyKey::PinnedWorkerId, PropertyValue::Worker(worker));

    // re-insert with the updated property bag (arena insert above used the
    // pre-flag clone; operators are cheap small structs so this is a cheap
    // overwrite by id, not a structural change).
    if let Some(plan) = plans.get_mut(&worker) {
        for sub_plan in plan.iter_mut() {
            if sub_plan.contains(op_id) {
                if let Ok(existing) = sub_plan.arena.get_mut(op_id) {
                    existing.header.properties = op.header.properties.clone();
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::IdGenerator;
    use nes_plan::OperatorKind;

    fn pinned(id: u64, kind: OperatorKind, worker: WorkerId) -> OperatorNode {
        let mut op = OperatorNode::new(OperatorId(id), kind);
        op.header.properties.set(PropertyKey::PinnedWorkerId, PropertyValue::Worker(worker));
        op
    }

    /// `spec.md` §8 scenario 1: `source(car)@W1 ∪ source(truck)@W2 ->
    /// sink@W0`. Expects three sub-plans, one per worker, each a singleton
    /// (`Union` is pinned to W0 alongside the sink and is reachable from
    /// both pinned upstream operators via strict BFS).
    fn two_source_union_plan() -> (QueryPlan, Vec<OperatorId>, Vec<OperatorId>) {
        let w0 = WorkerId(0);
        let w1 = WorkerId(1);
        let w2 = WorkerId(2);

        let car = pinned(1, OperatorKind::Source { logical_source_name: "car".into() }, w1);
        let truck = pinned(2, OperatorKind::Source { logical_source_name: "truck".into() }, w2);
        let union = pinned(3, OperatorKind::Union, w0);
        let sink = pinned(4, OperatorKind::Sink { logical_sink_name: "out".into() }, w0);

        let mut plan = QueryPlan::new(SharedQueryId(1));
        plan.arena.insert(car);
        plan.arena.insert(truck);
        plan.arena.insert(union);
        plan.arena.insert(sink);
        plan.arena.add_edge(OperatorId(1), OperatorId(3)).unwrap();
        plan.arena.add_edge(OperatorId(2), OperatorId(3)).unwrap();
        plan.arena.add_edge(OperatorId(3), OperatorId(4)).unwrap();

        (plan, vec![OperatorId(1), OperatorId(2)], vec![OperatorId(4)])
    }

    #[test]
    fn two_source_union_yields_one_sub_plan_per_worker() {
        let (plan, pinned_upstream, pinned_downstream) = two_source_union_plan();
        let id_gen = IdGenerator::starting_at(100);

        let sub_plans = compute_sub_plans(&plan, &pinned_upstream, &pinned_downstream, &id_gen).unwrap();

        assert_eq!(sub_plans.len(), 3, "expected one worker group per {{W0, W1, W2}}");
        for worker in [WorkerId(0), WorkerId(1), WorkerId(2)] {
            let plans = sub_plans.get(&worker).unwrap_or_else(|| panic!("missing plans for {worker:?}"));
            assert_eq!(plans.len(), 1, "each worker hosts exactly one sub-plan in this scenario");
        }

        // The union and the sink share a worker (W0) and are connected
        // upstream-less from this BFS's perspective (their upstreams live on
        // other workers), so they land in the same single-worker sub-plan.
        let w0_plan = &sub_plans.get(&WorkerId(0)).unwrap()[0];
        assert!(w0_plan.contains(OperatorId(3)));
        assert!(w0_plan.contains(OperatorId(4)));

        // Neither source could co-locate its (nonexistent) upstream, so both
        // trivially satisfy `CO_LOCATED_UPSTREAM_OPERATORS` (zero children).
        let w1_plan = &sub_plans.get(&WorkerId(1)).unwrap()[0];
        let car = w1_plan.arena.get(OperatorId(1)).unwrap();
        assert!(car.header.properties.flag(PropertyKey::CoLocatedUpstreamOperators));

        // The union operator's upstreams (car, truck) are on different
        // workers, so it must NOT be flagged co-located: the network-stitch
        // phase needs to see this to insert the sink/source pairs.
        let union = w0_plan.arena.get(OperatorId(3)).unwrap();
        assert!(!union.header.properties.flag(PropertyKey::CoLocatedUpstreamOperators));
    }
}
