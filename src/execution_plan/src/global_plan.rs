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

//! Component E: the Global Execution Plan, per `spec.md` §3/§4.C
//! "Merging and Replacement (reconfiguration)". A [`GlobalExecutionPlan`] is
//! the set of [`ExecutionNode`]s hosting a query, one per topology node a
//! sub-plan was placed on. `apply_amendment` is this crate's
//! `updateExecutionNodes`: it takes the `ComputedSubQueryPlans` a
//! `nes_placement::PlacementPlanner::commit` call produced and folds it into
//! the persistent per-worker state, coalescing overlapping sub-plans on the
//! same node and reconciling network operators against already-placed
//! sub-plans exactly as `spec.md` §4.C describes.

use std::collections::HashMap;

use nes_common::ids::{IdGenerator, QuerySubPlanId, SharedQueryId, WorkerId};
use nes_common::property::{PropertyKey, PropertyValue};
use nes_plan::{OperatorKind, QuerySubPlan};
use nes_placement::planner::{try_merging_sink, try_merging_source, ComputedSubQueryPlans};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExecutionPlanError;
use crate::execution_node::ExecutionNode;
use crate::snapshot::{GlobalExecutionPlanSnapshot, SnapshotEntry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalExecutionPlan {
    nodes: HashMap<WorkerId, ExecutionNode>,
}

impl GlobalExecutionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execution_node(&self, worker_id: WorkerId) -> Result<&ExecutionNode, ExecutionPlanError> {
        self.nodes.get(&worker_id).ok_or(ExecutionPlanError::UnknownWorker(worker_id))
    }

    pub fn hosting_workers(&self, shared_query_id: SharedQueryId) -> Vec<WorkerId> {
        self.nodes
            .iter()
            .filter(|(_, node)| !node.sub_plans(shared_query_id).is_empty())
            .map(|(&id, _)| id)
            .collect()
    }

    /// `updateExecutionNodes`: folds one placement amendment's computed
    /// sub-plans into this plan. Per-worker, per-sub-plan, in this order:
    /// 1. coalesce with an existing sub-plan that already shares an operator
    ///    (the "merging of overlapping plans on the same node" of `spec.md`
    ///    §2's component table);
    /// 2. otherwise, try to reconcile a network sink/source against an
    ///    existing placed counterpart via `tryMergingSource`/`tryMergingSink`
    ///    (`spec.md` §4.C "Merging and Replacement");
    /// 3. otherwise, add it as a new sub-plan under the same shared query id,
    ///    minting a fresh id if the placement phase left it
    ///    `INVALID_QUERY_SUB_PLAN_ID` (meaning the operator it carries was
    ///    already `PLACED` and expected to fuse with step 1/2, but no
    ///    counterpart existed).
    pub fn apply_amendment(&mut self, committed: ComputedSubQueryPlans, id_gen: &IdGenerator) -> Result<(), ExecutionPlanError> {
        for (worker, new_plans) in committed {
            let node = self.nodes.entry(worker).or_insert_with(|| ExecutionNode::new(worker));
            for mut new_plan in new_plans {
                let shared_query_id = new_plan.shared_query_id;
                let existing = node.sub_plans_mut(shared_query_id);

                if let Some(idx) = existing.iter().position(|p| new_plan.arena.ids().any(|id| p.contains(id))) {
                    debug!(?worker, ?shared_query_id, "coalescing overlapping sub-plan");
                    existing[idx].merge(new_plan);
                    existing[idx].mark_for_redeployment();
                    continue;
                }

                if reconcile_network_operators(existing, &new_plan) {
                    info!(?worker, ?shared_query_id, "reconciled network operator against an existing sub-plan");
                    continue;
                }

                if new_plan.id == QuerySubPlanId::INVALID {
                    new_plan.id = id_gen.next_sub_plan_id();
                }
                // A worker that already hosts sub-plans for this shared query
                // is being amended, not freshly deployed to: mark the
                // addition for redeployment rather than leaving the default
                // `MarkedForDeployment` state `QuerySubPlan::new` sets.
                if !existing.is_empty() {
                    new_plan.mark_for_redeployment();
                }
                existing.push(new_plan);
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> GlobalExecutionPlanSnapshot {
        let mut entries = Vec::new();
        for (&worker_id, node) in &self.nodes {
            for shared_query_id in node.shared_query_ids() {
                for sub_plan in node.sub_plans(shared_query_id) {
                    entries.push(SnapshotEntry {
                        shared_query_id,
                        worker_id,
                        sub_plan: sub_plan.clone(),
                    });
                }
            }
        }
        GlobalExecutionPlanSnapshot { entries }
    }

    pub fn restore(snapshot: GlobalExecutionPlanSnapshot) -> Self {
        let mut plan = Self::new();
        for entry in snapshot.entries {
            let node = plan.nodes.entry(entry.worker_id).or_insert_with(|| ExecutionNode::new(entry.worker_id));
            node.sub_plans_mut(entry.shared_query_id).push(entry.sub_plan);
        }
        plan
    }
}

/// Attempts to fuse `new_plan`'s root (if a `NetworkSink`) or leaf (if a
/// `NetworkSource`) into a matching network operator already present in
/// `existing`, per `tryMergingSource`/`tryMergingSink` in `spec.md` §4.C.
/// Returns `true` if a fusion happened, in which case `new_plan` should be
/// discarded: its routing information now lives inside the existing
/// sub-plan's operator.
fn reconcile_network_operators(existing: &mut [QuerySubPlan], new_plan: &QuerySubPlan) -> bool {
    for root in new_plan.roots() {
        let Ok(new_op) = new_plan.arena.get(root) else { continue };
        let (OperatorKind::NetworkSink { descriptor }, Some(PropertyValue::Operator(downstream))) =
            (&new_op.kind, new_op.header.properties.get(PropertyKey::DownstreamNonSystemOperatorId))
        else {
            continue;
        };
        for plan in existing.iter_mut() {
            for candidate_id in plan.roots() {
                if let Ok(candidate) = plan.arena.get_mut(candidate_id) {
                    if try_merging_sink(candidate, descriptor, *downstream) {
                        plan.mark_for_redeployment();
                        return true;
                    }
                }
            }
        }
    }

    for leaf in new_plan.leaves() {
        let Ok(new_op) = new_plan.arena.get(leaf) else { continue };
        let (OperatorKind::NetworkSource { descriptor }, Some(PropertyValue::Operator(upstream))) =
            (&new_op.kind, new_op.header.properties.get(PropertyKey::UpstreamNonSystemOperatorId))
        else {
            continue;
        };
        for plan in existing.iter_mut() {
            for candidate_id in plan.leaves() {
                if let Ok(candidate) = plan.arena.get_mut(candidate_id) {
                    if try_merging_source(candidate, descriptor, *upstream) {
                        plan.mark_for_redeployment();
                        return true;
                    }
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::OperatorId;
    use nes_common::property::PropertyKey as PK;
    use nes_plan::{NesPartition, NetworkDescriptor, NodeLocation, OperatorNode};

    fn sink_plan(shared: SharedQueryId, worker: WorkerId, sub_plan_id: u64, upstream_op: OperatorId, unique_id: u64, target: WorkerId) -> QuerySubPlan {
        let mut plan = QuerySubPlan::new(QuerySubPlanId(sub_plan_id), shared, worker);
        let descriptor = NetworkDescriptor::new(
            nes_common::ids::NetworkDescriptorId(unique_id),
            NodeLocation::new(target, 1),
            NesPartition::new(shared, upstream_op),
            1,
        );
        let mut sink = OperatorNode::new(OperatorId(1000 + sub_plan_id), OperatorKind::NetworkSink { descriptor });
        sink.header
            .properties
            .set(PK::UpstreamNonSystemOperatorId, PropertyValue::Operator(upstream_op));
        sink.header
            .properties
            .set(PK::DownstreamNonSystemOperatorId, PropertyValue::Operator(OperatorId(2)));
        plan.arena.insert(sink);
        plan
    }

    #[test]
    fn replacement_reuses_existing_sink_identity_and_bumps_version() {
        let mut gep = GlobalExecutionPlan::new();
        let id_gen = IdGenerator::starting_at(1000);
        let worker = WorkerId(1);
        let shared = SharedQueryId(1);

        let mut committed = ComputedSubQueryPlans::new();
        committed.insert(worker, vec![sink_plan(shared, worker, 1, OperatorId(1), 7, WorkerId(2))]);
        gep.apply_amendment(committed, &id_gen).unwrap();

        let mut replacement = ComputedSubQueryPlans::new();
        replacement.insert(worker, vec![sink_plan(shared, worker, 0, OperatorId(1), 999, WorkerId(3))]);
        gep.apply_amendment(replacement, &id_gen).unwrap();

        let node = gep.execution_node(worker).unwrap();
        let plans = node.sub_plans(shared);
        assert_eq!(plans.len(), 1, "replacement must not add a duplicate sub-plan");
        let sink_op = plans[0].arena.get(OperatorId(1001)).unwrap();
        let descriptor = sink_op.kind.network_descriptor().unwrap();
        assert_eq!(descriptor.unique_id, nes_common::ids::NetworkDescriptorId(7));
        assert_eq!(descriptor.version, 2);
        assert_eq!(descriptor.node_location.worker_id, WorkerId(3));
    }

    #[test]
    fn non_overlapping_sub_plan_is_added_as_new() {
        let mut gep = GlobalExecutionPlan::new();
        let id_gen = IdGenerator::starting_at(1000);
        let worker = WorkerId(1);
        let shared = SharedQueryId(1);

        let mut committed = ComputedSubQueryPlans::new();
        committed.insert(worker, vec![QuerySubPlan::new(QuerySubPlanId(1), shared, worker)]);
        gep.apply_amendment(committed, &id_gen).unwrap();

        let mut second = ComputedSubQueryPlans::new();
        second.insert(worker, vec![QuerySubPlan::new(QuerySubPlanId(2), shared, worker)]);
        gep.apply_amendment(second, &id_gen).unwrap();

        assert_eq!(gep.execution_node(worker).unwrap().sub_plans(shared).len(), 2);
    }

    #[test]
    fn invalid_sub_plan_id_gets_minted_when_no_counterpart_found() {
        let mut gep = GlobalExecutionPlan::new();
        let id_gen = IdGenerator::starting_at(5000);
        let worker = WorkerId(1);
        let shared = SharedQueryId(1);

        let mut committed = ComputedSubQueryPlans::new();
        committed.insert(worker, vec![QuerySubPlan::new(QuerySubPlanId::INVALID, shared, worker)]);
        gep.apply_amendment(committed, &id_gen).unwrap();

        let plans = gep.execution_node(worker).unwrap().sub_plans(shared);
        assert_eq!(plans.len(), 1);
        assert!(plans[0].id.is_valid());
    }
}
