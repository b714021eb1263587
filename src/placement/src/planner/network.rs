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

//! Network sink/source insertion, per `spec.md` §4.C "Network Sink/Source
//! Insertion". After logical placement, every leaf operator that could not
//! co-locate all of its upstream neighbors gets a network source, and the
//! worker hosting each such upstream neighbor gets a matching network sink,
//! stitched together hop by hop along the topology path between the two
//! workers.

use nes_common::ids::{IdGenerator, OperatorId, QuerySubPlanId, WorkerId};
use nes_common::property::{PropertyKey, PropertyValue, SysPlanMetaData};
use nes_plan::{NesPartition, NetworkDescriptor, NodeLocation, OperatorKind, OperatorNode, QuerySubPlan};
use nes_topology::Topology;

use crate::error::PlacementError;
use crate::planner::subplan::ComputedSubQueryPlans;

/// One (upstream-operator, downstream-leaf) pair requiring network stitching:
/// the leaf lacked `CO_LOCATED_UPSTREAM_OPERATORS` and this particular
/// upstream neighbor ended up on a different worker.
struct Candidate {
    leaf: OperatorId,
    leaf_worker: WorkerId,
    upstream: OperatorId,
    upstream_worker: WorkerId,
}

fn find_candidates(plans: &ComputedSubQueryPlans) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut op_worker: std::collections::HashMap<OperatorId, WorkerId> = std::collections::HashMap::new();
    for (&worker, sub_plans) in plans {
        for sub_plan in sub_plans {
            for id in sub_plan.arena.ids() {
                op_worker.insert(id, worker);
            }
        }
    }

    for (&worker, sub_plans) in plans {
        for sub_plan in sub_plans {
            // Every operator whose recorded upstream neighbor ended up on a
            // different worker needs stitching, not only this sub-plan's
            // structural leaves: `place_operator` already flagged exactly
            // these operators via `CO_LOCATED_UPSTREAM_OPERATORS`, so this
            // scans the whole local arena rather than `sub_plan.leaves()`
            // (which tracks the *global* plan's leaves, i.e. true sources,
            // and would never see a mid-plan operator split across workers).
            for leaf in sub_plan.arena.ids() {
                let Ok(op) = sub_plan.arena.get(leaf) else { continue };
                if op.header.properties.flag(PropertyKey::CoLocatedUpstreamOperators) {
                    continue;
                }
                for &upstream in &op.header.children {
                    if let Some(&upstream_worker) = op_worker.get(&upstream) {
                        if upstream_worker != worker {
                            candidates.push(Candidate {
                                leaf,
                                leaf_worker: worker,
                                upstream,
                                upstream_worker,
                            });
                        }
                    }
                }
            }
        }
    }
    candidates
}

fn find_subplan_mut<'a>(
    plans: &'a mut ComputedSubQueryPlans,
    worker: WorkerId,
    containing: OperatorId,
) -> Option<&'a mut QuerySubPlan> {
    plans.get_mut(&worker)?.iter_mut().find(|p| p.contains(containing))
}

fn find_operator(plans: &ComputedSubQueryPlans, worker: WorkerId, op_id: OperatorId) -> Option<OperatorNode> {
    plans.get(&worker)?.iter().find_map(|p| p.arena.get(op_id).ok().cloned())
}

/// Walks `findNodesBetween` for each candidate, installing a network sink at
/// the upstream end, a network source at the downstream end, and relay
/// sub-plans (source feeding sink) on every intermediate hop. Returns the
/// (now mutated) sub-plan map.
pub fn insert_network_operators(
    topology: &Topology,
    mut plans: ComputedSubQueryPlans,
    shared_query_id: nes_common::ids::SharedQueryId,
    id_gen: &IdGenerator,
) -> Result<ComputedSubQueryPlans, PlacementError> {
    let candidates = find_candidates(&plans);

    for candidate in candidates {
        let path = nes_topology::find_nodes_between(topology, candidate.upstream_worker, candidate.leaf_worker);
        if path.is_empty() {
            return Err(PlacementError::PathUnavailable);
        }

        let mut relay_ids = Vec::new();
        let partition = NesPartition::new(shared_query_id, candidate.upstream);

        for (i, &hop_worker) in path.iter().enumerate() {
            if i == 0 {
                let sink_id = id_gen.next_operator_id();
                let descriptor = NetworkDescriptor::new(
                    id_gen.next_network_descriptor_id(),
                    NodeLocation::new(path[1], 0),
                    partition,
                    1,
                );
                let mut sink = OperatorNode::new(sink_id, OperatorKind::NetworkSink { descriptor });
                if let Some(upstream_op) = find_operator(&plans, candidate.upstream_worker, candidate.upstream) {
                    sink.header.input_schema = upstream_op.header.output_schema;
                }
                sink.header
                    .properties
                    .set(PropertyKey::UpstreamNonSystemOperatorId, PropertyValue::Operator(candidate.upstream));
                sink.header.properties.set(
                    PropertyKey::DownstreamNonSystemOperatorId,
                    PropertyValue::Operator(candidate.leaf),
                );
                if let Some(sub_plan) = find_subplan_mut(&mut plans, hop_worker, candidate.upstream) {
                    sub_plan.arena.insert(sink.clone());
                    let _ = sub_plan.arena.add_edge(candidate.upstream, sink_id);
                    sub_plan.mark_for_redeployment();
                }
            } else if i == path.len() - 1 {
                let source_id = id_gen.next_operator_id();
                let descriptor = NetworkDescriptor::new(
                    id_gen.next_network_descriptor_id(),
                    NodeLocation::new(hop_worker, 0),
                    partition,
                    1,
                );
                let mut source = OperatorNode::new(source_id, OperatorKind::NetworkSource { descriptor });
                if let Some(leaf_op) = find_operator(&plans, candidate.leaf_worker, candidate.leaf) {
                    source.header.output_schema = leaf_op.header.input_schema;
                }
                source.header.properties.set(
                    PropertyKey::UpstreamNonSystemOperatorId,
                    PropertyValue::Operator(candidate.upstream),
                );
                source
                    .header
                    .properties
                    .set(PropertyKey::DownstreamNonSystemOperatorId, PropertyValue::Operator(candidate.leaf));
                if let Some(sub_plan) = find_subplan_mut(&mut plans, hop_worker, candidate.leaf) {
                    sub_plan.arena.insert(source.clone());
                    let _ = sub_plan.arena.add_edge(source_id, candidate.leaf);
                    sub_plan.mark_for_redeployment();
                }
            } else {
                let relay_id = id_gen.next_sub_plan_id();
                let mut relay = QuerySubPlan::new(relay_id, shared_query_id, hop_worker);

                let source_id = id_gen.next_operator_id();
                let source_descriptor = NetworkDescriptor::new(
                    id_gen.next_network_descriptor_id(),
                    NodeLocation::new(hop_worker, 0),
                    partition,
                    1,
                );
                let mut source = OperatorNode::new(
                    source_id,
                    OperatorKind::NetworkSource {
                        descriptor: source_descriptor,
                    },
                );

                let sink_id = id_gen.next_operator_id();
                let next_hop = path[i + 1];
                let sink_descriptor = NetworkDescriptor::new(id_gen.next_network_descriptor_id(), NodeLocation::new(next_hop, 0), partition, 1);
                let mut sink = OperatorNode::new(sink_id, OperatorKind::NetworkSink { descriptor: sink_descriptor });

                if let Some(upstream_op) = find_operator(&plans, candidate.upstream_worker, candidate.upstream) {
                    source.header.output_schema = upstream_op.header.output_schema.clone();
                    sink.header.input_schema = upstream_op.header.output_schema;
                }

                relay.arena.insert(source);
                relay.arena.insert(sink);
                let _ = relay.arena.add_edge(source_id, sink_id);
                relay_ids.push((relay_id, hop_worker));
                plans.entry(hop_worker).or_default().push(relay);
            }
        }

        if !relay_ids.is_empty() {
            record_connected_relays(&mut plans, candidate.leaf_worker, candidate.leaf, &relay_ids);
        }
    }

    Ok(plans)
}

/// Records every intermediate relay sub-plan id on the originating leaf's
/// `CONNECTED_SYS_SUB_PLAN_DETAILS`, so a later amendment can find and
/// reconfigure the relay chain, per `spec.md` §4.C.
fn record_connected_relays(
    plans: &mut ComputedSubQueryPlans,
    leaf_worker: WorkerId,
    leaf: OperatorId,
    relay_ids: &[(QuerySubPlanId, WorkerId)],
) {
    if let Some(sub_plan) = find_subplan_mut(plans, leaf_worker, leaf) {
        if let Ok(op) = sub_plan.arena.get_mut(leaf) {
            let mut existing: Vec<SysPlanMetaData> = op
                .header
                .properties
                .get(PropertyKey::ConnectedSysSubPlanDetails)
                .and_then(PropertyValue::as_sys_plan_meta_data_list)
                .map(|s| s.to_vec())
                .unwrap_or_default();
            for &(sub_plan_id, worker_id) in relay_ids {
                existing.push(SysPlanMetaData { sub_plan_id, worker_id });
            }
            op.header
                .properties
                .set(PropertyKey::ConnectedSysSubPlanDetails, PropertyValue::SysPlanMetaDataList(existing));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::{IdGenerator, SharedQueryId};
    use nes_plan::{DataType, Field, MemoryLayout, OperatorKind, Schema};
    use nes_topology::{Capacities, TopologyNode};

    fn linear_topology(n: u64) -> Topology {
        let topology = Topology::new();
        for i in 0..n {
            topology.add_node(TopologyNode::new(WorkerId(i), format!("10.0.0.{i}"), 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
        }
        for i in 0..n.saturating_sub(1) {
            topology.add_link(WorkerId(i), WorkerId(i + 1));
        }
        topology
    }

    fn schema() -> Schema {
        Schema::new(vec![Field::new("x", DataType::Int64)], MemoryLayout::Row)
    }

    /// `spec.md` §8 scenario 1: two sources on adjacent workers feeding a
    /// union on a third worker both need exactly one network sink/source
    /// pair installed between their worker and the union's worker.
    #[test]
    fn two_source_union_inserts_two_network_pairs() {
        // W1 -> W0, W2 -> W0 (both one hop): build a small star-shaped
        // topology via two links into W0.
        let topology = Topology::new();
        topology.add_node(TopologyNode::new(WorkerId(0), "10.0.0.0", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
        topology.add_node(TopologyNode::new(WorkerId(1), "10.0.0.1", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
        topology.add_node(TopologyNode::new(WorkerId(2), "10.0.0.2", 4000, 4, Capacities::new(1 << 20, 1 << 20), 0.99));
        topology.add_link(WorkerId(1), WorkerId(0));
        topology.add_link(WorkerId(2), WorkerId(0));

        let mut car = OperatorNode::new(OperatorId(1), OperatorKind::Source { logical_source_name: "car".into() });
        car.header.output_schema = schema();
        let mut truck = OperatorNode::new(OperatorId(2), OperatorKind::Source { logical_source_name: "truck".into() });
        truck.header.output_schema = schema();
        let mut union = OperatorNode::new(OperatorId(3), OperatorKind::Union);
        union.header.input_schema = schema();
        union.header.output_schema = schema();
        union.header.children = vec![OperatorId(1), OperatorId(2)];

        let mut car_plan = QuerySubPlan::new(QuerySubPlanId(10), SharedQueryId(1), WorkerId(1));
        car_plan.arena.insert(car);
        let mut truck_plan = QuerySubPlan::new(QuerySubPlanId(11), SharedQueryId(1), WorkerId(2));
        truck_plan.arena.insert(truck);
        let mut union_plan = QuerySubPlan::new(QuerySubPlanId(12), SharedQueryId(1), WorkerId(0));
        union_plan.arena.insert(union);

        let mut plans: ComputedSubQueryPlans = std::collections::HashMap::new();
        plans.insert(WorkerId(1), vec![car_plan]);
        plans.insert(WorkerId(2), vec![truck_plan]);
        plans.insert(WorkerId(0), vec![union_plan]);

        let id_gen = IdGenerator::starting_at(1000);
        let result = insert_network_operators(&topology, plans, SharedQueryId(1), &id_gen).unwrap();

        let all_ops: Vec<_> = result
            .values()
            .flatten()
            .flat_map(|p| p.arena.ids().into_iter().filter_map(|id| p.arena.get(id).ok().cloned()))
            .collect();
        let sink_count = all_ops.iter().filter(|op| matches!(op.kind, OperatorKind::NetworkSink { .. })).count();
        let source_count = all_ops.iter().filter(|op| matches!(op.kind, OperatorKind::NetworkSource { .. })).count();

        assert_eq!(sink_count, 2, "one network sink per source worker");
        assert_eq!(source_count, 2, "one network source on the union's worker, per upstream");

        // Both network sources must land on the union's worker (W0), one
        // per upstream, matching the union's original partition keys.
        let union_plan = &result.get(&WorkerId(0)).unwrap()[0];
        let sources: Vec<_> = union_plan
            .arena
            .ids()
            .into_iter()
            .filter_map(|id| union_plan.arena.get(id).ok())
            .filter(|op| matches!(op.kind, OperatorKind::NetworkSource { .. }))
            .collect();
        assert_eq!(sources.len(), 2);
        let partitions: std::collections::HashSet<_> = sources.iter().map(|op| op.kind.network_descriptor().unwrap().partition.operator_id).collect();
        let expected: std::collections::HashSet<_> = [OperatorId(1), OperatorId(2)].into_iter().collect();
        assert_eq!(partitions, expected);
    }

    #[test]
    fn co_located_leaf_needs_no_network_operators() {
        let topology = linear_topology(2);
        let mut source = OperatorNode::new(OperatorId(1), OperatorKind::Source { logical_source_name: "s".into() });
        source.header.output_schema = schema();
        let mut filter = OperatorNode::new(OperatorId(2), OperatorKind::Selection { predicate: nes_plan::expr::Expression::int(1) });
        filter.header.children = vec![OperatorId(1)];
        filter
            .header
            .properties
            .set(PropertyKey::CoLocatedUpstreamOperators, PropertyValue::Bool(true));

        let mut sub_plan = QuerySubPlan::new(QuerySubPlanId(1), SharedQueryId(1), WorkerId(0));
        sub_plan.arena.insert(source);
        sub_plan.arena.insert(filter);

        let mut plans: ComputedSubQueryPlans = std::collections::HashMap::new();
        plans.insert(WorkerId(0), vec![sub_plan]);

        let id_gen = IdGenerator::starting_at(1);
        let result = insert_network_operators(&topology, plans, SharedQueryId(1), &id_gen).unwrap();
        assert_eq!(result.get(&WorkerId(0)).unwrap()[0].arena.len(), 2, "no network operators inserted when co-located");
    }
}
