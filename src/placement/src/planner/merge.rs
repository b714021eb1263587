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

//! `tryMergingSource`/`tryMergingSink`, per `spec.md` §4.C "Merging and
//! Replacement (reconfiguration)". When a previously placed operator is
//! being re-amended, an existing network sink/source can be rewritten in
//! place instead of adding a duplicate, as long as the non-system operator
//! id on the far end matches.

use nes_common::property::{PropertyKey, PropertyValue};
use nes_plan::{NetworkDescriptor, OperatorNode};

/// Attempts to fuse `candidate` into `existing` when both are network
/// sources whose `UPSTREAM_NON_SYSTEM_OPERATOR_ID` match. On success,
/// `existing`'s descriptor is rewritten in place (routing fields replaced,
/// `unique_id` preserved, `version` bumped) and `true` is returned.
pub fn try_merging_source(existing: &mut OperatorNode, candidate: &NetworkDescriptor, candidate_upstream_op: nes_common::ids::OperatorId) -> bool {
    try_merge(existing, candidate, candidate_upstream_op, PropertyKey::UpstreamNonSystemOperatorId, |op| {
        matches!(op.kind, nes_plan::OperatorKind::NetworkSource { .. })
    })
}

/// Symmetric to [`try_merging_source`] on `DOWNSTREAM_NON_SYSTEM_OPERATOR_ID`
/// for network sinks.
pub fn try_merging_sink(existing: &mut OperatorNode, candidate: &NetworkDescriptor, candidate_downstream_op: nes_common::ids::OperatorId) -> bool {
    try_merge(existing, candidate, candidate_downstream_op, PropertyKey::DownstreamNonSystemOperatorId, |op| {
        matches!(op.kind, nes_plan::OperatorKind::NetworkSink { .. })
    })
}

fn try_merge(
    existing: &mut OperatorNode,
    candidate: &NetworkDescriptor,
    candidate_key_op: nes_common::ids::OperatorId,
    key: PropertyKey,
    is_matching_kind: impl Fn(&OperatorNode) -> bool,
) -> bool {
    if !is_matching_kind(existing) {
        return false;
    }
    let existing_key_op = existing.header.properties.get(key).and_then(PropertyValue::as_operator);
    if existing_key_op != Some(candidate_key_op) {
        return false;
    }
    match existing.kind.network_descriptor_mut() {
        Some(descriptor) => {
            descriptor.merge_from(candidate);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::{NetworkDescriptorId, OperatorId, SharedQueryId};
    use nes_plan::{NesPartition, NodeLocation, OperatorKind};

    fn network_source(unique_id: u64, upstream_op: OperatorId, node: u64) -> OperatorNode {
        let descriptor = NetworkDescriptor::new(
            NetworkDescriptorId(unique_id),
            NodeLocation::new(nes_common::ids::WorkerId(node), 1),
            NesPartition::new(SharedQueryId(1), upstream_op),
            1,
        );
        let mut op = OperatorNode::new(OperatorId(100), OperatorKind::NetworkSource { descriptor });
        op.header
            .properties
            .set(PropertyKey::UpstreamNonSystemOperatorId, PropertyValue::Operator(upstream_op));
        op
    }

    #[test]
    fn merging_preserves_unique_id_and_bumps_version() {
        let mut existing = network_source(7, OperatorId(1), 10);
        let replacement_descriptor = NetworkDescriptor::new(
            NetworkDescriptorId(999), // merge must discard this id
            NodeLocation::new(nes_common::ids::WorkerId(20), 1),
            NesPartition::new(SharedQueryId(1), OperatorId(1)),
            1,
        );
        assert!(try_merging_source(&mut existing, &replacement_descriptor, OperatorId(1)));
        let descriptor = existing.kind.network_descriptor().unwrap();
        assert_eq!(descriptor.unique_id, NetworkDescriptorId(7));
        assert_eq!(descriptor.version, 2);
        assert_eq!(descriptor.node_location.worker_id, nes_common::ids::WorkerId(20));
    }

    #[test]
    fn mismatched_upstream_operator_does_not_merge() {
        let mut existing = network_source(7, OperatorId(1), 10);
        let replacement_descriptor = NetworkDescriptor::new(
            NetworkDescriptorId(999),
            NodeLocation::new(nes_common::ids::WorkerId(20), 1),
            NesPartition::new(SharedQueryId(1), OperatorId(2)),
            1,
        );
        assert!(!try_merging_source(&mut existing, &replacement_descriptor, OperatorId(2)));
    }
}
