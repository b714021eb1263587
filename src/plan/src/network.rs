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

//! The wire contract between co-operating sub-plans on different nodes, per
//! `spec.md` §3 "Network Sink/Source Descriptors".

use std::time::Duration;

use serde::{Deserialize, Serialize};

use nes_common::ids::{NetworkDescriptorId, OperatorId, SharedQueryId, WorkerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub worker_id: WorkerId,
    pub data_port: u16,
}

impl NodeLocation {
    pub fn new(worker_id: WorkerId, data_port: u16) -> Self {
        Self { worker_id, data_port }
    }
}

/// `NesPartition(queryId, operatorId, partitionId, subPartitionId)`. The
/// original always instantiates the last two with `0, 0` outside of sub-
/// partitioned parallel sinks, which this crate does not model; kept as
/// explicit fields rather than hardcoding zero so a future parallel-sink
/// extension has somewhere to put the real values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NesPartition {
    pub shared_query_id: SharedQueryId,
    pub operator_id: OperatorId,
    pub partition_id: u64,
    pub sub_partition_id: u64,
}

impl NesPartition {
    pub fn new(shared_query_id: SharedQueryId, operator_id: OperatorId) -> Self {
        Self {
            shared_query_id,
            operator_id,
            partition_id: 0,
            sub_partition_id: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub wait: Duration,
    pub retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(100),
            retries: 10,
        }
    }
}

/// A network sink or source descriptor. Both ends share this shape because
/// `tryMergingSource`/`tryMergingSink` rewrite one side's descriptor in place
/// by cloning and patching fields of the other — keeping a single type avoids
/// duplicating that logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub unique_id: NetworkDescriptorId,
    pub node_location: NodeLocation,
    pub partition: NesPartition,
    pub retry_policy: RetryPolicy,
    pub version: u64,
    pub number_of_origins: u32,
}

impl NetworkDescriptor {
    pub fn new(
        unique_id: NetworkDescriptorId,
        node_location: NodeLocation,
        partition: NesPartition,
        number_of_origins: u32,
    ) -> Self {
        Self {
            unique_id,
            node_location,
            partition,
            retry_policy: RetryPolicy::default(),
            version: 1,
            number_of_origins,
        }
    }

    /// Rewrites this descriptor's routing fields from a freshly computed
    /// replacement while preserving `unique_id` (identity) and bumping
    /// `version`, per `tryMergingSource`/`tryMergingSink` in
    /// `BasePlacementAdditionStrategy.cpp`.
    pub fn merge_from(&mut self, replacement: &NetworkDescriptor) {
        self.node_location = replacement.node_location;
        self.partition = replacement.partition;
        self.number_of_origins = replacement.number_of_origins;
        self.version += 1;
    }
}
