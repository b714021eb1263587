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

//! `adjustWeightsCallback`/`adaptEpochCallback`: the PESSIMISTIC/OPTIMISTIC
//! amendment modes and the fault-tolerance variant each supply their own
//! implementation via a small trait instead of ad-hoc function-pointer
//! fields.

use crate::fault_tolerance::{PlacementWeights, WorkloadType};
use crate::mode::FaultToleranceMode;

/// Lets the caller override the weight derivation fault-tolerance placement
/// would otherwise compute from `(WorkloadType, FaultToleranceMode)`.
pub trait AdjustWeightsCallback: Send + Sync {
    fn adjust(&self, workload: WorkloadType, mode: FaultToleranceMode, weights: PlacementWeights) -> PlacementWeights;
}

/// No-op implementation: the default weight table from `spec.md` §4.D applies
/// unmodified.
pub struct DefaultWeights;

impl AdjustWeightsCallback for DefaultWeights {
    fn adjust(&self, _workload: WorkloadType, _mode: FaultToleranceMode, weights: PlacementWeights) -> PlacementWeights {
        weights
    }
}

/// Called once a buffering subset has been chosen, to let the caller
/// override the epoch assigned to the chosen nodes (e.g. to coordinate with
/// an external checkpoint clock). Defaults to the epoch the algorithm derives
/// internally.
pub trait AdaptEpochCallback: Send + Sync {
    fn adapt(&self, path_epoch: u64) -> u64;
}

pub struct IdentityEpoch;

impl AdaptEpochCallback for IdentityEpoch {
    fn adapt(&self, path_epoch: u64) -> u64 {
        path_epoch
    }
}
