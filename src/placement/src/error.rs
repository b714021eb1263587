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

use nes_common::ids::{OperatorId, WorkerId};
use nes_common::NesError;
use nes_plan::PlanError;
use nes_topology::TopologyError;

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("no path available between the requested worker sets")]
    PathUnavailable,

    #[error("resource exhausted on worker {worker}: requested {requested}, available {available}")]
    ResourceExhausted {
        worker: WorkerId,
        requested: u32,
        available: u32,
    },

    #[error("placement corruption: {0}")]
    Corruption(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(OperatorId),

    #[error("unknown topology node: {0}")]
    UnknownNode(WorkerId),

    #[error("path selection exhausted after {0} retries")]
    RetriesExhausted(u32),
}

impl From<TopologyError> for PlacementError {
    fn from(e: TopologyError) -> Self {
        match e {
            TopologyError::UnknownNode(id) => PlacementError::UnknownNode(id),
            TopologyError::ResourceExhausted {
                worker,
                requested,
                available,
            } => PlacementError::ResourceExhausted {
                worker,
                requested,
                available,
            },
            TopologyError::PathUnavailable => PlacementError::PathUnavailable,
        }
    }
}

impl From<PlanError> for PlacementError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::UnknownOperator(id) => PlacementError::UnknownOperator(id),
            PlanError::Corruption(msg) => PlacementError::Corruption(msg),
        }
    }
}

impl From<PlacementError> for NesError {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::PathUnavailable => NesError::PathUnavailable,
            PlacementError::ResourceExhausted {
                worker,
                requested,
                available,
            } => NesError::ResourceExhausted {
                worker,
                requested,
                available,
            },
            PlacementError::Corruption(msg) => NesError::PlacementCorruption(msg),
            PlacementError::UnknownOperator(id) => NesError::UnknownOperator(id),
            PlacementError::UnknownNode(id) => NesError::UnknownNode(id),
            PlacementError::RetriesExhausted(_) => NesError::PathUnavailable,
        }
    }
}
