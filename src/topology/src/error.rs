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

use nes_common::ids::WorkerId;
use nes_common::NesError;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("unknown topology node: {0}")]
    UnknownNode(WorkerId),

    #[error("resource exhausted on worker {worker}: requested {requested}, available {available}")]
    ResourceExhausted {
        worker: WorkerId,
        requested: u32,
        available: u32,
    },

    #[error("no path available between the requested worker sets")]
    PathUnavailable,
}

impl From<TopologyError> for NesError {
    fn from(e: TopologyError) -> Self {
        match e {
            TopologyError::UnknownNode(id) => NesError::UnknownNode(id),
            TopologyError::ResourceExhausted {
                worker,
                requested,
                available,
            } => NesError::ResourceExhausted {
                worker,
                requested,
                available,
            },
            TopologyError::PathUnavailable => NesError::PathUnavailable,
        }
    }
}
