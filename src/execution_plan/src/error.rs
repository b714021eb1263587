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

use nes_common::ids::{QuerySubPlanId, SharedQueryId, WorkerId};
use nes_common::NesError;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionPlanError {
    #[error("no execution node for worker {0}")]
    UnknownWorker(WorkerId),

    #[error("no sub-plan {1} for shared query {0} on this worker")]
    UnknownSubPlan(SharedQueryId, QuerySubPlanId),

    #[error("execution plan corruption: {0}")]
    Corruption(String),
}

impl From<ExecutionPlanError> for NesError {
    fn from(e: ExecutionPlanError) -> Self {
        let message = e.to_string();
        match e {
            ExecutionPlanError::UnknownWorker(id) => NesError::UnknownNode(id),
            ExecutionPlanError::UnknownSubPlan(_, _) | ExecutionPlanError::Corruption(_) => {
                NesError::PlacementCorruption(message)
            }
        }
    }
}
