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

use nes_common::ids::OperatorId;
use nes_common::NesError;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("unknown operator: {0}")]
    UnknownOperator(OperatorId),

    #[error("plan corruption: {0}")]
    Corruption(String),
}

impl From<PlanError> for NesError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::UnknownOperator(id) => NesError::UnknownOperator(id),
            PlanError::Corruption(msg) => NesError::PlacementCorruption(msg),
        }
    }
}
