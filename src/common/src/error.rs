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

//! The error kinds of `spec.md` §7, as a single enum every crate's own error
//! type can be converted into. Crate-local errors (e.g.
//! `nes_placement::PlacementError`) stay separate so call sites can match on
//! the narrower type; `NesError` is what crosses crate boundaries and what
//! `nes_cmd` ultimately reports to its caller.

use crate::ids::{OperatorId, WorkerId};

#[derive(Debug, thiserror::Error)]
pub enum NesError {
    #[error("unknown topology node: {0}")]
    UnknownNode(WorkerId),

    #[error("unknown operator: {0}")]
    UnknownOperator(OperatorId),

    #[error("no path available between pinned upstream and downstream workers")]
    PathUnavailable,

    #[error("resource exhausted on worker {worker}: requested {requested}, available {available}")]
    ResourceExhausted {
        worker: WorkerId,
        requested: u32,
        available: u32,
    },

    #[error("placement invariant violated: {0}")]
    PlacementCorruption(String),

    #[error("code generation failed: {0}")]
    CodeGenerationFailure(String),

    #[error("compilation failed: {0}")]
    CompilationFailure(String),

    #[error("runtime stage failed: {0}")]
    RuntimeStageFailure(String),
}

impl NesError {
    /// Whether a caller may retry the operation that produced this error, per
    /// the propagation policy in `spec.md` §7.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NesError::PathUnavailable | NesError::ResourceExhausted { .. }
        )
    }
}
