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

use nes_common::NesError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no operator handler registered at index {0}")]
    UnknownHandler(u32),

    #[error("operator handler at index {index} was requested as {expected} but is a different type")]
    HandlerTypeMismatch { index: u32, expected: &'static str },

    #[error("buffer pool is closed")]
    PoolClosed,

    #[error("runtime stage failed: {0}")]
    Stage(String),
}

impl From<RuntimeError> for NesError {
    fn from(e: RuntimeError) -> Self {
        NesError::RuntimeStageFailure(e.to_string())
    }
}
