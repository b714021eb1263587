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
pub enum CodeGenError {
    #[error("field '{0}' is not present in the bound schema")]
    UnknownField(String),

    #[error("operator kind {0} cannot be emitted by this pipeline stage")]
    UnsupportedOperator(&'static str),

    #[error("code generation failed: {0}")]
    Generation(String),

    #[error("compilation failed: {0}")]
    Compilation(String),
}

impl From<CodeGenError> for NesError {
    fn from(e: CodeGenError) -> Self {
        match e {
            CodeGenError::Compilation(msg) => NesError::CompilationFailure(msg),
            other => NesError::CodeGenerationFailure(other.to_string()),
        }
    }
}
