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

//! Component F: the Code Generator. Translates one pipeline fragment of
//! physical operators into the `execute(inputBuffer, pipelineExecutionContext,
//! workerContext) -> status` contract a worker's runtime invokes, per
//! `spec.md` §4.F.

pub mod arity;
pub mod backend;
pub mod emit;
pub mod error;
pub mod pipeline;

pub use arity::Arity;
pub use backend::{CompiledArtifact, CompilerBackend, CppSourceBackend, MlirBackend};
pub use error::CodeGenError;
pub use pipeline::{generate_pipeline, CompiledPipeline};
