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

//! The pluggable compiler backend of `spec.md` §4.F / §1: the "system
//! compiler producing a shared object" is an external collaborator this
//! crate does not invoke, so [`CompiledArtifact`] wraps the emitted source
//! and its exported symbol rather than a loadable binary.

pub mod cpp;
pub mod mlir;

use crate::error::CodeGenError;
use crate::pipeline::CompiledPipeline;

/// What a `CompilerBackend` hands back: source text a downstream, external
/// compiler would turn into the shared object the runtime dynamically loads.
/// `entry_symbol` names the pipeline's `execute` function as it should appear
/// once compiled.
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    pub source: String,
    pub entry_symbol: String,
    pub handler_types: Vec<&'static str>,
}

/// A target backend for a compiled pipeline. `CppSourceBackend` emits the
/// literal C++ text `PipelineCodeGenerator` already produced; `MlirBackend`
/// additionally lowers it into a tiny textual IR.
pub trait CompilerBackend {
    fn compile(&self, pipeline: CompiledPipeline, entry_symbol: &str) -> Result<CompiledArtifact, CodeGenError>;
}

pub use cpp::CppSourceBackend;
pub use mlir::MlirBackend;
