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

//! The default backend: emits the `PipelineCodeGenerator` output as literal
//! C++ text, renaming the generated `execute` function to the requested
//! entry symbol so distinct pipeline stages don't collide once linked into
//! one shared object.

use crate::backend::{CompiledArtifact, CompilerBackend};
use crate::error::CodeGenError;
use crate::pipeline::CompiledPipeline;

#[derive(Debug, Default)]
pub struct CppSourceBackend;

impl CompilerBackend for CppSourceBackend {
    fn compile(&self, pipeline: CompiledPipeline, entry_symbol: &str) -> Result<CompiledArtifact, CodeGenError> {
        let source = pipeline.source.replacen("ExecutionResult execute(", &format!("extern \"C\" ExecutionResult {entry_symbol}("), 1);
        if source == pipeline.source {
            return Err(CodeGenError::Compilation("emitted source is missing the execute() entry point".to_string()));
        }
        Ok(CompiledArtifact {
            source,
            entry_symbol: entry_symbol.to_string(),
            handler_types: pipeline.handler_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arity::Arity;
    use crate::emit::PipelineCodeGenerator;

    #[test]
    fn renames_the_entry_point_to_the_requested_symbol() {
        let mut generator = PipelineCodeGenerator::new(Arity::Unary);
        let schema = nes_plan::Schema::new(vec![nes_plan::Field::new("id", nes_plan::DataType::Int64)], nes_plan::MemoryLayout::Row);
        generator.generate_code_for_scan(&schema, &schema);
        generator.generate_code_for_emit(&schema).unwrap();
        let pipeline = CompiledPipeline {
            source: generator.generate_code(),
            handler_types: Vec::new(),
        };
        let artifact = CppSourceBackend.compile(pipeline, "pipeline_42").unwrap();
        assert!(artifact.source.contains("extern \"C\" ExecutionResult pipeline_42("));
    }
}
