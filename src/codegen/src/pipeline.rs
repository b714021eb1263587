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

//! Drives [`PipelineCodeGenerator`] over one ordered chain of operators
//! (source to sink, with no intervening network operator) and records the
//! operator-handler types the generated pipeline needs at deployment time,
//! per `spec.md` §4.F's "operator-handler-by-index lookup".

use nes_plan::{OperatorKind, OperatorNode};

use crate::arity::Arity;
use crate::emit::PipelineCodeGenerator;
use crate::error::CodeGenError;

/// A compiled pipeline fragment: the emitted source plus the ordered list of
/// handler type names a `WorkerContext` must register at indices `0..len`
/// before `execute` is invoked.
#[derive(Debug, Clone)]
pub struct CompiledPipeline {
    pub source: String,
    pub handler_types: Vec<&'static str>,
}

/// `operators` must be ordered source-first, sink-last, with every
/// non-source/non-sink entry unary except where `arity` is `BinaryLeft`/
/// `BinaryRight`, in which case a single `Join` entry closes the chain.
pub fn generate_pipeline(operators: &[OperatorNode], arity: Arity) -> Result<CompiledPipeline, CodeGenError> {
    let (first, rest) = operators.split_first().ok_or_else(|| CodeGenError::Generation("pipeline has no operators".to_string()))?;
    let (last, middle) = rest.split_last().ok_or_else(|| CodeGenError::Generation("pipeline has only a source".to_string()))?;

    let mut generator = PipelineCodeGenerator::new(arity);
    let mut handler_types = Vec::new();

    if !first.kind.is_source() {
        return Err(CodeGenError::Generation("pipeline must start with a source or network source".to_string()));
    }
    generator.generate_code_for_scan(&first.header.output_schema, &last.header.input_schema);

    for operator in middle {
        dispatch_operator(&mut generator, operator, &mut handler_types)?;
    }

    if !last.kind.is_sink() {
        return Err(CodeGenError::Generation("pipeline must end with a sink or network sink".to_string()));
    }
    generator.generate_code_for_emit(&last.header.input_schema)?;

    Ok(CompiledPipeline {
        source: generator.generate_code(),
        handler_types,
    })
}

fn dispatch_operator(generator: &mut PipelineCodeGenerator, operator: &OperatorNode, handler_types: &mut Vec<&'static str>) -> Result<(), CodeGenError> {
    match &operator.kind {
        OperatorKind::Selection { predicate } => generator.generate_code_for_filter(predicate),
        OperatorKind::Map { target_field, expression } => generator.generate_code_for_map(target_field, expression),
        OperatorKind::WatermarkAssigner { timestamp_field, unit, lateness } => {
            let index = generator.allocate_handler_index();
            handler_types.push("WatermarkHandler");
            generator.generate_code_for_watermark_assigner(timestamp_field, *unit, lateness.as_millis() as u64, index)
        }
        OperatorKind::Window(window) => {
            let index = generator.allocate_handler_index();
            handler_types.push("WindowHandler");
            generator.generate_code_for_slicing_window(window, index)?;
            generator.generate_code_for_complete_window(window, index)
        }
        OperatorKind::Join(join) => {
            let index = generator.allocate_handler_index();
            handler_types.push("JoinHandler");
            generator.generate_code_for_join(join, index)
        }
        OperatorKind::Projection { .. } | OperatorKind::Rename { .. } => Ok(()),
        OperatorKind::Limit { .. } => Err(CodeGenError::UnsupportedOperator("Limit")),
        OperatorKind::Union => Err(CodeGenError::UnsupportedOperator("Union")),
        OperatorKind::InferModel { .. } => Err(CodeGenError::UnsupportedOperator("InferModel")),
        OperatorKind::Source { .. } | OperatorKind::Sink { .. } | OperatorKind::NetworkSource { .. } | OperatorKind::NetworkSink { .. } => {
            Err(CodeGenError::Generation("source/sink operator found in the middle of a pipeline".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::OperatorId;
    use nes_plan::expr::{ComparisonOp, Expression};
    use nes_plan::{DataType, Field, MemoryLayout, OperatorHeader, Schema};

    fn node(id: u64, kind: OperatorKind, input: Schema, output: Schema) -> OperatorNode {
        let mut header = OperatorHeader::new(OperatorId(id));
        header.input_schema = input;
        header.output_schema = output;
        OperatorNode { header, kind }
    }

    #[test]
    fn scan_filter_emit_chain_compiles_to_one_fragment() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)], MemoryLayout::Row);
        let source = node(1, OperatorKind::Source { logical_source_name: "in".into() }, Schema::empty(), schema.clone());
        let filter = node(
            2,
            OperatorKind::Selection {
                predicate: Expression::compare(ComparisonOp::Gt, Expression::field("id"), Expression::int(0)),
            },
            schema.clone(),
            schema.clone(),
        );
        let sink = node(3, OperatorKind::Sink { logical_sink_name: "out".into() }, schema.clone(), schema);

        let compiled = generate_pipeline(&[source, filter, sink], Arity::Unary).unwrap();
        assert!(compiled.handler_types.is_empty());
        assert!(compiled.source.contains("if (!("));
        assert!(compiled.source.contains("emitBuffer"));
    }

    #[test]
    fn window_operator_allocates_one_handler() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64), Field::new("value", DataType::Int64)], MemoryLayout::Row);
        let window = nes_plan::WindowDescriptor {
            keyed: true,
            key_field: Some("id".into()),
            window_type: nes_plan::WindowType::Tumbling {
                size: std::time::Duration::from_millis(100),
            },
            time_characteristic: nes_plan::TimeCharacteristic::IngestionTime,
            timestamp_field: None,
            aggregation: nes_plan::AggregationFunction::Sum,
            aggregated_field: "value".into(),
            trigger_policy: nes_plan::TriggerPolicy::OnWatermark,
        };
        let source = node(1, OperatorKind::Source { logical_source_name: "in".into() }, Schema::empty(), schema.clone());
        let win = node(2, OperatorKind::Window(window), schema.clone(), schema.clone());
        let sink = node(3, OperatorKind::Sink { logical_sink_name: "out".into() }, schema.clone(), schema);

        let compiled = generate_pipeline(&[source, win, sink], Arity::Unary).unwrap();
        assert_eq!(compiled.handler_types, vec!["WindowHandler"]);
        assert!(compiled.source.contains("getOperatorHandler<WindowHandler>(0)"));
    }
}
