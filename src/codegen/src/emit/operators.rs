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

//! Per-operator emission, one method per operator kind (`generate_code_for_scan`,
//! `generate_code_for_filter`, `generate_code_for_map`,
//! `generate_code_for_watermark_assigner`, `generate_code_for_slicing_window`,
//! `generate_code_for_combining_window`, `generate_code_for_complete_window`,
//! `generate_code_for_join`, `generate_code_for_emit`).
//! [`PipelineCodeGenerator`] accumulates emitted C++ text for one pipeline
//! stage, threading an [`EmissionFrame`] through every nested block it
//! opens.

use nes_plan::expr::Expression;
use nes_plan::{AggregationFunction, JoinDescriptor, Schema, TriggerPolicy, WatermarkUnit, WindowDescriptor, WindowType};

use crate::arity::Arity;
use crate::emit::expression::emit_expression;
use crate::emit::frame::{cpp_type, EmissionFrame};
use crate::error::CodeGenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowStage {
    Slicing,
    Combining,
    Complete,
}

/// Accumulates the generated source of one pipeline stage. `lines` holds the
/// body of the per-tuple loop the `Scan` emission opens; `generate_code`
/// closes it and wraps the whole thing in the `execute(inputBuffer,
/// pipelineExecutionContext, workerContext) -> status` signature from
/// `spec.md` §4.F.
pub struct PipelineCodeGenerator {
    pub arity: Arity,
    frame: EmissionFrame,
    lines: Vec<String>,
    open_blocks: u32,
    next_handler_index: u32,
    scanned: bool,
}

impl PipelineCodeGenerator {
    pub fn new(arity: Arity) -> Self {
        Self {
            arity,
            frame: EmissionFrame::default(),
            lines: Vec::new(),
            open_blocks: 0,
            next_handler_index: 0,
            scanned: false,
        }
    }

    fn push(&mut self, line: impl AsRef<str>) {
        let indent = "    ".repeat(1 + self.open_blocks as usize);
        self.lines.push(format!("{indent}{}", line.as_ref()));
    }

    /// Reserves the next operator-handler index, mirroring `spec.md` §4.F's
    /// "retrieved by its static index" rule: each window/join emission that
    /// needs runtime state claims one index, handed back to the caller so it
    /// can be registered with the same index on the `PipelineContext` the
    /// compiled artifact is deployed with.
    pub fn allocate_handler_index(&mut self) -> u32 {
        let index = self.next_handler_index;
        self.next_handler_index += 1;
        index
    }

    fn handler_accessor(&self, type_name: &str, index: u32) -> String {
        format!("pipelineExecutionContext.getOperatorHandler<{type_name}>({index})")
    }

    /// `generateCodeForScan`: binds `inputSchema` to a row-layout accessor
    /// and opens the per-tuple loop every later emission appends into.
    pub fn generate_code_for_scan(&mut self, input_schema: &Schema, _output_schema: &Schema) {
        self.push("uint64_t numberOfTuples = inputBuffer.getNumberOfTuples();");
        self.push("auto* data = inputBuffer.getBuffer();");
        self.push("for (uint64_t t = 0; t < numberOfTuples; ++t) {");
        self.open_blocks += 1;
        self.push("auto record = RowLayout(data).recordAt(t);");
        self.frame = EmissionFrame::bind_schema(input_schema, "record");
        self.scanned = true;
    }

    /// `generateCodeForFilter`: a conditional branch around the
    /// continuation, per `spec.md` §4.F.
    pub fn generate_code_for_filter(&mut self, predicate: &Expression) -> Result<(), CodeGenError> {
        self.require_scan()?;
        let text = emit_expression(predicate, &self.frame)?;
        self.push(format!("if (!({text})) {{ continue; }}"));
        Ok(())
    }

    /// `generateCodeForMap`: evaluates `expression` and writes it into
    /// `target_field` of the output record.
    pub fn generate_code_for_map(&mut self, target_field: &str, expression: &Expression) -> Result<(), CodeGenError> {
        self.require_scan()?;
        let text = emit_expression(expression, &self.frame)?;
        let var = self.frame.fresh_temp(target_field);
        let data_type = infer_map_output_type(expression, &self.frame)?;
        self.push(format!("auto {var} = {text};"));
        self.frame.bind(target_field, var, data_type);
        Ok(())
    }

    /// `generateCodeForWatermarkAssigner`: derives a watermark from
    /// `timestamp_field` in `unit`, minus `lateness`, and advances the
    /// watermark-tracking handler.
    pub fn generate_code_for_watermark_assigner(
        &mut self,
        timestamp_field: &str,
        unit: WatermarkUnit,
        lateness_ms: u64,
        handler_index: u32,
    ) -> Result<(), CodeGenError> {
        self.require_scan()?;
        let accessor = self.frame.accessor(timestamp_field)?.to_string();
        let scale = match unit {
            WatermarkUnit::Milliseconds => 1,
            WatermarkUnit::Seconds => 1000,
        };
        self.push(format!("uint64_t ts = static_cast<uint64_t>({accessor}) * {scale};"));
        self.push(format!("uint64_t watermark = ts > {lateness_ms} ? ts - {lateness_ms} : 0;"));
        self.push(format!(
            "{}->updateWatermark(watermark, originId);",
            self.handler_accessor("WatermarkHandler", handler_index)
        ));
        Ok(())
    }

    /// `generateCodeForSlicingWindow`: derives the window key and timestamp
    /// for the current tuple and folds it into the handler's per-key slice
    /// store under the configured trigger policy.
    pub fn generate_code_for_slicing_window(&mut self, window: &WindowDescriptor, handler_index: u32) -> Result<(), CodeGenError> {
        self.emit_window_update(window, handler_index, WindowStage::Slicing)
    }

    /// `generateCodeForCombiningWindow`: merges partial slices that share a
    /// `(key, startTs, endTs)` into one combined partial aggregate.
    pub fn generate_code_for_combining_window(&mut self, window: &WindowDescriptor, handler_index: u32) -> Result<(), CodeGenError> {
        self.emit_window_update(window, handler_index, WindowStage::Combining)
    }

    /// `generateCodeForCompleteWindow`: applies the final aggregation over a
    /// triggered slice and emits the result record.
    pub fn generate_code_for_complete_window(&mut self, window: &WindowDescriptor, handler_index: u32) -> Result<(), CodeGenError> {
        self.emit_window_update(window, handler_index, WindowStage::Complete)
    }

    fn emit_window_update(&mut self, window: &WindowDescriptor, handler_index: u32, stage: WindowStage) -> Result<(), CodeGenError> {
        self.require_scan()?;
        let handler = self.handler_accessor("WindowHandler", handler_index);
        let key_expr = match &window.key_field {
            Some(field) if window.keyed => self.frame.accessor(field)?.to_string(),
            _ => "0".to_string(),
        };
        let ts_expr = match &window.timestamp_field {
            Some(field) => self.frame.accessor(field)?.to_string(),
            None => "ingestionTimestamp".to_string(),
        };
        let value_expr = self.frame.accessor(&window.aggregated_field)?.to_string();
        let (_, size) = window_span(&window.window_type);
        self.push(format!("uint64_t windowKey = static_cast<uint64_t>({key_expr});"));
        self.push(format!("uint64_t ts = static_cast<uint64_t>({ts_expr});"));
        self.push(format!("uint64_t startTs = ts - (ts % {size}ULL);"));
        self.push(format!("uint64_t endTs = startTs + {size}ULL;"));
        let agg_fn = aggregation_symbol(window.aggregation);
        match stage {
            WindowStage::Slicing => {
                self.push(format!(
                    "{handler}->getTypedWindowState().sliceStore().update(windowKey, startTs, endTs, {agg_fn}, {value_expr});"
                ));
            }
            WindowStage::Combining => {
                self.push(format!("{handler}->getTypedWindowState().sliceStore().combine(windowKey, startTs, endTs, {agg_fn});"));
            }
            WindowStage::Complete => {
                self.push(format!("{handler}->getTypedWindowState().sliceStore().combine(windowKey, startTs, endTs, {agg_fn});"));
                match window.trigger_policy {
                    TriggerPolicy::OnWatermark => self.push(format!("{handler}->triggerOnWatermark(workerContext);")),
                    TriggerPolicy::OnRecord => self.push(format!("{handler}->trigger(workerContext);")),
                }
            }
        }
        Ok(())
    }

    /// `generateCodeForJoin`: pushes the current tuple into the handler's
    /// per-key append list for this pipeline's `arity` side (left or right),
    /// under the join's shared window semantics.
    pub fn generate_code_for_join(&mut self, join: &JoinDescriptor, handler_index: u32) -> Result<(), CodeGenError> {
        self.require_scan()?;
        let key_field = match self.arity {
            Arity::BinaryLeft => join.left_key_field.as_str(),
            Arity::BinaryRight => join.right_key_field.as_str(),
            Arity::Unary => return Err(CodeGenError::UnsupportedOperator("Join requires a BinaryLeft/BinaryRight pipeline")),
        };
        let key_expr = self.frame.accessor(key_field)?.to_string();
        let handler = self.handler_accessor("JoinHandler", handler_index);
        let (start, size) = window_span(&join.window.window_type);
        self.push(format!("uint64_t joinKey = static_cast<uint64_t>({key_expr});"));
        self.push(format!("uint64_t startTs = {start};"));
        self.push(format!("uint64_t endTs = startTs + {size};"));
        let side_state = match self.arity {
            Arity::BinaryLeft => "getLeftJoinState",
            Arity::BinaryRight => "getRightJoinState",
            Arity::Unary => unreachable!(),
        };
        self.push(format!("{handler}->{side_state}().append(joinKey, startTs, endTs, record);"));
        Ok(())
    }

    /// `CEP-iteration`: bounds the repeat count of an inner sub-pipeline by
    /// wrapping `inner` in a counted loop.
    pub fn generate_code_for_cep_iteration(&mut self, repeat_count: u64, inner: impl FnOnce(&mut Self) -> Result<(), CodeGenError>) -> Result<(), CodeGenError> {
        self.require_scan()?;
        self.push(format!("for (uint64_t iter = 0; iter < {repeat_count}; ++iter) {{"));
        self.open_blocks += 1;
        inner(self)?;
        self.open_blocks -= 1;
        self.push("}");
        Ok(())
    }

    /// `generateCodeForEmit`: allocates an output buffer from the execution
    /// context, fills it per `output_schema`, and hands it off.
    pub fn generate_code_for_emit(&mut self, output_schema: &Schema) -> Result<(), CodeGenError> {
        self.require_scan()?;
        self.push("auto outputBuffer = pipelineExecutionContext.allocateTupleBuffer();");
        self.push("auto outRecord = RowLayout(outputBuffer.getBuffer()).recordAt(outputBuffer.getNumberOfTuples());");
        for field in &output_schema.fields {
            let accessor = self.frame.accessor(&field.name)?;
            self.push(format!("outRecord.set<{}>(\"{}\", {});", cpp_type(field.data_type), field.name, accessor));
        }
        self.push("pipelineExecutionContext.emitBuffer(outputBuffer, workerContext);");
        Ok(())
    }

    fn require_scan(&self) -> Result<(), CodeGenError> {
        if self.scanned {
            Ok(())
        } else {
            Err(CodeGenError::Generation("no scan emitted before this operator".to_string()))
        }
    }

    /// Closes the scan loop and wraps the accumulated body in the `execute`
    /// signature of `spec.md` §4.F.
    pub fn generate_code(mut self) -> String {
        while self.open_blocks > 0 {
            self.open_blocks -= 1;
            let indent = "    ".repeat(1 + self.open_blocks as usize);
            self.lines.push(format!("{indent}}}"));
        }
        let body = self.lines.join("\n");
        format!(
            "ExecutionResult execute(TupleBuffer& inputBuffer, PipelineExecutionContext& pipelineExecutionContext, WorkerContext& workerContext) {{\n{body}\n    return ExecutionResult::Ok;\n}}"
        )
    }
}

fn window_span(window_type: &WindowType) -> (u64, u64) {
    match window_type {
        WindowType::Tumbling { size } => (0, size.as_millis() as u64),
        WindowType::Sliding { size, .. } => (0, size.as_millis() as u64),
        WindowType::Threshold { min_count } => (0, *min_count),
    }
}

fn aggregation_symbol(agg: AggregationFunction) -> &'static str {
    match agg {
        AggregationFunction::Sum => "AggregationFunction::SUM",
        AggregationFunction::Count => "AggregationFunction::COUNT",
        AggregationFunction::Min => "AggregationFunction::MIN",
        AggregationFunction::Max => "AggregationFunction::MAX",
        AggregationFunction::Avg => "AggregationFunction::AVG",
    }
}

fn infer_map_output_type(expression: &Expression, frame: &EmissionFrame) -> Result<nes_plan::DataType, CodeGenError> {
    match expression {
        Expression::Field(name) => frame.field_type(name),
        Expression::Literal(nes_plan::expr::Literal::Int(_)) => Ok(nes_plan::DataType::Int64),
        Expression::Literal(nes_plan::expr::Literal::Float(_)) => Ok(nes_plan::DataType::Float64),
        Expression::Literal(nes_plan::expr::Literal::Bool(_)) => Ok(nes_plan::DataType::Boolean),
        Expression::Arithmetic { left, .. } => infer_map_output_type(left, frame),
        Expression::Compare { .. } | Expression::And(_, _) | Expression::Or(_, _) | Expression::Not(_) => Ok(nes_plan::DataType::Boolean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::OperatorId;
    use nes_plan::expr::ComparisonOp;
    use nes_plan::{DataType, Field, MemoryLayout, TimeCharacteristic};

    fn schema() -> Schema {
        Schema::new(
            vec![Field::new("id", DataType::Int64), Field::new("value", DataType::Int64)],
            MemoryLayout::Row,
        )
    }

    #[test]
    fn filter_emits_conditional_continue() {
        let mut gen = PipelineCodeGenerator::new(Arity::Unary);
        gen.generate_code_for_scan(&schema(), &schema());
        gen.generate_code_for_filter(&Expression::compare(ComparisonOp::Lt, Expression::field("id"), Expression::int(5)))
            .unwrap();
        gen.generate_code_for_emit(&schema()).unwrap();
        let source = gen.generate_code();
        assert!(source.contains("if (!("));
        assert!(source.contains("continue;"));
        assert!(source.contains("< 5"));
        let _ = OperatorId(1);
    }

    #[test]
    fn scan_loop_and_emit_call_are_present() {
        let mut gen = PipelineCodeGenerator::new(Arity::Unary);
        gen.generate_code_for_scan(&schema(), &schema());
        gen.generate_code_for_emit(&schema()).unwrap();
        let source = gen.generate_code();
        assert!(source.contains("for (uint64_t t = 0; t < numberOfTuples; ++t)"));
        assert!(source.contains("emitBuffer(outputBuffer, workerContext)"));
    }

    #[test]
    fn map_binds_a_new_output_field_in_the_frame() {
        let mut gen = PipelineCodeGenerator::new(Arity::Unary);
        gen.generate_code_for_scan(&schema(), &schema());
        gen.generate_code_for_map("doubled", &Expression::arithmetic(nes_plan::expr::ArithmeticOp::Mul, Expression::field("value"), Expression::int(2)))
            .unwrap();
        let source = gen.generate_code();
        assert!(source.contains("doubled_0 ="));
    }

    #[test]
    fn slicing_window_references_the_handler_by_index() {
        let mut gen = PipelineCodeGenerator::new(Arity::Unary);
        gen.generate_code_for_scan(&schema(), &schema());
        let window = WindowDescriptor {
            keyed: true,
            key_field: Some("id".into()),
            window_type: WindowType::Tumbling {
                size: std::time::Duration::from_millis(10),
            },
            time_characteristic: TimeCharacteristic::IngestionTime,
            timestamp_field: None,
            aggregation: AggregationFunction::Sum,
            aggregated_field: "value".into(),
            trigger_policy: TriggerPolicy::OnWatermark,
        };
        gen.generate_code_for_slicing_window(&window, 0).unwrap();
        let source = gen.generate_code();
        assert!(source.contains("getOperatorHandler<WindowHandler>(0)"));
        assert!(source.contains("AggregationFunction::SUM"));
    }
}
