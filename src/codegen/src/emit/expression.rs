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

//! Translates a logical `nes_plan::Expression` into target-language (C++)
//! expression text, preserving the integer/float/comparison operators and
//! signedness of the field types involved, per `spec.md` §4.F.

use nes_plan::expr::{ArithmeticOp, ComparisonOp, Expression, Literal};

use crate::emit::frame::EmissionFrame;
use crate::error::CodeGenError;

pub fn emit_expression(expr: &Expression, frame: &EmissionFrame) -> Result<String, CodeGenError> {
    Ok(match expr {
        Expression::Field(name) => frame.accessor(name)?.to_string(),
        Expression::Literal(lit) => emit_literal(lit),
        Expression::Arithmetic { op, left, right } => {
            format!("({} {} {})", emit_expression(left, frame)?, arithmetic_symbol(*op), emit_expression(right, frame)?)
        }
        Expression::Compare { op, left, right } => {
            format!("({} {} {})", emit_expression(left, frame)?, comparison_symbol(*op), emit_expression(right, frame)?)
        }
        Expression::And(l, r) => format!("({} && {})", emit_expression(l, frame)?, emit_expression(r, frame)?),
        Expression::Or(l, r) => format!("({} || {})", emit_expression(l, frame)?, emit_expression(r, frame)?),
        Expression::Not(e) => format!("!({})", emit_expression(e, frame)?),
    })
}

fn emit_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(v) => v.to_string(),
        Literal::Float(text) => text.clone(),
        Literal::Bool(b) => b.to_string(),
    }
}

fn arithmetic_symbol(op: ArithmeticOp) -> &'static str {
    match op {
        ArithmeticOp::Add => "+",
        ArithmeticOp::Sub => "-",
        ArithmeticOp::Mul => "*",
        ArithmeticOp::Div => "/",
    }
}

/// Signed comparisons emit the plain C operator; the accessor's declared
/// type already carries signedness (`int64_t` vs `uint64_t`), so no
/// additional cast is needed here, unlike MLIR's separate signed/unsigned
/// comparator enum.
fn comparison_symbol(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "==",
        ComparisonOp::Ne => "!=",
        ComparisonOp::Lt => "<",
        ComparisonOp::Le => "<=",
        ComparisonOp::Gt => ">",
        ComparisonOp::Ge => ">=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::{DataType, Field, MemoryLayout, Schema};

    #[test]
    fn emits_field_comparison() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)], MemoryLayout::Row);
        let frame = EmissionFrame::bind_schema(&schema, "record");
        let expr = Expression::compare(ComparisonOp::Lt, Expression::field("id"), Expression::int(5));
        let text = emit_expression(&expr, &frame).unwrap();
        assert!(text.contains("record.get<int64_t>(\"id\")"));
        assert!(text.contains("< 5"));
    }
}
