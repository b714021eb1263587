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

//! `EmissionFrame`: the schema-field-name -> typed-accessor map threaded
//! through nested emission (loop bodies, if-branches), analogous to an
//! MLIR-style symbol table of already-materialized SSA values threaded
//! through every nested block a generated operator opens. This crate emits
//! readable C++ text rather than MLIR/LLVM IR, so the "value" a field
//! resolves to is simply the accessor expression text for that field on the
//! current record.

use std::collections::HashMap;

use nes_plan::{DataType, Schema};

use crate::error::CodeGenError;

#[derive(Debug, Clone, Default)]
pub struct EmissionFrame {
    accessors: HashMap<String, String>,
    types: HashMap<String, DataType>,
    next_temp: u32,
}

impl EmissionFrame {
    /// Binds every field of `schema` to a row-layout accessor on `record`,
    /// the scan loop's per-tuple variable.
    pub fn bind_schema(schema: &Schema, record: &str) -> Self {
        let mut frame = EmissionFrame::default();
        for field in &schema.fields {
            frame
                .accessors
                .insert(field.name.clone(), format!("{record}.get<{}>(\"{}\")", cpp_type(field.data_type), field.name));
            frame.types.insert(field.name.clone(), field.data_type);
        }
        frame
    }

    pub fn bind(&mut self, field: impl Into<String>, accessor: impl Into<String>, data_type: DataType) {
        let field = field.into();
        self.accessors.insert(field.clone(), accessor.into());
        self.types.insert(field, data_type);
    }

    pub fn accessor(&self, field: &str) -> Result<&str, CodeGenError> {
        self.accessors.get(field).map(String::as_str).ok_or_else(|| CodeGenError::UnknownField(field.to_string()))
    }

    pub fn field_type(&self, field: &str) -> Result<DataType, CodeGenError> {
        self.types.get(field).copied().ok_or_else(|| CodeGenError::UnknownField(field.to_string()))
    }

    /// A fresh, pipeline-unique temporary variable name, used for
    /// intermediate window keys, aggregate accumulators, and join probe
    /// results.
    pub fn fresh_temp(&mut self, hint: &str) -> String {
        let name = format!("{hint}_{}", self.next_temp);
        self.next_temp += 1;
        name
    }
}

/// The C-style type name a `DataType` is emitted as.
pub fn cpp_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Int8 => "int8_t",
        DataType::Int16 => "int16_t",
        DataType::Int32 => "int32_t",
        DataType::Int64 => "int64_t",
        DataType::UInt8 => "uint8_t",
        DataType::UInt16 => "uint16_t",
        DataType::UInt32 => "uint32_t",
        DataType::UInt64 => "uint64_t",
        DataType::Float32 => "float",
        DataType::Float64 => "double",
        DataType::Boolean => "bool",
        DataType::Char | DataType::FixedChar(_) => "char",
        DataType::VarSized => "VarSized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::{Field, MemoryLayout};

    #[test]
    fn bind_schema_produces_one_accessor_per_field() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)], MemoryLayout::Row);
        let frame = EmissionFrame::bind_schema(&schema, "record");
        assert!(frame.accessor("id").unwrap().contains("record.get<int64_t>(\"id\")"));
        assert!(frame.accessor("missing").is_err());
    }

    #[test]
    fn fresh_temp_names_are_unique() {
        let mut frame = EmissionFrame::default();
        let a = frame.fresh_temp("key");
        let b = frame.fresh_temp("key");
        assert_ne!(a, b);
    }
}
