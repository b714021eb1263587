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

//! `Schema`: an ordered sequence of named, typed fields with a memory layout
//! hint, per `spec.md` §3.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Char,
    FixedChar(u32),
    VarSized,
}

impl DataType {
    /// Size in bytes for fixed-width types, used by the code generator to
    /// compute field offsets in a row layout. `None` for variable-sized data.
    pub fn fixed_width(&self) -> Option<u32> {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Boolean | DataType::Char => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => Some(4),
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => Some(8),
            DataType::FixedChar(len) => Some(*len),
            DataType::VarSized => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryLayout {
    Row,
    Columnar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
    pub layout: Option<MemoryLayout>,
}

impl Schema {
    pub fn new(fields: Vec<Field>, layout: MemoryLayout) -> Self {
        Self {
            fields,
            layout: Some(layout),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn with_field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields.push(Field::new(name, data_type));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_looks_up_fields_by_name() {
        let schema = Schema::new(
            vec![Field::new("id", DataType::Int64), Field::new("value", DataType::Float64)],
            MemoryLayout::Row,
        );
        assert_eq!(schema.index_of("value"), Some(1));
        assert!(schema.index_of("missing").is_none());
    }
}
