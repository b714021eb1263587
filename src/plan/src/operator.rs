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

//! The Operator IR: a tagged `OperatorKind` enum carrying a shared
//! `OperatorHeader`, in place of a deep `OperatorNode` inheritance
//! hierarchy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use nes_common::ids::{OperatorId, OriginId};
use nes_common::property::PropertyBag;

use crate::expr::Expression;
use crate::network::NetworkDescriptor;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    ToBePlaced,
    ToBeReplaced,
    Placed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCharacteristic {
    IngestionTime,
    EventTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowType {
    Tumbling { size: Duration },
    Sliding { size: Duration, slide: Duration },
    Threshold { min_count: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerPolicy {
    OnWatermark,
    OnRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationFunction {
    Sum,
    Count,
    Min,
    Max,
    Avg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub keyed: bool,
    pub key_field: Option<String>,
    pub window_type: WindowType,
    pub time_characteristic: TimeCharacteristic,
    pub timestamp_field: Option<String>,
    pub aggregation: AggregationFunction,
    pub aggregated_field: String,
    pub trigger_policy: TriggerPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Cartesian,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinDescriptor {
    pub join_type: JoinType,
    pub left_key_field: String,
    pub right_key_field: String,
    pub window: WindowDescriptor,
}

/// Fields every operator variant carries regardless of kind: identity,
/// schema, placement bookkeeping, and lifecycle state. Binary operators
/// additionally carry `left_schema`/`right_schema`/`left_origin_ids`/
/// `right_origin_ids` on the variant itself (`Join`), since unary operators
/// have no use for a split input schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorHeader {
    pub id: OperatorId,
    pub input_schema: Schema,
    pub output_schema: Schema,
    pub origin_ids: Vec<OriginId>,
    #[serde(skip)]
    pub properties: PropertyBag,
    pub lifecycle: LifecycleState,
    /// Upstream/downstream edges within a `QueryPlan`/`QuerySubPlan`, stored
    /// as ids into the owning arena rather than owned references.
    pub children: Vec<OperatorId>,
    pub parents: Vec<OperatorId>,
}

impl OperatorHeader {
    pub fn new(id: OperatorId) -> Self {
        Self {
            id,
            input_schema: Schema::empty(),
            output_schema: Schema::empty(),
            origin_ids: Vec::new(),
            properties: PropertyBag::new(),
            lifecycle: LifecycleState::ToBePlaced,
            children: Vec::new(),
            parents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OperatorKind {
    Source {
        logical_source_name: String,
    },
    Sink {
        logical_sink_name: String,
    },
    Selection {
        predicate: Expression,
    },
    Projection {
        fields: Vec<String>,
    },
    Map {
        target_field: String,
        expression: Expression,
    },
    Union,
    Rename {
        new_qualifier: String,
    },
    Window(WindowDescriptor),
    Join(JoinDescriptor),
    WatermarkAssigner {
        timestamp_field: String,
        unit: WatermarkUnit,
        lateness: Duration,
    },
    Limit {
        count: u64,
    },
    InferModel {
        model_path: String,
        input_fields: Vec<String>,
        output_fields: Vec<String>,
    },
    /// Physical operator inserted by placement, not written by a user query.
    NetworkSink {
        descriptor: NetworkDescriptor,
    },
    NetworkSource {
        descriptor: NetworkDescriptor,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatermarkUnit {
    Milliseconds,
    Seconds,
}

impl OperatorKind {
    /// Binary operators (currently only `Join`) consume two distinct input
    /// streams and are placed with `Arity::BinaryLeft`/`BinaryRight` pipeline
    /// fragments in the code generator.
    pub fn is_binary(&self) -> bool {
        matches!(self, OperatorKind::Join(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, OperatorKind::NetworkSink { .. } | OperatorKind::NetworkSource { .. })
    }

    pub fn is_source(&self) -> bool {
        matches!(self, OperatorKind::Source { .. } | OperatorKind::NetworkSource { .. })
    }

    pub fn is_sink(&self) -> bool {
        matches!(self, OperatorKind::Sink { .. } | OperatorKind::NetworkSink { .. })
    }

    pub fn network_descriptor(&self) -> Option<&NetworkDescriptor> {
        match self {
            OperatorKind::NetworkSink { descriptor } | OperatorKind::NetworkSource { descriptor } => Some(descriptor),
            _ => None,
        }
    }

    pub fn network_descriptor_mut(&mut self) -> Option<&mut NetworkDescriptor> {
        match self {
            OperatorKind::NetworkSink { descriptor } | OperatorKind::NetworkSource { descriptor } => Some(descriptor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorNode {
    pub header: OperatorHeader,
    pub kind: OperatorKind,
}

impl OperatorNode {
    pub fn new(id: OperatorId, kind: OperatorKind) -> Self {
        Self {
            header: OperatorHeader::new(id),
            kind,
        }
    }

    pub fn id(&self) -> OperatorId {
        self.header.id
    }
}
