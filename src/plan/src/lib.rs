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

//! Component B: the Operator IR. Tagged-variant operators (`OperatorKind`)
//! carrying a shared `OperatorHeader`, the `Schema`/`Field`/`DataType` data
//! model, network sink/source descriptors, and the `QueryPlan`/`QuerySubPlan`
//! arena graphs placement builds and mutates.

pub mod error;
pub mod expr;
pub mod graph;
pub mod network;
pub mod operator;
pub mod schema;

pub use error::PlanError;
pub use graph::{OperatorArena, QueryPlan, QuerySubPlan, SubPlanState};
pub use network::{NesPartition, NetworkDescriptor, NodeLocation, RetryPolicy};
pub use operator::{
    AggregationFunction, JoinDescriptor, JoinType, LifecycleState, OperatorHeader, OperatorKind, OperatorNode,
    TimeCharacteristic, TriggerPolicy, WatermarkUnit, WindowDescriptor, WindowType,
};
pub use schema::{DataType, Field, MemoryLayout, Schema};
