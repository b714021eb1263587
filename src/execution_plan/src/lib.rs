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

//! Component E: the Global Execution Plan. [`GlobalExecutionPlan`] holds one
//! [`ExecutionNode`] per topology node hosting a query, and is the only place
//! a placement amendment's computed sub-plans become durable state; see
//! [`GlobalExecutionPlan::apply_amendment`].

pub mod error;
pub mod execution_node;
pub mod global_plan;
pub mod notifier;
pub mod snapshot;

pub use error::ExecutionPlanError;
pub use execution_node::ExecutionNode;
pub use global_plan::GlobalExecutionPlan;
pub use notifier::AmendmentNotifier;
pub use snapshot::{GlobalExecutionPlanSnapshot, SnapshotEntry, SnapshotStore};
