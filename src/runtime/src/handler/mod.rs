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

//! Operator handler state: per-pipeline runtime objects a generated
//! `execute` retrieves by index via `PipelineExecutionContext::
//! get_operator_handler`, per `spec.md` §4.G.

pub mod join;
pub mod watermark;
pub mod window;

pub use join::{JoinHandler, JoinState};
pub use watermark::WatermarkHandler;
pub use window::{PartialAggregate, SliceStore, WindowHandler, WindowState};

use crate::context::WorkerContext;

/// The lifecycle every operator handler shares, per `spec.md` §4.G /
/// §5 ("cooperative `stop()`").
pub trait OperatorHandler: Send + Sync {
    fn start(&self, worker: &WorkerContext);
    fn stop(&self, worker: &WorkerContext);
}
