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

//! Component G: the Runtime Contract a compiled pipeline executes against —
//! `TupleBuffer`, `PipelineExecutionContext`, `WorkerContext`, operator
//! handler state, and network sink/source plumbing, per `spec.md` §4.G.

pub mod buffer;
pub mod context;
pub mod error;
pub mod handler;
pub mod network;

pub use buffer::{BufferPool, FieldValue, Record, TupleBuffer};
pub use context::{PipelineExecutionContext, WorkerContext};
pub use error::RuntimeError;
pub use handler::{JoinHandler, JoinState, OperatorHandler, PartialAggregate, SliceStore, WatermarkHandler, WindowHandler, WindowState};
pub use network::{Input, LocalInput, NetworkInput, NetworkSink, NetworkSource};
