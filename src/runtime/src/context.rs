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

//! `PipelineExecutionContext` and `WorkerContext`, per `spec.md` §4.G: the
//! two objects a generated pipeline's `execute(inputBuffer,
//! pipelineExecutionContext, workerContext)` receives.

use std::any::Any;
use std::sync::Arc;

use nes_common::ids::{OriginId, WorkerId};

use crate::buffer::{BufferPool, TupleBuffer};
use crate::error::RuntimeError;

/// Owns the operator-handler registry a compiled pipeline indexes into
/// (`getOperatorHandler<T>(index)`), plus the buffer pool its `execute` body
/// allocates from and emits into.
pub struct PipelineExecutionContext {
    handlers: Vec<Arc<dyn Any + Send + Sync>>,
    buffer_pool: Arc<BufferPool>,
}

impl PipelineExecutionContext {
    pub fn new(buffer_pool: Arc<BufferPool>) -> Self {
        Self {
            handlers: Vec::new(),
            buffer_pool,
        }
    }

    /// Registers a handler at the next free index, returned for the caller
    /// to wire into the `CompiledPipeline::handler_types` slot it occupies.
    pub fn register_handler<T: Any + Send + Sync>(&mut self, handler: Arc<T>) -> u32 {
        self.handlers.push(handler);
        (self.handlers.len() - 1) as u32
    }

    /// `getOperatorHandler<T>`: looks a handler up by index and downcasts it
    /// to the type the calling pipeline stage expects.
    pub fn get_operator_handler<T: Any + Send + Sync>(&self, index: u32) -> Result<Arc<T>, RuntimeError> {
        let handler = self.handlers.get(index as usize).ok_or(RuntimeError::UnknownHandler(index))?;
        Arc::clone(handler).downcast::<T>().map_err(|_| RuntimeError::HandlerTypeMismatch {
            index,
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn allocate_tuple_buffer(&self, origin_id: OriginId) -> TupleBuffer {
        self.buffer_pool.allocate_tuple_buffer(origin_id)
    }

    pub async fn emit_buffer(&self, buffer: TupleBuffer, _worker: &WorkerContext) -> Result<(), RuntimeError> {
        self.buffer_pool.emit_buffer(buffer).await
    }
}

/// One per worker thread: the worker's id and its inbound buffer pool.
/// `spec.md` §4.G describes this as carrying a "thread-local id"; rather
/// than a real `std::thread_local!` global, each worker thread owns exactly
/// one `WorkerContext` value and threads it explicitly through `execute`
/// calls, the same explicit-context-passing convention `nes_placement` and
/// `nes_execution_plan` already use instead of ambient globals.
pub struct WorkerContext {
    pub worker_id: WorkerId,
    buffer_pool: Arc<BufferPool>,
}

impl WorkerContext {
    pub fn new(worker_id: WorkerId, buffer_pool: Arc<BufferPool>) -> Self {
        Self { worker_id, buffer_pool }
    }

    pub async fn get_buffer_blocking(&self) -> Result<TupleBuffer, RuntimeError> {
        tracing::trace!(worker_id = %self.worker_id, "worker blocked on next tuple buffer");
        self.buffer_pool.get_buffer_blocking().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::WatermarkHandler;

    #[test]
    fn registered_handler_round_trips_through_get_operator_handler() {
        let pool = Arc::new(BufferPool::new(4));
        let mut ctx = PipelineExecutionContext::new(pool);
        let handler = Arc::new(WatermarkHandler::new());
        let index = ctx.register_handler(Arc::clone(&handler));

        handler.update_watermark(50, OriginId(1));
        let fetched = ctx.get_operator_handler::<WatermarkHandler>(index).unwrap();
        assert_eq!(fetched.current(), 50);
    }

    #[test]
    fn unknown_index_is_reported() {
        let pool = Arc::new(BufferPool::new(4));
        let ctx = PipelineExecutionContext::new(pool);
        assert!(ctx.get_operator_handler::<WatermarkHandler>(0).is_err());
    }
}
