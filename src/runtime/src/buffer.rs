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

//! `TupleBuffer` and the `BufferPool` it flows through. Per `spec.md` §6 the
//! wire/in-memory frame header is `(numberOfTuples, bufferSizeInBytes,
//! originId, sequenceNumber, watermark)`; this crate represents the payload
//! itself as a `Vec<Record>` of typed field maps rather than raw bytes, since
//! no system compiler is actually laying the row out in memory here (§1).
//!
//! `BufferPool` is a bounded MPMC channel (`tokio::sync::mpsc`) wrapped by a
//! blocking-acquire façade: backpressure comes from the bounded channel
//! capacity, not a hand-rolled ring buffer.

use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex as AsyncMutex};

use nes_common::ids::OriginId;

use crate::error::RuntimeError;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

pub type Record = HashMap<String, FieldValue>;

/// One batch of tuples moving through a pipeline, carrying the frame header
/// fields `spec.md` §6 lists alongside the payload.
#[derive(Debug, Clone, Default)]
pub struct TupleBuffer {
    pub records: Vec<Record>,
    pub origin_id: OriginId,
    pub sequence_number: u64,
    pub watermark: u64,
}

impl TupleBuffer {
    pub fn new(origin_id: OriginId) -> Self {
        Self {
            records: Vec::new(),
            origin_id,
            sequence_number: 0,
            watermark: 0,
        }
    }

    pub fn number_of_tuples(&self) -> usize {
        self.records.len()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }
}

/// A bounded channel of tuple buffers flowing from one pipeline stage to the
/// next. `emit_buffer` is the producer side (blocks, i.e. applies
/// backpressure, once `capacity` buffers are in flight); `get_buffer_blocking`
/// is the consumer side.
pub struct BufferPool {
    sender: mpsc::Sender<TupleBuffer>,
    receiver: AsyncMutex<mpsc::Receiver<TupleBuffer>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: AsyncMutex::new(receiver),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocates a fresh, empty buffer for a pipeline stage to fill before
    /// emitting it. Allocation itself never blocks; backpressure is applied
    /// at `emit_buffer` instead, matching `allocateTupleBuffer`'s contract in
    /// `spec.md` §4.G.
    pub fn allocate_tuple_buffer(&self, origin_id: OriginId) -> TupleBuffer {
        TupleBuffer::new(origin_id)
    }

    /// `emitBuffer`: hands a filled buffer to the next pipeline stage,
    /// blocking if the channel is at capacity.
    pub async fn emit_buffer(&self, buffer: TupleBuffer) -> Result<(), RuntimeError> {
        self.sender.send(buffer).await.map_err(|_| RuntimeError::PoolClosed)
    }

    /// `getBufferBlocking`: the only blocking point in the concurrency model
    /// per `spec.md` §5 — waits for the next buffer a producer upstream has
    /// emitted.
    pub async fn get_buffer_blocking(&self) -> Result<TupleBuffer, RuntimeError> {
        self.receiver.lock().await.recv().await.ok_or(RuntimeError::PoolClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_then_receive_round_trips_a_buffer() {
        let pool = BufferPool::new(4);
        let mut buffer = pool.allocate_tuple_buffer(OriginId(1));
        buffer.push(Record::from([("id".to_string(), FieldValue::Int(7))]));
        pool.emit_buffer(buffer).await.unwrap();

        let received = pool.get_buffer_blocking().await.unwrap();
        assert_eq!(received.number_of_tuples(), 1);
        assert_eq!(received.origin_id, OriginId(1));
    }

    #[tokio::test]
    async fn pool_backpressures_once_capacity_is_exhausted() {
        let pool = BufferPool::new(1);
        pool.emit_buffer(TupleBuffer::new(OriginId(1))).await.unwrap();
        let second = tokio::time::timeout(std::time::Duration::from_millis(20), pool.emit_buffer(TupleBuffer::new(OriginId(1)))).await;
        assert!(second.is_err(), "second emit should have blocked on a full pool");
    }
}
