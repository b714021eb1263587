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

//! Join operator handler state: one append-list bucket per `(key, startTs,
//! endTs)` per side, evicted by watermark rather than by an entry-count
//! limit.

use std::collections::HashMap;

use parking_lot::Mutex;

use nes_plan::JoinDescriptor;

use crate::buffer::Record;
use crate::context::WorkerContext;
use crate::handler::OperatorHandler;

pub type SliceKey = (u64, u64, u64);

#[derive(Debug, Default)]
pub struct JoinState {
    buckets: HashMap<SliceKey, Vec<Record>>,
}

impl JoinState {
    pub fn append(&mut self, key: u64, start_ts: u64, end_ts: u64, record: Record) {
        self.buckets.entry((key, start_ts, end_ts)).or_default().push(record);
    }

    pub fn get(&self, key: u64, start_ts: u64, end_ts: u64) -> &[Record] {
        self.buckets.get(&(key, start_ts, end_ts)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drops every bucket whose window has fully passed `watermark`.
    pub fn evict_before(&mut self, watermark: u64) {
        self.buckets.retain(|(_, _, end), _| *end > watermark);
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Retrieved via `PipelineExecutionContext::get_operator_handler`; a binary
/// operator's two `BinaryLeft`/`BinaryRight` pipeline fragments each append
/// into their own side's state, and `probe` pairs matching keys within the
/// same window once both sides have seen it.
pub struct JoinHandler {
    descriptor: JoinDescriptor,
    left: Mutex<JoinState>,
    right: Mutex<JoinState>,
}

impl JoinHandler {
    pub fn new(descriptor: JoinDescriptor) -> Self {
        Self {
            descriptor,
            left: Mutex::new(JoinState::default()),
            right: Mutex::new(JoinState::default()),
        }
    }

    pub fn get_left_join_state(&self) -> parking_lot::MutexGuard<'_, JoinState> {
        self.left.lock()
    }

    pub fn get_right_join_state(&self) -> parking_lot::MutexGuard<'_, JoinState> {
        self.right.lock()
    }

    /// Cartesian-products the left and right buckets for `(key, startTs,
    /// endTs)`, honoring `JoinType::Cartesian`/`Inner` (both sides are
    /// already bucketed by the shared join key, so `Inner` and `Cartesian`
    /// differ only in whether non-matching keys would have been appended at
    /// all — a distinction already resolved upstream by which bucket a
    /// tuple lands in).
    pub fn probe(&self, key: u64, start_ts: u64, end_ts: u64) -> Vec<(Record, Record)> {
        let _ = self.descriptor.join_type;
        let left = self.left.lock();
        let right = self.right.lock();
        let mut out = Vec::new();
        for l in left.get(key, start_ts, end_ts) {
            for r in right.get(key, start_ts, end_ts) {
                out.push((l.clone(), r.clone()));
            }
        }
        out
    }
}

impl OperatorHandler for JoinHandler {
    fn start(&self, _worker: &WorkerContext) {}

    fn stop(&self, _worker: &WorkerContext) {
        self.left.lock().buckets.clear();
        self.right.lock().buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::{AggregationFunction, JoinType, TimeCharacteristic, TriggerPolicy, WindowDescriptor, WindowType};
    use std::time::Duration;

    fn handler() -> JoinHandler {
        JoinHandler::new(JoinDescriptor {
            join_type: JoinType::Inner,
            left_key_field: "id".into(),
            right_key_field: "id".into(),
            window: WindowDescriptor {
                keyed: true,
                key_field: Some("id".into()),
                window_type: WindowType::Tumbling { size: Duration::from_millis(10) },
                time_characteristic: TimeCharacteristic::IngestionTime,
                timestamp_field: None,
                aggregation: AggregationFunction::Count,
                aggregated_field: "id".into(),
                trigger_policy: TriggerPolicy::OnWatermark,
            },
        })
    }

    #[test]
    fn probe_pairs_matching_keys_within_the_same_window() {
        let handler = handler();
        handler.get_left_join_state().append(1, 0, 10, Record::from([("id".into(), crate::buffer::FieldValue::Int(1))]));
        handler.get_right_join_state().append(1, 0, 10, Record::from([("id".into(), crate::buffer::FieldValue::Int(1))]));
        handler.get_right_join_state().append(1, 0, 10, Record::from([("id".into(), crate::buffer::FieldValue::Int(1))]));

        let pairs = handler.probe(1, 0, 10);
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn evict_before_drops_only_passed_windows() {
        let mut state = JoinState::default();
        state.append(1, 0, 10, Record::new());
        state.append(1, 10, 20, Record::new());
        state.evict_before(10);
        assert_eq!(state.len(), 1);
    }
}
