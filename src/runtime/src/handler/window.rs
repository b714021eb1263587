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

//! Window operator handler state: a per-key slice store keyed by
//! `(key, startTs, endTs)`, holding a running partial aggregate per key
//! per slice.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use nes_common::ids::OriginId;
use nes_plan::{AggregationFunction, WindowDescriptor};

use crate::context::WorkerContext;
use crate::handler::OperatorHandler;

pub type SliceKey = (u64, u64, u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialAggregate {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl PartialAggregate {
    pub fn fold(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Merges an aggregate computed elsewhere (e.g. a sibling worker's
    /// slice for the same key and window) into this one, the "combine"
    /// half of NES's slicing/combining window split.
    pub fn merge(&mut self, other: &PartialAggregate) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn finalize(&self, agg: AggregationFunction) -> f64 {
        match agg {
            AggregationFunction::Sum => self.sum,
            AggregationFunction::Count => self.count as f64,
            AggregationFunction::Min => self.min,
            AggregationFunction::Max => self.max,
            AggregationFunction::Avg => {
                if self.count == 0 {
                    0.0
                } else {
                    self.sum / self.count as f64
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SliceStore {
    slices: HashMap<SliceKey, PartialAggregate>,
}

impl SliceStore {
    pub fn update(&mut self, key: u64, start_ts: u64, end_ts: u64, value: f64) {
        self.slices.entry((key, start_ts, end_ts)).or_default().fold(value);
    }

    pub fn combine(&mut self, key: u64, start_ts: u64, end_ts: u64, other: PartialAggregate) {
        self.slices.entry((key, start_ts, end_ts)).or_default().merge(&other);
    }

    pub fn get(&self, key: u64, start_ts: u64, end_ts: u64) -> Option<PartialAggregate> {
        self.slices.get(&(key, start_ts, end_ts)).copied()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Removes and returns every slice whose `end_ts` has fully passed the
    /// watermark, the set a triggered window finalizes and emits.
    pub fn drain_complete(&mut self, watermark: u64) -> Vec<(SliceKey, PartialAggregate)> {
        let ready: Vec<SliceKey> = self.slices.keys().filter(|(_, _, end)| *end <= watermark).copied().collect();
        ready.into_iter().map(|k| (k, self.slices.remove(&k).unwrap())).collect()
    }
}

#[derive(Debug, Default)]
pub struct WindowState {
    store: SliceStore,
}

impl WindowState {
    pub fn slice_store(&mut self) -> &mut SliceStore {
        &mut self.store
    }
}

/// Retrieved via `PipelineExecutionContext::get_operator_handler`, per
/// `spec.md` §4.G; owns the `WindowState` behind a short-critical-section
/// lock and the watermark the trigger policy evaluates against.
pub struct WindowHandler {
    descriptor: WindowDescriptor,
    state: Mutex<WindowState>,
    watermark: AtomicU64,
}

impl WindowHandler {
    pub fn new(descriptor: WindowDescriptor) -> Self {
        Self {
            descriptor,
            state: Mutex::new(WindowState::default()),
            watermark: AtomicU64::new(0),
        }
    }

    pub fn get_typed_window_state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock()
    }

    pub fn update_watermark(&self, watermark: u64, _origin: OriginId) {
        self.watermark.fetch_max(watermark, Ordering::Relaxed);
    }

    pub fn watermark(&self) -> u64 {
        self.watermark.load(Ordering::Relaxed)
    }

    /// Drains every slice whose window has fully passed the current
    /// watermark and finalizes it via the descriptor's aggregation function.
    pub fn trigger(&self) -> Vec<(SliceKey, f64)> {
        let watermark = self.watermark();
        let drained = self.state.lock().store.drain_complete(watermark);
        tracing::debug!(watermark, triggered = drained.len(), "window handler triggered");
        drained.into_iter().map(|(key, partial)| (key, partial.finalize(self.descriptor.aggregation))).collect()
    }
}

impl OperatorHandler for WindowHandler {
    fn start(&self, _worker: &WorkerContext) {}

    fn stop(&self, _worker: &WorkerContext) {
        self.state.lock().store.slices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::{TimeCharacteristic, TriggerPolicy, WindowType};
    use std::time::Duration;

    fn descriptor() -> WindowDescriptor {
        WindowDescriptor {
            keyed: true,
            key_field: Some("id".into()),
            window_type: WindowType::Tumbling { size: Duration::from_millis(10) },
            time_characteristic: TimeCharacteristic::IngestionTime,
            timestamp_field: None,
            aggregation: AggregationFunction::Sum,
            aggregated_field: "value".into(),
            trigger_policy: TriggerPolicy::OnWatermark,
        }
    }

    #[test]
    fn trigger_only_emits_slices_the_watermark_has_passed() {
        let handler = WindowHandler::new(descriptor());
        handler.get_typed_window_state().slice_store().update(1, 0, 10, 3.0);
        handler.get_typed_window_state().slice_store().update(1, 10, 20, 4.0);
        handler.update_watermark(10, OriginId(0));

        let triggered = handler.trigger();
        assert_eq!(triggered, vec![((1, 0, 10), 3.0)]);
        assert_eq!(handler.get_typed_window_state().slice_store().len(), 1);
    }

    #[test]
    fn combine_merges_partial_aggregates_from_two_updates() {
        let mut store = SliceStore::default();
        store.update(1, 0, 10, 3.0);
        store.combine(1, 0, 10, PartialAggregate { count: 1, sum: 4.0, min: 4.0, max: 4.0 });
        let combined = store.get(1, 0, 10).unwrap();
        assert_eq!(combined.count, 2);
        assert_eq!(combined.finalize(AggregationFunction::Sum), 7.0);
    }
}
