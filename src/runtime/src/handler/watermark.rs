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

//! Tracks one watermark per `OriginId` feeding a pipeline (a union of
//! several sources advances its combined watermark no faster than its
//! slowest origin) and exposes the minimum as the watermark downstream
//! window/join handlers trigger against.

use std::collections::HashMap;

use parking_lot::Mutex;

use nes_common::ids::OriginId;

use crate::context::WorkerContext;
use crate::handler::OperatorHandler;

#[derive(Debug, Default)]
pub struct WatermarkHandler {
    per_origin: Mutex<HashMap<OriginId, u64>>,
}

impl WatermarkHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_watermark(&self, watermark: u64, origin: OriginId) {
        let mut map = self.per_origin.lock();
        let entry = map.entry(origin).or_insert(0);
        *entry = (*entry).max(watermark);
    }

    /// The combined watermark: the minimum across every origin that has
    /// reported one, or `0` if none has yet.
    pub fn current(&self) -> u64 {
        self.per_origin.lock().values().copied().min().unwrap_or(0)
    }
}

impl OperatorHandler for WatermarkHandler {
    fn start(&self, _worker: &WorkerContext) {}

    fn stop(&self, _worker: &WorkerContext) {
        self.per_origin.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_watermark_is_bounded_by_the_slowest_origin() {
        let handler = WatermarkHandler::new();
        handler.update_watermark(100, OriginId(1));
        handler.update_watermark(40, OriginId(2));
        assert_eq!(handler.current(), 40);
    }
}
