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

//! Configuration enums passed into placement, per `spec.md` §6 "External
//! Interfaces / Configuration". `nes_config` loads these from TOML/env and
//! hands them to `PlacementPlanner`; defined here rather than there so the
//! planner crate has no reverse dependency on the config-loading crate.

use std::time::Duration;

use nes_common::retry::BackoffPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementAmendmentMode {
    Pessimistic,
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultToleranceMode {
    None,
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineageMode {
    None,
    InMemory,
    Persistent,
}

/// Retry knobs from `spec.md` §6: path-selection backoff plus the
/// network-endpoint retry policies handed to network sink/source
/// descriptors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    pub path_selection_retry_wait: Duration,
    pub max_path_selection_retry_wait: Duration,
    pub max_path_selection_retries: u32,
    pub source_retry_wait: Duration,
    pub source_retries: u32,
    pub sink_retry_wait: Duration,
    pub sink_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            path_selection_retry_wait: Duration::from_millis(50),
            max_path_selection_retry_wait: Duration::from_secs(5),
            max_path_selection_retries: 10,
            source_retry_wait: Duration::from_millis(100),
            source_retries: 10,
            sink_retry_wait: Duration::from_millis(100),
            sink_retries: 10,
        }
    }
}

impl RetryConfig {
    pub fn path_selection_backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.path_selection_retry_wait,
            self.max_path_selection_retry_wait,
            self.max_path_selection_retries,
        )
    }
}
