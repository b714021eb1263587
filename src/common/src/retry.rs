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

//! Exponential backoff shared by the PESSIMISTIC path-selection retry loop
//! and the OPTIMISTIC per-node lock-and-validate wait in `nes_placement`.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub max_retries: u32,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration, max_retries: u32) -> Self {
        Self {
            base,
            max,
            max_retries,
        }
    }

    /// Wait time before the `attempt`-th retry (0-indexed), doubling from
    /// `base` and capped at `max`.
    pub fn wait_for_attempt(&self, attempt: u32) -> Duration {
        let scale = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let scaled = self.base.checked_mul(scale as u32).unwrap_or(self.max);
        scaled.min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(100), 5);
        assert_eq!(policy.wait_for_attempt(0), Duration::from_millis(10));
        assert_eq!(policy.wait_for_attempt(1), Duration::from_millis(20));
        assert_eq!(policy.wait_for_attempt(2), Duration::from_millis(40));
        assert_eq!(policy.wait_for_attempt(10), Duration::from_millis(100));
    }
}
