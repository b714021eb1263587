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

//! `NesConfig`: the typed configuration surface of `spec.md` §6, loaded from
//! a TOML file with environment-variable overrides layered on top.

use std::path::Path;

use serde::{Deserialize, Serialize};

use nes_placement::{FaultToleranceMode, LineageMode, PlacementAmendmentMode, RetryConfig};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NesConfig {
    pub placement_amendment_mode: PlacementAmendmentMode,
    pub fault_tolerance_mode: FaultToleranceMode,
    pub lineage_mode: LineageMode,
    pub retry: RetryConfig,
    /// Capacity of each `nes_runtime::BufferPool` a worker opens between
    /// pipeline stages.
    pub buffer_pool_capacity: usize,
    /// The port a worker's `NodeLocation` advertises for network sink/source
    /// traffic, per `spec.md` §6.
    pub worker_data_port: u16,
}

impl Default for NesConfig {
    fn default() -> Self {
        Self {
            placement_amendment_mode: PlacementAmendmentMode::Pessimistic,
            fault_tolerance_mode: FaultToleranceMode::AtLeastOnce,
            lineage_mode: LineageMode::None,
            retry: RetryConfig::default(),
            buffer_pool_capacity: 64,
            worker_data_port: 4000,
        }
    }
}

impl NesConfig {
    /// Reads and parses a TOML config file. Missing fields fall back to
    /// `Default::default()` for their section via `#[serde(default)]`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded NesConfig from file");
        Ok(toml::from_str(&text)?)
    }

    /// Applies the `NES_*` environment variable overrides documented in
    /// `spec.md` §6, on top of whatever a config file (or `Default`)
    /// already set. Unset variables leave the corresponding field untouched.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = read_env("NES_PLACEMENT_AMENDMENT_MODE")? {
            self.placement_amendment_mode = parse_enum(
                "NES_PLACEMENT_AMENDMENT_MODE",
                &value,
                &[("pessimistic", PlacementAmendmentMode::Pessimistic), ("optimistic", PlacementAmendmentMode::Optimistic)],
            )?;
        }
        if let Some(value) = read_env("NES_FAULT_TOLERANCE_MODE")? {
            self.fault_tolerance_mode = parse_enum(
                "NES_FAULT_TOLERANCE_MODE",
                &value,
                &[
                    ("none", FaultToleranceMode::None),
                    ("at_most_once", FaultToleranceMode::AtMostOnce),
                    ("at_least_once", FaultToleranceMode::AtLeastOnce),
                    ("exactly_once", FaultToleranceMode::ExactlyOnce),
                ],
            )?;
        }
        if let Some(value) = read_env("NES_LINEAGE_MODE")? {
            self.lineage_mode = parse_enum(
                "NES_LINEAGE_MODE",
                &value,
                &[("none", LineageMode::None), ("in_memory", LineageMode::InMemory), ("persistent", LineageMode::Persistent)],
            )?;
        }
        if let Some(value) = read_env("NES_BUFFER_POOL_CAPACITY")? {
            self.buffer_pool_capacity = value.parse().map_err(|_| ConfigError::InvalidEnvValue {
                key: "NES_BUFFER_POOL_CAPACITY",
                value: value.clone(),
            })?;
        }
        if let Some(value) = read_env("NES_WORKER_DATA_PORT")? {
            self.worker_data_port = value.parse().map_err(|_| ConfigError::InvalidEnvValue {
                key: "NES_WORKER_DATA_PORT",
                value: value.clone(),
            })?;
        }
        Ok(self)
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvValue {
            key,
            value: "<non-unicode>".to_string(),
        }),
    }
}

fn parse_enum<T: Copy>(key: &'static str, value: &str, options: &[(&str, T)]) -> Result<T, ConfigError> {
    options
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, v)| *v)
        .ok_or_else(|| ConfigError::InvalidEnvValue {
            key,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = NesConfig::default();
        assert_eq!(config.placement_amendment_mode, PlacementAmendmentMode::Pessimistic);
        assert_eq!(config.buffer_pool_capacity, 64);
    }

    #[test]
    fn toml_round_trips_a_partial_override() {
        let text = "fault_tolerance_mode = \"ExactlyOnce\"\n";
        let config: NesConfig = toml::from_str(text).unwrap();
        assert_eq!(config.fault_tolerance_mode, FaultToleranceMode::ExactlyOnce);
        assert_eq!(config.placement_amendment_mode, PlacementAmendmentMode::Pessimistic);
    }

    #[test]
    fn invalid_env_value_is_reported() {
        std::env::set_var("NES_BUFFER_POOL_CAPACITY", "not-a-number");
        let result = NesConfig::default().with_env_overrides();
        std::env::remove_var("NES_BUFFER_POOL_CAPACITY");
        assert!(result.is_err());
    }
}
