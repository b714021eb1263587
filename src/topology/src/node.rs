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

//! A single worker in the topology, per `spec.md` §3 "Topology Node".

use nes_common::ids::WorkerId;
use nes_common::property::{PropertyBag, PropertyKey, PropertyValue};

use crate::error::TopologyError;

/// Memory/network capacities of a worker. `available_*` decreases
/// monotonically across successful occupations until released; `initial_*` is
/// kept around so fault-tolerance scoring can compute headroom ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacities {
    pub available_memory: u64,
    pub initial_memory: u64,
    pub available_network: u64,
    pub initial_network: u64,
}

impl Capacities {
    pub fn new(initial_memory: u64, initial_network: u64) -> Self {
        Self {
            available_memory: initial_memory,
            initial_memory,
            available_network: initial_network,
            initial_network,
        }
    }

    pub fn memory_headroom(&self) -> f64 {
        if self.initial_memory == 0 {
            0.0
        } else {
            self.available_memory as f64 / self.initial_memory as f64
        }
    }

    pub fn network_headroom(&self) -> f64 {
        if self.initial_network == 0 {
            0.0
        } else {
            self.available_network as f64 / self.initial_network as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopologyNode {
    pub id: WorkerId,
    pub ip: String,
    pub data_port: u16,
    available_resource_slots: u32,
    initial_resource_slots: u32,
    pub capacities: Capacities,
    pub reliability: f64,
    pub epoch: u64,
    pub properties: PropertyBag,
}

impl TopologyNode {
    pub fn new(
        id: WorkerId,
        ip: impl Into<String>,
        data_port: u16,
        resource_slots: u32,
        capacities: Capacities,
        reliability: f64,
    ) -> Self {
        Self {
            id,
            ip: ip.into(),
            data_port,
            available_resource_slots: resource_slots,
            initial_resource_slots: resource_slots,
            capacities,
            reliability,
            epoch: 0,
            properties: PropertyBag::new(),
        }
    }

    pub fn available_resource_slots(&self) -> u32 {
        self.available_resource_slots
    }

    pub fn initial_resource_slots(&self) -> u32 {
        self.initial_resource_slots
    }

    /// `occupySlots(n)`: atomic decrement, fails with `ResourceExhausted` if
    /// `available < n`. Part of THE CORE's resource non-negativity invariant
    /// (`spec.md` §8): never returns with `available_resource_slots` negative.
    pub fn occupy_slots(&mut self, n: u32) -> Result<(), TopologyError> {
        if self.available_resource_slots < n {
            return Err(TopologyError::ResourceExhausted {
                worker: self.id,
                requested: n,
                available: self.available_resource_slots,
            });
        }
        self.available_resource_slots -= n;
        Ok(())
    }

    pub fn release_slots(&mut self, n: u32) {
        self.available_resource_slots =
            (self.available_resource_slots + n).min(self.initial_resource_slots);
    }

    pub fn reduce_memory(&mut self, amount: u64) -> Result<(), TopologyError> {
        if self.capacities.available_memory < amount {
            return Err(TopologyError::ResourceExhausted {
                worker: self.id,
                requested: amount as u32,
                available: self.capacities.available_memory as u32,
            });
        }
        self.capacities.available_memory -= amount;
        Ok(())
    }

    pub fn reduce_network(&mut self, amount: u64) -> Result<(), TopologyError> {
        if self.capacities.available_network < amount {
            return Err(TopologyError::ResourceExhausted {
                worker: self.id,
                requested: amount as u32,
                available: self.capacities.available_network as u32,
            });
        }
        self.capacities.available_network -= amount;
        Ok(())
    }

    pub fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
        self.properties.set(PropertyKey::Epoch, PropertyValue::U64(epoch));
    }

    pub fn set_buffering(&mut self, buffering: bool) {
        self.properties
            .set(PropertyKey::IsBuffering, PropertyValue::Bool(buffering));
    }

    pub fn is_buffering(&self) -> bool {
        self.properties.flag(PropertyKey::IsBuffering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> TopologyNode {
        TopologyNode::new(WorkerId(1), "127.0.0.1", 4000, 4, Capacities::new(1000, 1000), 0.99)
    }

    #[test]
    fn occupy_slots_decrements_and_rejects_overflow() {
        let mut n = node();
        n.occupy_slots(3).unwrap();
        assert_eq!(n.available_resource_slots(), 1);
        assert!(n.occupy_slots(2).is_err());
        // a failed call must not mutate state (resource non-negativity invariant)
        assert_eq!(n.available_resource_slots(), 1);
    }

    #[test]
    fn release_slots_is_capped_at_initial() {
        let mut n = node();
        n.occupy_slots(2).unwrap();
        n.release_slots(10);
        assert_eq!(n.available_resource_slots(), n.initial_resource_slots());
    }
}
