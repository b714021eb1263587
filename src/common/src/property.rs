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

//! A typed, closed-enum property bag in place of an `any_cast`-style map
//! keyed by arbitrary strings. `PropertyKey` is a closed enum of recognized
//! keys; `PropertyValue` is a small tagged union instead of a type-erased
//! `Any`.

use std::collections::HashMap;

use crate::ids::{OperatorId, QuerySubPlanId, WorkerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    PinnedWorkerId,
    Placed,
    PlacedSubPlanId,
    ConnectedSysSubPlanDetails,
    CoLocatedUpstreamOperators,
    UpstreamNonSystemOperatorId,
    DownstreamNonSystemOperatorId,
    IsBuffering,
    Epoch,
}

/// One entry of `CONNECTED_SYS_SUB_PLAN_DETAILS`: a relay sub-plan id and the
/// worker it was placed on, recorded on the originating leaf operator so a
/// later amendment can find and reconfigure the relay chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysPlanMetaData {
    pub sub_plan_id: QuerySubPlanId,
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Worker(WorkerId),
    Operator(OperatorId),
    SubPlanId(QuerySubPlanId),
    Bool(bool),
    U64(u64),
    F64(f64),
    SysPlanMetaDataList(Vec<SysPlanMetaData>),
}

impl PropertyValue {
    pub fn as_worker(&self) -> Option<WorkerId> {
        match self {
            PropertyValue::Worker(w) => Some(*w),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<OperatorId> {
        match self {
            PropertyValue::Operator(o) => Some(*o),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_sys_plan_meta_data_list(&self) -> Option<&[SysPlanMetaData]> {
        match self {
            PropertyValue::SysPlanMetaDataList(v) => Some(v),
            _ => None,
        }
    }
}

/// Keyed property map attached to operators and topology nodes.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    entries: HashMap<PropertyKey, PropertyValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.entries.get(&key)
    }

    pub fn has(&self, key: PropertyKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn remove(&mut self, key: PropertyKey) -> Option<PropertyValue> {
        self.entries.remove(&key)
    }

    /// Convenience used throughout placement: a boolean flag that defaults
    /// to `false` when unset, so an absent property reads as "false"
    /// rather than requiring callers to handle a third state.
    pub fn flag(&self, key: PropertyKey) -> bool {
        self.get(key).and_then(PropertyValue::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flag_defaults_false() {
        let bag = PropertyBag::new();
        assert!(!bag.flag(PropertyKey::CoLocatedUpstreamOperators));
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut bag = PropertyBag::new();
        bag.set(PropertyKey::PinnedWorkerId, PropertyValue::Worker(WorkerId(7)));
        assert_eq!(
            bag.get(PropertyKey::PinnedWorkerId).and_then(PropertyValue::as_worker),
            Some(WorkerId(7))
        );
    }
}
