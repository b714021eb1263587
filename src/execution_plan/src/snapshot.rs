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

//! The compact persisted form of a [`crate::GlobalExecutionPlan`], per
//! `spec.md` §6 "Persisted state": a flat list keyed by `(SharedQueryId,
//! WorkerId, QuerySubPlanId)`, each entry carrying the operator descriptors
//! with schema, properties, and parent/child id links (i.e. the
//! `QuerySubPlan` itself, which already derives `Serialize`/`Deserialize`).
//! Writing the bytes to a real store is catalog persistence, an external
//! collaborator per `spec.md` §1 scope; this crate only defines the shape and
//! the trait a persistence layer would implement.

use nes_common::ids::{SharedQueryId, WorkerId};
use nes_plan::QuerySubPlan;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionPlanError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub shared_query_id: SharedQueryId,
    pub worker_id: WorkerId,
    pub sub_plan: QuerySubPlan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalExecutionPlanSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

/// External collaborator contract: whoever persists `GlobalExecutionPlan`
/// snapshots (catalog persistence, out of scope per `spec.md` §1) implements
/// this. `nes_execution_plan` ships no implementation, only the trait.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &GlobalExecutionPlanSnapshot) -> Result<(), ExecutionPlanError>;
    fn load(&self) -> Result<Option<GlobalExecutionPlanSnapshot>, ExecutionPlanError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_common::ids::QuerySubPlanId;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = GlobalExecutionPlanSnapshot {
            entries: vec![SnapshotEntry {
                shared_query_id: SharedQueryId(1),
                worker_id: WorkerId(2),
                sub_plan: QuerySubPlan::new(QuerySubPlanId(3), SharedQueryId(1), WorkerId(2)),
            }],
        };
        let text = serde_json::to_string(&snapshot).unwrap();
        let restored: GlobalExecutionPlanSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(restored.entries.len(), 1);
        assert_eq!(restored.entries[0].sub_plan.id, QuerySubPlanId(3));
    }
}
