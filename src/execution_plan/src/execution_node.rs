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

//! `ExecutionNode`: the per-topology-node container of sub-plans indexed by
//! `SharedQueryId`, per `spec.md` §3 "Execution Node".

use std::collections::HashMap;

use nes_common::ids::{QuerySubPlanId, SharedQueryId, WorkerId};
use nes_plan::QuerySubPlan;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionPlanError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionNode {
    pub worker_id: WorkerId,
    plans: HashMap<SharedQueryId, Vec<QuerySubPlan>>,
}

impl ExecutionNode {
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            plans: HashMap::new(),
        }
    }

    pub fn shared_query_ids(&self) -> impl Iterator<Item = SharedQueryId> + '_ {
        self.plans.keys().copied()
    }

    pub fn sub_plans(&self, shared_query_id: SharedQueryId) -> &[QuerySubPlan] {
        self.plans.get(&shared_query_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sub_plans_mut(&mut self, shared_query_id: SharedQueryId) -> &mut Vec<QuerySubPlan> {
        self.plans.entry(shared_query_id).or_default()
    }

    pub fn find_sub_plan(&self, shared_query_id: SharedQueryId, id: QuerySubPlanId) -> Result<&QuerySubPlan, ExecutionPlanError> {
        self.sub_plans(shared_query_id)
            .iter()
            .find(|p| p.id == id)
            .ok_or(ExecutionPlanError::UnknownSubPlan(shared_query_id, id))
    }

    pub fn remove_shared_query(&mut self, shared_query_id: SharedQueryId) {
        self.plans.remove(&shared_query_id);
    }

    pub fn is_empty(&self) -> bool {
        self.plans.values().all(Vec::is_empty)
    }

    pub fn total_sub_plan_count(&self) -> usize {
        self.plans.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes_plan::QuerySubPlan;

    #[test]
    fn fresh_node_reports_no_sub_plans() {
        let node = ExecutionNode::new(WorkerId(1));
        assert!(node.sub_plans(SharedQueryId(1)).is_empty());
        assert!(node.is_empty());
    }

    #[test]
    fn insert_and_find_round_trip() {
        let mut node = ExecutionNode::new(WorkerId(1));
        node.sub_plans_mut(SharedQueryId(1))
            .push(QuerySubPlan::new(QuerySubPlanId(5), SharedQueryId(1), WorkerId(1)));
        assert_eq!(node.total_sub_plan_count(), 1);
        assert!(node.find_sub_plan(SharedQueryId(1), QuerySubPlanId(5)).is_ok());
        assert!(matches!(
            node.find_sub_plan(SharedQueryId(1), QuerySubPlanId(6)),
            Err(ExecutionPlanError::UnknownSubPlan(_, _))
        ));
    }
}
