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

//! `QueryPlan` and `QuerySubPlan`: the DAG of operators and the maximal
//! connected subsets placed on one worker, per `spec.md` §3. Operators are
//! stored in an id-keyed arena rather than linked by owned references or raw
//! pointers, per the Design Notes' "arena + stable integer ids" guidance — a
//! `HashMap<OperatorId, OperatorNode>` rather than a dense `Vec`, since
//! sub-plan merges and `INVALID_QUERY_SUB_PLAN_ID` markers make operator ids
//! non-contiguous in practice.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use nes_common::ids::{OperatorId, QuerySubPlanId, SharedQueryId, WorkerId};

use crate::error::PlanError;
use crate::operator::OperatorNode;

/// An arena of operators connected by `OperatorHeader::children`/`parents` id
/// edges, shared by both `QueryPlan` and `QuerySubPlan`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorArena {
    operators: HashMap<OperatorId, OperatorNode>,
}

impl OperatorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: OperatorNode) {
        self.operators.insert(node.id(), node);
    }

    pub fn remove(&mut self, id: OperatorId) -> Option<OperatorNode> {
        self.operators.remove(&id)
    }

    pub fn get(&self, id: OperatorId) -> Result<&OperatorNode, PlanError> {
        self.operators.get(&id).ok_or(PlanError::UnknownOperator(id))
    }

    pub fn get_mut(&mut self, id: OperatorId) -> Result<&mut OperatorNode, PlanError> {
        self.operators.get_mut(&id).ok_or(PlanError::UnknownOperator(id))
    }

    pub fn contains(&self, id: OperatorId) -> bool {
        self.operators.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = OperatorId> + '_ {
        self.operators.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Wires `child -> parent` (data flows from `child` to `parent`;
    /// `children` = upstream, `parents` = downstream).
    pub fn add_edge(&mut self, child: OperatorId, parent: OperatorId) -> Result<(), PlanError> {
        self.get_mut(child)?.header.parents.push(parent);
        self.get_mut(parent)?.header.children.push(child);
        Ok(())
    }

    pub fn remove_edge(&mut self, child: OperatorId, parent: OperatorId) -> Result<(), PlanError> {
        self.get_mut(child)?.header.parents.retain(|p| *p != parent);
        self.get_mut(parent)?.header.children.retain(|c| *c != child);
        Ok(())
    }

    /// Operators with no recorded parent: the current roots of this arena.
    pub fn roots(&self) -> Vec<OperatorId> {
        self.operators
            .values()
            .filter(|op| op.header.parents.is_empty())
            .map(|op| op.id())
            .collect()
    }

    /// Operators with no recorded children: the current leaves.
    pub fn leaves(&self) -> Vec<OperatorId> {
        self.operators
            .values()
            .filter(|op| op.header.children.is_empty())
            .map(|op| op.id())
            .collect()
    }

    pub fn extend(&mut self, other: OperatorArena) {
        self.operators.extend(other.operators);
    }
}

/// A DAG of operators with a designated root set (sinks) and leaves
/// (sources), per `spec.md` §3 "Query Plan".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryPlan {
    pub shared_query_id: SharedQueryId,
    pub arena: OperatorArena,
}

impl QueryPlan {
    pub fn new(shared_query_id: SharedQueryId) -> Self {
        Self {
            shared_query_id,
            arena: OperatorArena::new(),
        }
    }

    pub fn sinks(&self) -> Vec<OperatorId> {
        self.arena
            .operators
            .values()
            .filter(|op| op.kind.is_sink())
            .map(|op| op.id())
            .collect()
    }

    pub fn sources(&self) -> Vec<OperatorId> {
        self.arena
            .operators
            .values()
            .filter(|op| op.kind.is_source())
            .map(|op| op.id())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPlanState {
    MarkedForDeployment,
    MarkedForRedeployment,
    Running,
    MarkedForStop,
}

/// A maximal connected subset of the placed plan assigned to one topology
/// node, per `spec.md` §3 "Query Sub-Plan".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySubPlan {
    pub id: QuerySubPlanId,
    pub shared_query_id: SharedQueryId,
    pub worker_id: WorkerId,
    pub version: u64,
    pub state: SubPlanState,
    pub arena: OperatorArena,
}

impl QuerySubPlan {
    pub fn new(id: QuerySubPlanId, shared_query_id: SharedQueryId, worker_id: WorkerId) -> Self {
        Self {
            id,
            shared_query_id,
            worker_id,
            version: 1,
            state: SubPlanState::MarkedForDeployment,
            arena: OperatorArena::new(),
        }
    }

    pub fn roots(&self) -> Vec<OperatorId> {
        self.arena.roots()
    }

    pub fn leaves(&self) -> Vec<OperatorId> {
        self.arena.leaves()
    }

    pub fn contains(&self, id: OperatorId) -> bool {
        self.arena.contains(id)
    }

    /// Absorbs `other` into `self` (used when two sub-plans become connected
    /// by a newly placed operator and must be coalesced). The new combined
    /// sub-plan keeps `self`'s id; callers are responsible for discarding
    /// `other`'s id from the execution node.
    pub fn merge(&mut self, other: QuerySubPlan) {
        self.arena.extend(other.arena);
        self.version = self.version.max(other.version);
        self.state = SubPlanState::MarkedForRedeployment;
    }

    pub fn mark_for_redeployment(&mut self) {
        self.state = SubPlanState::MarkedForRedeployment;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::OperatorKind;
    use crate::schema::Schema;

    fn src(id: u64) -> OperatorNode {
        OperatorNode::new(
            OperatorId(id),
            OperatorKind::Source {
                logical_source_name: "s".into(),
            },
        )
    }

    fn sink(id: u64) -> OperatorNode {
        OperatorNode::new(
            OperatorId(id),
            OperatorKind::Sink {
                logical_sink_name: "sink".into(),
            },
        )
    }

    #[test]
    fn plan_tracks_sources_and_sinks() {
        let mut plan = QueryPlan::new(SharedQueryId(1));
        plan.arena.insert(src(1));
        plan.arena.insert(sink(2));
        plan.arena.add_edge(OperatorId(1), OperatorId(2)).unwrap();
        assert_eq!(plan.sources(), vec![OperatorId(1)]);
        assert_eq!(plan.sinks(), vec![OperatorId(2)]);
        assert_eq!(plan.arena.roots(), vec![OperatorId(2)]);
        assert_eq!(plan.arena.leaves(), vec![OperatorId(1)]);
        let _ = Schema::empty();
    }

    #[test]
    fn merge_combines_operators_and_marks_redeployment() {
        let mut a = QuerySubPlan::new(QuerySubPlanId(1), SharedQueryId(1), WorkerId(1));
        a.arena.insert(src(1));
        let mut b = QuerySubPlan::new(QuerySubPlanId(2), SharedQueryId(1), WorkerId(1));
        b.arena.insert(sink(2));
        a.merge(b);
        assert_eq!(a.arena.len(), 2);
        assert_eq!(a.state, SubPlanState::MarkedForRedeployment);
    }
}
