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

//! The topology container: a `RwLock`-guarded inner struct reached through
//! narrow accessor methods, with per-node exclusive locking layered on top
//! for placement's write path.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex, RwLock};

use nes_common::ids::WorkerId;

use crate::error::TopologyError;
use crate::node::TopologyNode;

/// An exclusive write lock on one topology node, acquired via
/// [`Topology::lock_topology_node`]. Dropping it releases ownership back to
/// the topology, per `spec.md` §4.A.
pub type TopologyNodeWLock = ArcMutexGuard<RawMutex, TopologyNode>;

/// Directed edges of the topology DAG. `parents` = downstream neighbors,
/// `children` = upstream neighbors, matching the Operator IR's edge naming in
/// `spec.md` §3 so placement code reads the same way across both graphs.
#[derive(Debug, Clone, Default)]
struct Edges {
    parents: Vec<WorkerId>,
    children: Vec<WorkerId>,
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<WorkerId, Arc<Mutex<TopologyNode>>>,
    edges: HashMap<WorkerId, Edges>,
    roots: Vec<WorkerId>,
}

#[derive(Default)]
pub struct Topology {
    inner: RwLock<Inner>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&self, node: TopologyNode) {
        let id = node.id;
        let mut inner = self.inner.write();
        inner.nodes.insert(id, Arc::new(Mutex::new(node)));
        inner.edges.entry(id).or_default();
        inner.roots.push(id);
    }

    /// Adds a directed edge `upstream -> downstream` (data flows from
    /// `upstream` to `downstream`; `downstream` becomes `upstream`'s parent).
    pub fn add_link(&self, upstream: WorkerId, downstream: WorkerId) {
        let mut inner = self.inner.write();
        inner.roots.retain(|id| *id != upstream);
        inner.edges.entry(upstream).or_default().parents.push(downstream);
        inner.edges.entry(downstream).or_default().children.push(upstream);
    }

    /// `findNodeWithId`.
    pub fn find_node_with_id(&self, id: WorkerId) -> Result<TopologyNode, TopologyError> {
        let inner = self.inner.read();
        let node = inner.nodes.get(&id).ok_or(TopologyError::UnknownNode(id))?;
        Ok(node.lock().clone())
    }

    pub fn contains(&self, id: WorkerId) -> bool {
        self.inner.read().nodes.contains_key(&id)
    }

    pub fn parents_of(&self, id: WorkerId) -> Vec<WorkerId> {
        self.inner
            .read()
            .edges
            .get(&id)
            .map(|e| e.parents.clone())
            .unwrap_or_default()
    }

    pub fn children_of(&self, id: WorkerId) -> Vec<WorkerId> {
        self.inner
            .read()
            .edges
            .get(&id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> Vec<WorkerId> {
        self.inner.read().roots.clone()
    }

    pub fn node_ids(&self) -> Vec<WorkerId> {
        self.inner.read().nodes.keys().copied().collect()
    }

    /// Minimum `available_resource_slots` among the given path, used by the
    /// path tie-break rule. Returns `None` if any id is unknown.
    pub fn min_available_slots(&self, path: &[WorkerId]) -> Option<u32> {
        let inner = self.inner.read();
        path.iter()
            .map(|id| inner.nodes.get(id).map(|n| n.lock().available_resource_slots()))
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .min()
    }

    /// `lockTopologyNode(id) -> TopologyNodeWLock | nil`. Non-blocking;
    /// releasing the returned guard (dropping it) transfers ownership back to
    /// the topology.
    pub fn lock_topology_node(&self, id: WorkerId) -> Option<TopologyNodeWLock> {
        let arc = self.inner.read().nodes.get(&id)?.clone();
        arc.try_lock_arc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Capacities;

    fn mk(id: u64) -> TopologyNode {
        TopologyNode::new(WorkerId(id), "127.0.0.1", 4000, 4, Capacities::new(1000, 1000), 0.99)
    }

    #[test]
    fn roots_have_no_parents() {
        let topo = Topology::new();
        topo.add_node(mk(1));
        topo.add_node(mk(2));
        topo.add_link(WorkerId(1), WorkerId(2));
        assert_eq!(topo.roots(), vec![WorkerId(2)]);
        assert_eq!(topo.parents_of(WorkerId(1)), vec![WorkerId(2)]);
        assert_eq!(topo.children_of(WorkerId(2)), vec![WorkerId(1)]);
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let topo = Topology::new();
        topo.add_node(mk(1));
        let lock = topo.lock_topology_node(WorkerId(1)).unwrap();
        assert!(topo.lock_topology_node(WorkerId(1)).is_none());
        drop(lock);
        assert!(topo.lock_topology_node(WorkerId(1)).is_some());
    }

    #[test]
    fn unknown_node_errors() {
        let topo = Topology::new();
        assert!(matches!(
            topo.find_node_with_id(WorkerId(99)),
            Err(TopologyError::UnknownNode(_))
        ));
    }
}
