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

//! Path-finding over the topology DAG: three shapes are implemented here —
//! a BFS-ordered covering DAG (`findPathBetween`), all distinct paths
//! between one pair (`findAllPathBetween`), and the single best path used
//! when stitching network operators between two specific workers
//! (`findNodesBetween`).

use std::collections::{HashMap, HashSet, VecDeque};

use nes_common::ids::WorkerId;

use crate::graph::Topology;

/// Result of [`find_path_between`]: a flat BFS-ordered list of every node
/// visited while reaching some downstream target from some upstream source,
/// plus parent pointers recording, for each visited node, the node that
/// discovered it first.
#[derive(Debug, Clone, Default)]
pub struct PathDag {
    pub bfs_order: Vec<WorkerId>,
    pub parent: HashMap<WorkerId, WorkerId>,
}

impl PathDag {
    pub fn is_empty(&self) -> bool {
        self.bfs_order.is_empty()
    }
}

/// A node of the DAG returned by [`find_all_paths_between`]: the root
/// enumerates every distinct simple path from the upstream set to the
/// downstream set as a tree of alternatives.
#[derive(Debug, Clone)]
pub struct AllPathsNode {
    pub worker: Option<WorkerId>, // `None` only for the synthetic multi-source root
    pub children: Vec<AllPathsNode>,
}

/// `findPathBetween`: covers every (src, dst) pair with at least one path.
/// Returns an empty [`PathDag`] if any upstream/downstream pair is
/// unreachable, per `spec.md` §4.A.
pub fn find_path_between(
    topology: &Topology,
    upstream: &HashSet<WorkerId>,
    downstream: &HashSet<WorkerId>,
) -> PathDag {
    let mut bfs_order = Vec::new();
    let mut parent: HashMap<WorkerId, WorkerId> = HashMap::new();
    let mut visited: HashSet<WorkerId> = HashSet::new();

    for &src in upstream {
        let reached = bfs_from(topology, src, &mut visited, &mut bfs_order, &mut parent);
        if !downstream.iter().any(|d| reached.contains(d)) {
            return PathDag::default();
        }
    }

    // Every downstream target must be reachable from at least one source.
    for &dst in downstream {
        if !visited.contains(&dst) && !upstream.contains(&dst) {
            return PathDag::default();
        }
    }

    PathDag { bfs_order, parent }
}

fn bfs_from(
    topology: &Topology,
    src: WorkerId,
    visited: &mut HashSet<WorkerId>,
    bfs_order: &mut Vec<WorkerId>,
    parent: &mut HashMap<WorkerId, WorkerId>,
) -> HashSet<WorkerId> {
    let mut reached = HashSet::new();
    let mut queue = VecDeque::new();
    if visited.insert(src) {
        bfs_order.push(src);
    }
    queue.push_back(src);
    reached.insert(src);
    while let Some(current) = queue.pop_front() {
        for next in topology.parents_of(current) {
            reached.insert(next);
            if visited.insert(next) {
                bfs_order.push(next);
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    reached
}

/// `findAllPathBetween`: enumerates every distinct simple path from any node
/// in `upstream` to any node in `downstream` as a DAG rooted at a synthetic
/// root (needed because `upstream` may contain more than one source).
pub fn find_all_paths_between(
    topology: &Topology,
    upstream: &HashSet<WorkerId>,
    downstream: &HashSet<WorkerId>,
) -> AllPathsNode {
    let mut children = Vec::new();
    for &src in upstream {
        let mut visiting = vec![src];
        if let Some(subtree) = enumerate_from(topology, src, downstream, &mut visiting) {
            children.push(subtree);
        }
    }
    AllPathsNode {
        worker: None,
        children,
    }
}

fn enumerate_from(
    topology: &Topology,
    current: WorkerId,
    downstream: &HashSet<WorkerId>,
    visiting: &mut Vec<WorkerId>,
) -> Option<AllPathsNode> {
    let mut children = Vec::new();
    for next in topology.parents_of(current) {
        if visiting.contains(&next) {
            continue; // topology is a DAG but guard against malformed input
        }
        visiting.push(next);
        if downstream.contains(&next) {
            children.push(AllPathsNode {
                worker: Some(next),
                children: Vec::new(),
            });
        } else if let Some(subtree) = enumerate_from(topology, next, downstream, visiting) {
            children.push(subtree);
        }
        visiting.pop();
    }
    if children.is_empty() {
        None
    } else {
        Some(AllPathsNode {
            worker: Some(current),
            children,
        })
    }
}

/// Every simple path (as a worker-id sequence including both endpoints) from
/// `src` to `dst`.
fn all_simple_paths(topology: &Topology, src: WorkerId, dst: WorkerId) -> Vec<Vec<WorkerId>> {
    let mut results = Vec::new();
    let mut path = vec![src];
    walk(topology, src, dst, &mut path, &mut results);
    results
}

fn walk(
    topology: &Topology,
    current: WorkerId,
    dst: WorkerId,
    path: &mut Vec<WorkerId>,
    results: &mut Vec<Vec<WorkerId>>,
) {
    if current == dst {
        results.push(path.clone());
        return;
    }
    for next in topology.parents_of(current) {
        if path.contains(&next) {
            continue;
        }
        path.push(next);
        walk(topology, next, dst, path, results);
        path.pop();
    }
}

/// Tie-break rule from `spec.md` §4.A: shortest hop-count first, then highest
/// minimum `available_resource_slots` along the path, then deterministic id
/// order (lexicographic on the path's worker ids).
pub fn select_best_path(topology: &Topology, candidates: Vec<Vec<WorkerId>>) -> Option<Vec<WorkerId>> {
    candidates
        .into_iter()
        .map(|path| {
            let hops = path.len();
            let min_slots = topology.min_available_slots(&path).unwrap_or(0);
            (path, hops, min_slots)
        })
        .min_by(|(a_path, a_hops, a_slots), (b_path, b_hops, b_slots)| {
            a_hops
                .cmp(b_hops)
                .then(b_slots.cmp(a_slots)) // higher min-slots wins -> reverse order
                .then(a_path.cmp(b_path))
        })
        .map(|(path, _, _)| path)
}

/// `findNodesBetween(u, d) -> ordered sequence`: the single best path between
/// one upstream worker and one downstream worker, used to install network
/// operators between co-operating sub-plans.
pub fn find_nodes_between(topology: &Topology, upstream: WorkerId, downstream: WorkerId) -> Vec<WorkerId> {
    let candidates = all_simple_paths(topology, upstream, downstream);
    select_best_path(topology, candidates).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Capacities, TopologyNode};

    fn chain(lengths: &[u64]) -> Topology {
        let topo = Topology::new();
        for &id in lengths {
            topo.add_node(TopologyNode::new(
                WorkerId(id),
                "127.0.0.1",
                4000,
                4,
                Capacities::new(1000, 1000),
                0.99,
            ));
        }
        for w in lengths.windows(2) {
            topo.add_link(WorkerId(w[0]), WorkerId(w[1]));
        }
        topo
    }

    #[test]
    fn find_nodes_between_returns_full_chain() {
        let topo = chain(&[1, 2, 3]);
        let path = find_nodes_between(&topo, WorkerId(1), WorkerId(3));
        assert_eq!(path, vec![WorkerId(1), WorkerId(2), WorkerId(3)]);
    }

    #[test]
    fn unreachable_pair_yields_empty_path_dag() {
        let topo = chain(&[1, 2]);
        topo.add_node(TopologyNode::new(
            WorkerId(3),
            "127.0.0.1",
            4000,
            4,
            Capacities::new(1000, 1000),
            0.99,
        ));
        let upstream: HashSet<_> = [WorkerId(1)].into_iter().collect();
        let downstream: HashSet<_> = [WorkerId(3)].into_iter().collect();
        assert!(find_path_between(&topo, &upstream, &downstream).is_empty());
    }

    #[test]
    fn tie_break_prefers_shorter_hop_then_more_slots() {
        let topo = Topology::new();
        topo.add_node(TopologyNode::new(WorkerId(1), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        topo.add_node(TopologyNode::new(WorkerId(2), "ip", 1, 2, Capacities::new(1, 1), 1.0));
        topo.add_node(TopologyNode::new(WorkerId(3), "ip", 1, 8, Capacities::new(1, 1), 1.0));
        topo.add_node(TopologyNode::new(WorkerId(4), "ip", 1, 4, Capacities::new(1, 1), 1.0));
        // path A: 1 -> 2 -> 4 (2 hops through low-slot node 2)
        // path B: 1 -> 3 -> 4 (2 hops through high-slot node 3)
        topo.add_link(WorkerId(1), WorkerId(2));
        topo.add_link(WorkerId(2), WorkerId(4));
        topo.add_link(WorkerId(1), WorkerId(3));
        topo.add_link(WorkerId(3), WorkerId(4));
        let best = find_nodes_between(&topo, WorkerId(1), WorkerId(4));
        assert_eq!(best, vec![WorkerId(1), WorkerId(3), WorkerId(4)]);
    }
}
