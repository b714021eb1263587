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

//! Component A: the topology model and path-finder. A [`graph::Topology`] is
//! the authoritative view of the cluster's workers and their physical links;
//! [`path`] answers path queries over it for the placement planner.

pub mod error;
pub mod graph;
pub mod node;
pub mod path;

pub use error::TopologyError;
pub use graph::{Topology, TopologyNodeWLock};
pub use node::{Capacities, TopologyNode};
pub use path::{find_all_paths_between, find_nodes_between, find_path_between, AllPathsNode, PathDag};
