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

//! Component C: query placement. The phases run, in order, inside
//! [`amendment::plan`]: path selection, sub-plan computation, network
//! sink/source insertion; [`amendment::commit`] is the only phase that
//! touches the topology's resource slots.

pub mod amendment;
pub mod merge;
pub mod network;
pub mod path_selection;
pub mod subplan;

pub use amendment::{commit, plan, PlacementAmendmentPlan, PlacementRequest};
pub use merge::{try_merging_sink, try_merging_source};
pub use path_selection::{select_path, PathSelection};
pub use subplan::ComputedSubQueryPlans;
