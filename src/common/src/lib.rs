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

//! Shared vocabulary used by every crate in this workspace: stable integer ids,
//! the typed operator/topology property bag, the top-level error type, and a
//! small retry/backoff helper used by the placement planner.

pub mod error;
pub mod ids;
pub mod property;
pub mod retry;

pub use error::NesError;
pub type NesResult<T> = std::result::Result<T, NesError>;
