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

//! A pipeline's arity, per `spec.md` §4.F "Arity and Operator Handlers": a
//! unary pipeline consumes one input stream; `BinaryLeft`/`BinaryRight` are
//! the two halves of a join pipeline, each scanning one of the join's two
//! input streams into the shared handler.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    BinaryLeft,
    BinaryRight,
}

impl Arity {
    pub fn is_binary(self) -> bool {
        !matches!(self, Arity::Unary)
    }
}
