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

//! Used for notifying the status of an in-flight placement amendment: a
//! struct of `Option<oneshot::Sender<_>>` fields, each consumed by `.take()`
//! so a notification can only ever be sent once.

use tokio::sync::oneshot;

use crate::error::ExecutionPlanError;

/// Get notified about the lifecycle of one amendment against the Global
/// Execution Plan: injected into in-memory state, then committed (occupying
/// topology resources) or failed.
#[derive(Debug, Default)]
pub struct AmendmentNotifier {
    /// Fires once the computed sub-plans have been produced (before
    /// `commit()` touches the topology).
    pub injected: Option<oneshot::Sender<()>>,

    /// Fires once the amendment has been applied to the Global Execution
    /// Plan, or failed.
    pub committed: Option<oneshot::Sender<Result<(), ExecutionPlanError>>>,
}

impl AmendmentNotifier {
    pub fn notify_injected(&mut self) {
        if let Some(tx) = self.injected.take() {
            tx.send(()).ok();
        }
    }

    pub fn notify_committed(self) {
        if let Some(tx) = self.committed {
            tx.send(Ok(())).ok();
        }
    }

    pub fn notify_failed(self, err: ExecutionPlanError) {
        if let Some(tx) = self.committed {
            tx.send(Err(err)).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_committed_wakes_the_receiver() {
        let (tx, rx) = oneshot::channel();
        let notifier = AmendmentNotifier {
            injected: None,
            committed: Some(tx),
        };
        notifier.notify_committed();
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn notify_failed_propagates_the_error() {
        let (tx, rx) = oneshot::channel();
        let notifier = AmendmentNotifier {
            injected: None,
            committed: Some(tx),
        };
        notifier.notify_failed(ExecutionPlanError::Corruption("boom".into()));
        assert!(rx.await.unwrap().is_err());
    }
}
