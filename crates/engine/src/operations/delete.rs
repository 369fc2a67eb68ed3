// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::worker::{Operation, Transition, Worker};
use async_trait::async_trait;
use tfr_adapters::TerraformCommand;
use tfr_core::{DeleteStep, HandlerFailure, OperationKind};

/// Delete: `terraform destroy`, then remove the workdir.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOperation;

#[async_trait]
impl Operation for DeleteOperation {
    type Step = DeleteStep;

    fn kind(&self) -> OperationKind {
        OperationKind::Delete
    }

    async fn run_step(
        &self,
        step: DeleteStep,
        worker: &mut Worker<'_>,
    ) -> Result<Transition<DeleteStep>, HandlerFailure> {
        match step {
            DeleteStep::Init => {
                worker.start(TerraformCommand::Destroy).await?;
                Ok(Transition::Advance(DeleteStep::AsyncDestroy))
            }
            DeleteStep::AsyncDestroy => {
                if worker.still_running(TerraformCommand::Destroy).await? {
                    return Ok(Transition::Repeat);
                }
                Ok(Transition::Advance(DeleteStep::SyncCleanup))
            }
            DeleteStep::SyncCleanup => {
                worker.remove_workdir().await?;
                Ok(Transition::Advance(DeleteStep::Done))
            }
            DeleteStep::Done => Ok(Transition::Succeed),
        }
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
