// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::worker::{Operation, Transition, Worker};
use async_trait::async_trait;
use tfr_adapters::TerraformCommand;
use tfr_core::{HandlerFailure, OperationKind, UpdateStep};

/// Update: replace the configuration and re-apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOperation;

#[async_trait]
impl Operation for UpdateOperation {
    type Step = UpdateStep;

    fn kind(&self) -> OperationKind {
        OperationKind::Update
    }

    async fn run_step(
        &self,
        step: UpdateStep,
        worker: &mut Worker<'_>,
    ) -> Result<Transition<UpdateStep>, HandlerFailure> {
        match step {
            UpdateStep::SyncConfig => {
                worker.upload_configuration(false).await?;
                Ok(Transition::Advance(UpdateStep::AsyncApply))
            }
            UpdateStep::AsyncApply => {
                worker.start(TerraformCommand::Apply).await?;
                Ok(Transition::Advance(UpdateStep::WaitThenReturn))
            }
            UpdateStep::WaitThenReturn => {
                if worker.still_running(TerraformCommand::Apply).await? {
                    return Ok(Transition::Repeat);
                }
                worker.refresh_outputs().await?;
                Ok(Transition::Succeed)
            }
        }
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
