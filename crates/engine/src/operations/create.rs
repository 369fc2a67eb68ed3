// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::worker::{Operation, Transition, Worker};
use async_trait::async_trait;
use tfr_adapters::TerraformCommand;
use tfr_core::{CreateStep, HandlerFailure, OperationKind};

/// Create: make the workdir, upload, `terraform init`, `terraform apply`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOperation;

#[async_trait]
impl Operation for CreateOperation {
    type Step = CreateStep;

    fn kind(&self) -> OperationKind {
        OperationKind::Create
    }

    /// Mint an identifier when the caller did not supply one.
    fn prepare(&self, worker: &mut Worker<'_>) -> Result<(), HandlerFailure> {
        if worker.model.identifier.is_none() {
            let id = worker.deps().ids.resource_identifier();
            tracing::info!(identifier = %id, "minted resource identifier");
            worker.model.identifier = Some(id);
        }
        Ok(())
    }

    async fn run_step(
        &self,
        step: CreateStep,
        worker: &mut Worker<'_>,
    ) -> Result<Transition<CreateStep>, HandlerFailure> {
        match step {
            CreateStep::SyncMkdir => {
                worker.mkdir_workdir().await?;
                Ok(Transition::Advance(CreateStep::SyncConfig))
            }
            CreateStep::SyncConfig => {
                worker.upload_configuration(true).await?;
                Ok(Transition::Advance(CreateStep::AsyncInit))
            }
            CreateStep::AsyncInit => {
                worker.start(TerraformCommand::Init).await?;
                Ok(Transition::Advance(CreateStep::WaitOnInit))
            }
            CreateStep::WaitOnInit => {
                if worker.still_running(TerraformCommand::Init).await? {
                    return Ok(Transition::Repeat);
                }
                Ok(Transition::Advance(CreateStep::AsyncApply))
            }
            CreateStep::AsyncApply => {
                worker.start(TerraformCommand::Apply).await?;
                Ok(Transition::Advance(CreateStep::WaitThenReturn))
            }
            CreateStep::WaitThenReturn => {
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
#[path = "create_tests.rs"]
mod tests;
