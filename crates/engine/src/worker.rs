// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step engine.
//!
//! Each invocation executes exactly one step of an operation and returns a
//! [`ProgressEvent`]. Everything needed to resume is carried in the
//! [`OperationContext`] the caller hands back on the next invocation: the
//! engine itself never sleeps and keeps no state between invocations.

use crate::deps::EngineDeps;
use crate::poll;
use crate::user_log::UserLog;
use async_trait::async_trait;
use tfr_adapters::paths::upload_file_name;
use tfr_adapters::{
    detached_process, terraform_outputs, ConfigurationUploader, DetachedProcess, SshToolbox,
    TerraformCommand, Upload,
};
use tfr_core::{
    is_valid_identifier, HandlerFailure, OperationContext, OperationKind, ProcessManager,
    ProgressEvent, ResourceModel, StepSequence,
};

/// Length of the random part of an uploaded configuration's file name.
const UPLOAD_SUFFIX_LEN: usize = 4;

/// What the engine does after a step body returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Move to a later step and ask to be called back immediately.
    Advance(S),
    /// Stay on the current step and back off.
    Repeat,
    /// Operation complete.
    Succeed,
}

/// One kind of operation: a fixed step sequence plus the body of each step.
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    type Step: StepSequence;

    fn kind(&self) -> OperationKind;

    /// Runs once, on the first invocation, before the first step is selected.
    fn prepare(&self, _worker: &mut Worker<'_>) -> Result<(), HandlerFailure> {
        Ok(())
    }

    async fn run_step(
        &self,
        step: Self::Step,
        worker: &mut Worker<'_>,
    ) -> Result<Transition<Self::Step>, HandlerFailure>;
}

/// State of a single invocation.
pub struct Worker<'a> {
    deps: &'a EngineDeps,
    pub model: ResourceModel,
    pub context: OperationContext,
}

/// Run one invocation of `operation`.
pub async fn invoke<O: Operation>(
    operation: &O,
    deps: &EngineDeps,
    model: ResourceModel,
    context: Option<OperationContext>,
) -> ProgressEvent {
    let kind = operation.kind();
    let mut worker = Worker { deps, model, context: context.unwrap_or_default() };
    tracing::info!(
        operation = %kind,
        model = ?worker.model,
        context = ?worker.context,
        "invocation starting"
    );

    let mut active: Option<O::Step> = None;
    let event = match worker.execute(operation, &mut active).await {
        Ok(event) => event,
        Err(failure) => worker.fail(failure, active.map(|s| s.name())).await,
    };

    tracing::info!(
        operation = %kind,
        status = %event.status,
        context = ?event.callback_context,
        message = ?event.message,
        "invocation exiting"
    );
    event
}

impl<'a> Worker<'a> {
    async fn execute<O: Operation>(
        &mut self,
        operation: &O,
        active: &mut Option<O::Step>,
    ) -> Result<ProgressEvent, HandlerFailure> {
        self.reconcile_log_bucket();

        let step = if self.context.is_fresh() {
            operation.prepare(self)?;
            self.begin::<O::Step>(operation.kind()).await?
        } else {
            self.resume::<O::Step>()?
        };
        *active = Some(step);
        self.resource_id()?;

        match operation.run_step(step, self).await? {
            Transition::Advance(next) => {
                if !step.precedes(&next) {
                    return Err(HandlerFailure::unhandled(format!(
                        "cannot move from step {step} back to {next}"
                    )));
                }
                tracing::info!(step = %next, "Entering step");
                self.context.step_id = Some(next.name().to_string());
                self.context.reset_backoff();
                Ok(self.in_progress(next))
            }
            Transition::Repeat => Ok(self.in_progress(step)),
            Transition::Succeed => {
                let id = self.model.identifier.clone().unwrap_or_default();
                self.user_log().append(&format!("SUCCESS: {id}")).await;
                Ok(ProgressEvent::success(self.model.clone()))
            }
        }
    }

    /// First invocation: pick the first step and identify the command.
    async fn begin<S: StepSequence>(&mut self, kind: OperationKind) -> Result<S, HandlerFailure> {
        let first = S::first().ok_or_else(|| HandlerFailure::unhandled("operation has no steps"))?;
        let command_request_id = match &self.context.command_request_id {
            Some(id) => id.clone(),
            None => {
                let id = self.deps.ids.command_request_id();
                self.context.command_request_id = Some(id.clone());
                id
            }
        };
        self.context.step_id = Some(first.name().to_string());
        self.context.reset_backoff();

        let resource = self.model.identifier.clone().unwrap_or_default();
        tracing::info!(
            %command_request_id,
            %resource,
            operation = %kind,
            "using command request id to identify this command across all steps"
        );
        self.user_log()
            .append(&format!(
                "Beginning command requested {kind} on {resource}, command {command_request_id}"
            ))
            .await;
        Ok(first)
    }

    fn resume<S: StepSequence>(&self) -> Result<S, HandlerFailure> {
        let name = self.context.step_id.as_deref().unwrap_or_default();
        name.parse::<S>().map_err(HandlerFailure::unhandled_from)
    }

    /// Keep the log bucket in both the model and the context.
    fn reconcile_log_bucket(&mut self) {
        if self.context.log_bucket_name.is_none() {
            self.context.log_bucket_name = self.model.log_bucket_name();
        } else if self.model.log_bucket_url.is_none() {
            let name = self.context.log_bucket_name.clone();
            self.model.set_log_bucket_name(name.as_deref());
        }
    }

    fn in_progress<S: StepSequence>(&mut self, step: S) -> ProgressEvent {
        let delay = self.context.next_delay();
        ProgressEvent::in_progress(
            self.model.clone(),
            self.context.clone(),
            delay,
            Some(format!("Step: {step}")),
        )
    }

    async fn fail(&self, failure: HandlerFailure, step: Option<&str>) -> ProgressEvent {
        let log = self.user_log();
        if failure.is_handled() {
            let message = failure.message().to_string();
            tracing::warn!(step = ?step, %message, "operation failed");
            log.append(&format!("FAILING: {message}")).await;
            return ProgressEvent::failed(self.model.clone(), message);
        }

        let message = match step {
            Some(step) => format!("{step}: {}", failure.message()),
            None => failure.message().to_string(),
        };
        let causes = failure.cause_chain();
        tracing::error!(step = ?step, %message, causes = ?causes, "operation failed unexpectedly");
        let mut entry = format!("FAILING: {message}");
        for cause in &causes {
            entry.push_str("\n  caused by: ");
            entry.push_str(cause);
        }
        log.append(&entry).await;
        ProgressEvent::failed(self.model.clone(), message)
    }

    // --- helpers for step bodies ---

    pub fn deps(&self) -> &EngineDeps {
        self.deps
    }

    pub fn ssh(&self) -> SshToolbox {
        self.deps.ssh()
    }

    pub fn user_log(&self) -> UserLog {
        UserLog::new(
            self.deps.objects.clone(),
            self.context.log_bucket_name.clone(),
            self.context.command_request_id.clone().unwrap_or_default(),
        )
    }

    /// The resource identifier, which must be present and path-safe.
    pub fn resource_id(&self) -> Result<&str, HandlerFailure> {
        let id = self
            .model
            .identifier
            .as_deref()
            .ok_or_else(|| HandlerFailure::unhandled("resource model has no identifier"))?;
        if !is_valid_identifier(id) {
            return Err(HandlerFailure::unhandled(format!("invalid resource identifier: {id}")));
        }
        Ok(id)
    }

    pub fn workdir(&self) -> Result<String, HandlerFailure> {
        Ok(self.deps.paths.workdir(self.resource_id()?))
    }

    pub async fn mkdir_workdir(&self) -> Result<(), HandlerFailure> {
        let workdir = self.workdir()?;
        self.ssh().mkdir(&workdir).await?.check("mkdir")?;
        Ok(())
    }

    pub async fn remove_workdir(&self) -> Result<(), HandlerFailure> {
        let workdir = self.workdir()?;
        self.ssh().rmdir(&workdir).await?.check("rm -rf")?;
        Ok(())
    }

    /// Fetch the configuration and place it in the working directory.
    pub async fn upload_configuration(&self, first_time: bool) -> Result<(), HandlerFailure> {
        let resource_id = self.resource_id()?;
        let contents = self.deps.config.fetch(&self.model).await?;
        let variables = self.model.variables_or_empty();
        let command_request_id = self.context.command_request_id.as_deref().unwrap_or_default();
        let file_name =
            upload_file_name(command_request_id, &self.deps.ids.token(UPLOAD_SUFFIX_LEN));

        let uploader =
            ConfigurationUploader::new(self.ssh(), self.deps.paths.clone(), resource_id);
        let upload =
            Upload { contents: &contents, variables: &variables, first_time, file_name: &file_name };
        uploader.upload(upload).await?;
        Ok(())
    }

    /// Process manager for this operation, recorded in the context on first use.
    pub async fn process_manager(&mut self) -> Result<ProcessManager, HandlerFailure> {
        if let Some(manager) = self.context.process_manager {
            return Ok(manager);
        }
        let candidate = self.deps.params.process_manager().await?.unwrap_or(ProcessManager::Nohup);
        Ok(self.context.pin_process_manager(candidate))
    }

    pub async fn process(
        &mut self,
        command: TerraformCommand,
    ) -> Result<Box<dyn DetachedProcess>, HandlerFailure> {
        let manager = self.process_manager().await?;
        let resource_id = self.resource_id()?;
        Ok(detached_process(manager, self.ssh(), &self.deps.paths, resource_id, command))
    }

    /// Start `command` detached.
    pub async fn start(&mut self, command: TerraformCommand) -> Result<(), HandlerFailure> {
        let process = self.process(command).await?;
        process.start().await?;
        Ok(())
    }

    /// Poll `command`; `true` while it is still running.
    pub async fn still_running(&mut self, command: TerraformCommand) -> Result<bool, HandlerFailure> {
        let process = self.process(command).await?;
        poll::check_still_running_or_error(process.as_ref(), &self.user_log()).await
    }

    /// Record `terraform output -json` on the model.
    pub async fn refresh_outputs(&mut self) -> Result<(), HandlerFailure> {
        let outputs = terraform_outputs(&self.ssh(), &self.workdir()?).await?;
        tracing::info!(count = outputs.len(), "captured terraform outputs");
        self.model.outputs = Some(outputs);
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
