// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background process under `nohup`, tracked with pid and exit files.

use super::{DetachedProcess, ProcessOutput, Stream, TerraformCommand};
use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;
use async_trait::async_trait;

const RUNNING: &str = "running";

pub struct NohupProcess {
    ssh: SshToolbox,
    workdir: String,
    command: TerraformCommand,
    output: ProcessOutput,
}

impl NohupProcess {
    pub fn new(ssh: SshToolbox, workdir: impl Into<String>, command: TerraformCommand) -> Self {
        let workdir = workdir.into();
        let output = ProcessOutput::new(ssh.clone(), workdir.clone(), command);
        Self { ssh, workdir, command, output }
    }

    fn pid_name(&self) -> String {
        format!("tfr-{}.pid", self.command)
    }

    fn exit_name(&self) -> String {
        format!("tfr-{}.exit", self.command)
    }

    pub fn start_command(&self) -> String {
        let mut artifacts = self.output.artifact_names();
        artifacts.push(self.pid_name());
        artifacts.push(self.exit_name());
        let exit = self.exit_name();
        format!(
            "cd {workdir} && rm -f {artifacts} && \
             {{ nohup /bin/sh -c '{tf} > {out} 2> {err}; echo $? > {exit}.tmp && mv {exit}.tmp {exit}' \
             < /dev/null > /dev/null 2>&1 & echo $! > {pid}; }}",
            workdir = self.workdir,
            artifacts = artifacts.join(" "),
            tf = self.command.command_line(),
            out = self.output.log_name(Stream::Stdout),
            err = self.output.log_name(Stream::Stderr),
            pid = self.pid_name(),
        )
    }

    pub fn status_command(&self) -> String {
        format!(
            "cd {workdir} && if [ -f {exit} ]; then echo exited; \
             elif [ -f {pid} ] && kill -0 \"$(cat {pid})\" 2>/dev/null; then echo {RUNNING}; \
             else echo missing; fi",
            workdir = self.workdir,
            exit = self.exit_name(),
            pid = self.pid_name(),
        )
    }

    fn exit_status_command(&self) -> String {
        format!("cat {}/{} 2>/dev/null || true", self.workdir, self.exit_name())
    }

    async fn recorded_status(&self) -> Result<Option<i32>, RemoteError> {
        let output = self.ssh.run_checked(&self.exit_status_command()).await?;
        Ok(output.stdout.trim().parse().ok())
    }
}

#[async_trait]
impl DetachedProcess for NohupProcess {
    fn command(&self) -> TerraformCommand {
        self.command
    }

    async fn start(&self) -> Result<(), RemoteError> {
        tracing::info!(workdir = %self.workdir, command = %self.command, "starting nohup process");
        self.ssh.run_checked(&self.start_command()).await?;
        Ok(())
    }

    async fn is_running(&self) -> Result<bool, RemoteError> {
        let output = self.ssh.run_checked(&self.status_command()).await?;
        let state = output.stdout.trim();
        if state == "missing" {
            tracing::warn!(workdir = %self.workdir, command = %self.command, "process vanished without recording a status");
        }
        Ok(state == RUNNING)
    }

    async fn was_failure(&self) -> Result<bool, RemoteError> {
        Ok(self.recorded_status().await? != Some(0))
    }

    async fn errno(&self) -> Result<i32, RemoteError> {
        Ok(self.recorded_status().await?.unwrap_or(-1))
    }

    async fn error_string(&self) -> Result<String, RemoteError> {
        Ok(match self.recorded_status().await? {
            Some(status) => format!("errno {status}"),
            None => "errno -1 (no exit status recorded)".to_string(),
        })
    }

    async fn incremental_stdout(&self) -> Result<String, RemoteError> {
        self.output.incremental(Stream::Stdout).await
    }

    async fn incremental_stderr(&self) -> Result<String, RemoteError> {
        self.output.incremental(Stream::Stderr).await
    }

    async fn full_stdout(&self) -> Result<String, RemoteError> {
        self.output.full(Stream::Stdout).await
    }

    async fn full_stderr(&self) -> Result<String, RemoteError> {
        self.output.full(Stream::Stderr).await
    }
}

#[cfg(test)]
#[path = "nohup_tests.rs"]
mod tests;
