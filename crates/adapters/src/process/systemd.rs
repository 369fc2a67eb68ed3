// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transient systemd user unit per resource and command.
//!
//! The unit is kept after exit (`RemainAfterExit=yes`) so its result and
//! exit status can be read by later invocations.

use super::{DetachedProcess, ProcessOutput, Stream, TerraformCommand};
use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;
use async_trait::async_trait;
use std::collections::HashMap;

pub struct SystemdProcess {
    ssh: SshToolbox,
    workdir: String,
    unit: String,
    command: TerraformCommand,
    output: ProcessOutput,
}

/// Properties read back from `systemctl show`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct UnitProperties(HashMap<String, String>);

impl UnitProperties {
    pub(crate) fn parse(raw: &str) -> Self {
        Self(
            raw.lines()
                .filter_map(|line| line.split_once('='))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect(),
        )
    }

    fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn is_running(&self) -> bool {
        match self.get("ActiveState") {
            "activating" | "deactivating" | "reloading" => true,
            "active" => self.get("SubState") != "exited",
            _ => false,
        }
    }

    pub(crate) fn exit_status(&self) -> Option<i32> {
        self.get("ExecMainStatus").parse().ok()
    }

    pub(crate) fn result(&self) -> &str {
        self.get("Result")
    }

    /// The unit is unknown to the user manager, e.g. after a reboot or GC.
    pub(crate) fn is_not_found(&self) -> bool {
        self.get("LoadState") == "not-found"
    }

    /// The main process has a recorded exit.
    pub(crate) fn has_exited(&self) -> bool {
        !self.is_not_found()
            && self.get("ExecMainExitTimestampMonotonic").parse::<u64>().is_ok_and(|t| t > 0)
    }

    pub(crate) fn was_failure(&self) -> bool {
        !self.has_exited() || self.exit_status() != Some(0) || self.result() != "success"
    }

    pub(crate) fn errno(&self) -> i32 {
        if self.has_exited() {
            self.exit_status().unwrap_or(-1)
        } else {
            -1
        }
    }

    pub(crate) fn error_string(&self) -> String {
        if self.is_not_found() {
            return "errno -1 (unit not found)".to_string();
        }
        if !self.has_exited() {
            return "errno -1 (no exit recorded)".to_string();
        }
        let result = match self.result() {
            "" => "unknown",
            r => r,
        };
        format!("errno {} (result {result})", self.errno())
    }
}

const EXIT_PROPERTIES: &[&str] =
    &["LoadState", "ExecMainExitTimestampMonotonic", "ExecMainStatus", "Result"];

impl SystemdProcess {
    pub fn new(
        ssh: SshToolbox,
        workdir: impl Into<String>,
        resource_id: &str,
        command: TerraformCommand,
    ) -> Self {
        let workdir = workdir.into();
        let output = ProcessOutput::new(ssh.clone(), workdir.clone(), command);
        let unit = unit_name(command, resource_id);
        Self { ssh, workdir, unit, command, output }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn start_command(&self) -> String {
        let unit = &self.unit;
        format!(
            "cd {workdir} && rm -f {artifacts} && {{ \
             systemctl --user stop {unit} >/dev/null 2>&1; \
             systemctl --user reset-failed {unit} >/dev/null 2>&1; \
             systemd-run --user --unit={unit} --working-directory=\"$PWD\" \
             --setenv=PATH=\"$PATH\" -p RemainAfterExit=yes \
             -p StandardOutput=file:\"$PWD/{out}\" -p StandardError=file:\"$PWD/{err}\" \
             /bin/sh -c '{tf}'; }}",
            workdir = self.workdir,
            artifacts = self.output.artifact_names().join(" "),
            out = self.output.log_name(Stream::Stdout),
            err = self.output.log_name(Stream::Stderr),
            tf = self.command.command_line(),
        )
    }

    fn show_command(&self, properties: &[&str]) -> String {
        let props: Vec<String> = properties.iter().map(|p| format!("--property={p}")).collect();
        format!("systemctl --user show {} {}", props.join(" "), self.unit)
    }

    async fn show(&self, properties: &[&str]) -> Result<UnitProperties, RemoteError> {
        let output = self.ssh.run_checked(&self.show_command(properties)).await?;
        Ok(UnitProperties::parse(&output.stdout))
    }

    async fn exit_properties(&self) -> Result<UnitProperties, RemoteError> {
        let props = self.show(EXIT_PROPERTIES).await?;
        if !props.has_exited() {
            tracing::warn!(
                unit = %self.unit,
                load_state = props.get("LoadState"),
                "unit has no recorded exit"
            );
        }
        Ok(props)
    }
}

/// Unit name for a command on a resource.
pub fn unit_name(command: TerraformCommand, resource_id: &str) -> String {
    format!("tfr-{command}-{resource_id}")
}

#[async_trait]
impl DetachedProcess for SystemdProcess {
    fn command(&self) -> TerraformCommand {
        self.command
    }

    async fn start(&self) -> Result<(), RemoteError> {
        tracing::info!(unit = %self.unit, workdir = %self.workdir, "starting systemd unit");
        self.ssh.run_checked(&self.start_command()).await?;
        Ok(())
    }

    async fn is_running(&self) -> Result<bool, RemoteError> {
        Ok(self.show(&["ActiveState", "SubState"]).await?.is_running())
    }

    async fn was_failure(&self) -> Result<bool, RemoteError> {
        Ok(self.exit_properties().await?.was_failure())
    }

    async fn errno(&self) -> Result<i32, RemoteError> {
        Ok(self.exit_properties().await?.errno())
    }

    async fn error_string(&self) -> Result<String, RemoteError> {
        Ok(self.exit_properties().await?.error_string())
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
#[path = "systemd_tests.rs"]
mod tests;
