// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached Terraform processes on the remote host.
//!
//! A process is started once and then observed across many short-lived
//! invocations. All state lives in files in the working directory (and, for
//! systemd, in the transient unit), so any invocation can rebuild a handle
//! from the resource id and command alone.

mod nohup;
mod output;
mod systemd;

pub use nohup::NohupProcess;
pub use output::{ProcessOutput, Stream};
pub use systemd::SystemdProcess;

use crate::paths::RemotePaths;
use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;
use async_trait::async_trait;
use tfr_core::ProcessManager;

/// Terraform subcommands run detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerraformCommand {
    Init,
    Apply,
    Destroy,
}

impl TerraformCommand {
    pub fn name(self) -> &'static str {
        match self {
            TerraformCommand::Init => "init",
            TerraformCommand::Apply => "apply",
            TerraformCommand::Destroy => "destroy",
        }
    }

    /// Full command line. Never prompts and takes the state lock.
    pub fn command_line(self) -> &'static str {
        match self {
            TerraformCommand::Init => "terraform init -lock=true -no-color -input=false",
            TerraformCommand::Apply => {
                "terraform apply -lock=true -no-color -input=false -auto-approve"
            }
            TerraformCommand::Destroy => {
                "terraform destroy -lock=true -no-color -input=false -auto-approve"
            }
        }
    }
}

tfr_core::simple_display! {
    TerraformCommand {
        Init => "init",
        Apply => "apply",
        Destroy => "destroy",
    }
}

/// Handle on a detached Terraform command.
#[async_trait]
pub trait DetachedProcess: Send + Sync {
    fn command(&self) -> TerraformCommand;

    /// Launch in the background and return once it is launched.
    ///
    /// Clears output and status left by an earlier run of the same command.
    async fn start(&self) -> Result<(), RemoteError>;

    /// Whether the process is still running. Reports `false` rather than an
    /// error when the process has already gone away.
    async fn is_running(&self) -> Result<bool, RemoteError>;

    /// Meaningful only once `is_running` has returned `false`.
    async fn was_failure(&self) -> Result<bool, RemoteError>;

    /// Exit status, or -1 when none was recorded.
    async fn errno(&self) -> Result<i32, RemoteError>;

    /// Short human summary of how the process ended, e.g. `errno 1`.
    async fn error_string(&self) -> Result<String, RemoteError>;

    /// Output that has appeared since the previous call (consuming).
    async fn incremental_stdout(&self) -> Result<String, RemoteError>;
    async fn incremental_stderr(&self) -> Result<String, RemoteError>;

    /// Everything written so far (non-consuming).
    async fn full_stdout(&self) -> Result<String, RemoteError>;
    async fn full_stderr(&self) -> Result<String, RemoteError>;
}

/// Build a handle for `command` on `resource_id` under the given manager.
pub fn detached_process(
    manager: ProcessManager,
    ssh: SshToolbox,
    paths: &RemotePaths,
    resource_id: &str,
    command: TerraformCommand,
) -> Box<dyn DetachedProcess> {
    let workdir = paths.workdir(resource_id);
    match manager {
        ProcessManager::Nohup => Box::new(NohupProcess::new(ssh, workdir, command)),
        ProcessManager::Systemd => {
            Box::new(SystemdProcess::new(ssh, workdir, resource_id, command))
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
