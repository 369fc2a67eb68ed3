// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell helpers over a [`RemoteChannel`].

use crate::remote::{CommandOutput, RemoteChannel, RemoteError};
use std::sync::Arc;

/// Thin command layer shared by the process backends and upload protocol.
///
/// Helpers return the captured output; whether a non-zero exit is fatal is
/// the caller's decision (see [`CommandOutput::check`]).
#[derive(Clone)]
pub struct SshToolbox {
    channel: Arc<dyn RemoteChannel>,
}

impl SshToolbox {
    pub fn new(channel: Arc<dyn RemoteChannel>) -> Self {
        Self { channel }
    }

    pub async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        let output = self.channel.exec(command).await?;
        if output.success() {
            tracing::debug!(%command, "remote command ok");
        } else {
            tracing::warn!(
                %command,
                status = output.exit_status,
                stderr = %output.stderr.trim(),
                "remote command exited non-zero"
            );
        }
        Ok(output)
    }

    /// Run and require exit status 0.
    pub async fn run_checked(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        self.run(command).await?.check(command)
    }

    pub async fn mkdir(&self, dir: &str) -> Result<CommandOutput, RemoteError> {
        self.run(&format!("mkdir -p {dir}")).await
    }

    pub async fn rmdir(&self, dir: &str) -> Result<CommandOutput, RemoteError> {
        self.run(&format!("rm -rf {dir}")).await
    }

    pub async fn mv(&self, from: &str, to: &str) -> Result<CommandOutput, RemoteError> {
        self.run(&format!("mv {from} {to}")).await
    }

    pub async fn upload_file(
        &self,
        dir: &str,
        name: &str,
        contents: &[u8],
    ) -> Result<(), RemoteError> {
        self.channel.upload(dir, name, contents).await
    }
}

#[cfg(test)]
#[path = "toolbox_tests.rs"]
mod tests;
