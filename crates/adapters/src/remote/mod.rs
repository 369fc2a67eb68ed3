// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote command channel to the Terraform host.
//!
//! Every call opens its own authenticated session; nothing is kept between
//! calls, so each step of an operation can run in a fresh process.

mod ssh;

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(test)]
mod local;

pub use ssh::{fingerprint_matches, SshChannel, SshTarget, DEFAULT_COMMAND_TIMEOUT};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFailure, FakeRemote, RemoteCall};

#[cfg(test)]
pub(crate) use local::LocalShell;

use crate::params::ParameterError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Captured result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(exit_status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self { exit_status, stdout: stdout.into(), stderr: stderr.into() }
    }

    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Turn a non-zero exit into [`RemoteError::CommandFailed`].
    pub fn check(self, command: &str) -> Result<Self, RemoteError> {
        if self.success() {
            Ok(self)
        } else {
            Err(RemoteError::CommandFailed {
                command: command.to_string(),
                status: self.exit_status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Errors from the remote channel
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("host key for {host} does not match the configured fingerprint (got {actual})")]
    HostKeyMismatch { host: String, actual: String },
    #[error("authentication failed for {user}@{host}")]
    AuthFailed { user: String, host: String },
    #[error("remote command timed out after {timeout:?}: {command}")]
    Timeout { timeout: Duration, command: String },
    #[error("ssh error: {0}")]
    Ssh(#[from] ssh2::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command `{command}` exited with status {status}: {stderr}")]
    CommandFailed { command: String, status: i32, stderr: String },
    #[error("remote task failed: {0}")]
    Task(String),
}

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout { .. })
    }
}

/// Channel that runs shell commands on, and uploads files to, the remote host.
#[async_trait]
pub trait RemoteChannel: Send + Sync + 'static {
    /// Run `command` through the remote login shell and capture its output.
    ///
    /// A non-zero exit status is not an error here; callers judge the
    /// captured result.
    async fn exec(&self, command: &str) -> Result<CommandOutput, RemoteError>;

    /// Write `contents` to `dir/name` on the remote host.
    async fn upload(&self, dir: &str, name: &str, contents: &[u8]) -> Result<(), RemoteError>;
}
