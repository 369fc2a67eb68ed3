// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel that runs commands with the local `sh`, for exercising the
//! remote shell programs end to end.
//!
//! A stub `terraform` is placed first on `PATH`. Output is decoded the same
//! lossy way the SSH channel decodes it.

use super::{CommandOutput, RemoteChannel, RemoteError};
use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) struct LocalShell {
    root: TempDir,
    path: String,
}

impl LocalShell {
    /// Shell whose `terraform` runs `script` regardless of its arguments.
    pub(crate) fn with_terraform(script: &str) -> Result<Self, RemoteError> {
        let root = tempfile::tempdir()?;
        let bin = root.path().join("bin");
        std::fs::create_dir_all(&bin)?;
        std::fs::create_dir_all(root.path().join("work"))?;

        let terraform = bin.join("terraform");
        std::fs::write(&terraform, format!("#!/bin/sh\n{script}\n"))?;
        std::fs::set_permissions(&terraform, std::fs::Permissions::from_mode(0o755))?;

        let inherited = std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string());
        let path = format!("{}:{inherited}", bin.display());
        Ok(Self { root, path })
    }

    /// Absolute working directory for processes under test.
    pub(crate) fn workdir(&self) -> String {
        self.work_path().display().to_string()
    }

    pub(crate) fn work_path(&self) -> PathBuf {
        self.root.path().join("work")
    }
}

#[async_trait]
impl RemoteChannel for LocalShell {
    async fn exec(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("PATH", &self.path)
            .env("HOME", self.root.path())
            .stdin(std::process::Stdio::null())
            .output()
            .await?;
        Ok(CommandOutput {
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn upload(&self, dir: &str, name: &str, contents: &[u8]) -> Result<(), RemoteError> {
        tokio::fs::write(Path::new(dir).join(name), contents).await?;
        Ok(())
    }
}
