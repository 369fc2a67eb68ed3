// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Places a configuration and its variables in a resource's working
//! directory.
//!
//! The configuration is staged in a per-resource scratch directory, its type
//! is detected on the remote host, and it is either moved (plain text) or
//! unpacked (zip) into the working directory. The scratch directory is
//! removed whether or not placement succeeds.

use crate::paths::{variables_file_name, RemotePaths};
use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_ZIP: &str = "application/zip";

/// Errors from the upload protocol
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unknown content type {0}")]
    UnknownContentType(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("failed to encode variables: {0}")]
    Variables(#[from] serde_json::Error),
}

/// One configuration upload.
#[derive(Debug, Clone)]
pub struct Upload<'a> {
    pub contents: &'a [u8],
    pub variables: &'a BTreeMap<String, Value>,
    /// First upload for this resource; nothing to replace.
    pub first_time: bool,
    /// File name used in the scratch directory.
    pub file_name: &'a str,
}

/// Upload protocol bound to one resource.
#[derive(Clone)]
pub struct ConfigurationUploader {
    ssh: SshToolbox,
    paths: RemotePaths,
    resource_id: String,
}

impl ConfigurationUploader {
    pub fn new(ssh: SshToolbox, paths: RemotePaths, resource_id: impl Into<String>) -> Self {
        Self { ssh, paths, resource_id: resource_id.into() }
    }

    pub async fn upload(&self, upload: Upload<'_>) -> Result<(), UploadError> {
        let scratch = self.paths.scratch_dir(&self.resource_id);
        let placed = self.place(&scratch, &upload).await;

        let cleanup = self.ssh.rmdir(&scratch).await.and_then(|out| out.check("rm -rf"));
        match (placed, cleanup) {
            (Err(e), Err(cleanup_err)) => {
                tracing::warn!(%scratch, error = %cleanup_err, "failed to remove upload scratch dir");
                Err(e)
            }
            (Err(e), Ok(_)) => Err(e),
            (Ok(()), Err(cleanup_err)) => Err(cleanup_err.into()),
            (Ok(()), Ok(_)) => Ok(()),
        }
    }

    async fn place(&self, scratch: &str, upload: &Upload<'_>) -> Result<(), UploadError> {
        let workdir = self.paths.workdir(&self.resource_id);
        let staged = format!("{scratch}/{}", upload.file_name);

        self.ssh.mkdir(scratch).await?.check("mkdir")?;
        self.ssh.upload_file(scratch, upload.file_name, upload.contents).await?;

        let detect = format!("file --brief --mime-type {staged}");
        let content_type = self.ssh.run_checked(&detect).await?.stdout.trim().to_string();
        tracing::info!(resource_id = %self.resource_id, %content_type, "uploaded configuration");

        match content_type.as_str() {
            MIME_TEXT => {
                let target = self.paths.configuration_file(&self.resource_id);
                self.ssh.mv(&staged, &target).await?.check("mv")?;
            }
            MIME_ZIP => {
                let unzip = format!("unzip -o {staged} -d {workdir}");
                self.ssh.run_checked(&unzip).await?;
            }
            _ => return Err(UploadError::UnknownContentType(content_type)),
        }

        self.place_variables(scratch, upload).await
    }

    async fn place_variables(&self, scratch: &str, upload: &Upload<'_>) -> Result<(), UploadError> {
        let target = self.paths.variables_file(&self.resource_id);
        if upload.variables.is_empty() {
            if !upload.first_time {
                self.ssh.run_checked(&format!("rm -f {target}")).await?;
            }
            return Ok(());
        }

        let name = variables_file_name(&self.resource_id);
        let body = serde_json::to_vec_pretty(upload.variables)?;
        self.ssh.upload_file(scratch, &name, &body).await?;
        self.ssh.mv(&format!("{scratch}/{name}"), &target).await?.check("mv")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
