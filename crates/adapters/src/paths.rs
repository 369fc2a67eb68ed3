// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote filesystem layout.
//!
//! ```text
//! <data_root>/<resource-id>/                    working directory
//! <data_root>/<resource-id>/configuration.tf    text configuration
//! <data_root>/<resource-id>/cfn-<id>.auto.tfvars.json
//! <tmp_root>/<resource-id>/                     upload scratch directory
//! ```
//!
//! Roots are interpolated into shell commands unquoted so that `~` expands
//! on the remote side; they must not contain whitespace.

/// Default data root on the remote host.
pub const DEFAULT_DATA_ROOT: &str = "~/tfdata";

/// Default scratch root on the remote host.
pub const DEFAULT_TMP_ROOT: &str = "/tmp";

/// File a plain-text configuration is stored as.
pub const CONFIGURATION_FILE: &str = "configuration.tf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePaths {
    data_root: String,
    tmp_root: String,
}

impl Default for RemotePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_ROOT, DEFAULT_TMP_ROOT)
    }
}

impl RemotePaths {
    pub fn new(data_root: impl Into<String>, tmp_root: impl Into<String>) -> Self {
        let trim = |s: String| s.trim_end_matches('/').to_string();
        Self { data_root: trim(data_root.into()), tmp_root: trim(tmp_root.into()) }
    }

    pub fn data_root(&self) -> &str {
        &self.data_root
    }

    pub fn tmp_root(&self) -> &str {
        &self.tmp_root
    }

    /// Working directory holding the resource's configuration and state.
    pub fn workdir(&self, resource_id: &str) -> String {
        format!("{}/{resource_id}", self.data_root)
    }

    pub fn scratch_dir(&self, resource_id: &str) -> String {
        format!("{}/{resource_id}", self.tmp_root)
    }

    pub fn configuration_file(&self, resource_id: &str) -> String {
        format!("{}/{CONFIGURATION_FILE}", self.workdir(resource_id))
    }

    pub fn variables_file(&self, resource_id: &str) -> String {
        format!("{}/{}", self.workdir(resource_id), variables_file_name(resource_id))
    }
}

/// Name of the auto-loaded variables file for a resource.
pub fn variables_file_name(resource_id: &str) -> String {
    format!("cfn-{resource_id}.auto.tfvars.json")
}

/// Name of an uploaded configuration in the scratch directory.
pub fn upload_file_name(command_request_id: &str, suffix: &str) -> String {
    format!("terraform-upload-{command_request_id}-{suffix}.file")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
