// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `terraform output -json` for a resource's working directory.

use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputsError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("terraform output returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn outputs_command(workdir: &str) -> String {
    format!("cd {workdir} && terraform output -json")
}

/// Parse `terraform output -json`; blank output means no outputs.
pub fn parse_outputs(stdout: &str) -> Result<BTreeMap<String, Value>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(stdout)
}

pub async fn terraform_outputs(
    ssh: &SshToolbox,
    workdir: &str,
) -> Result<BTreeMap<String, Value>, OutputsError> {
    let output = ssh.run_checked(&outputs_command(workdir)).await?;
    Ok(parse_outputs(&output.stdout)?)
}

#[cfg(test)]
#[path = "outputs_tests.rs"]
mod tests;
