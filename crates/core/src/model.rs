// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired state of one Terraform deployment, as supplied by the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Console URL prefix used when restoring a log bucket URL from its name.
pub const LOG_BUCKET_URL_PREFIX: &str = "https://s3.console.aws.amazon.com/s3/buckets/";

/// Resource model round-tripped through the caller on every invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceModel {
    /// Stable identifier shared by every operation against this deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_url: Option<String>,
    /// `s3://bucket/key` style object path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_s3_path: Option<String>,
    /// Terraform input variables, written as an auto-loaded tfvars file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_bucket_url: Option<String>,
    /// Terraform outputs captured after the last successful apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, Value>>,
}

impl ResourceModel {
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self { identifier: Some(identifier.into()), ..Self::default() }
    }

    /// Variables to upload, or an empty map when none were supplied.
    pub fn variables_or_empty(&self) -> BTreeMap<String, Value> {
        self.variables.clone().unwrap_or_default()
    }

    /// Bucket name derived from the log bucket URL (its last path segment).
    pub fn log_bucket_name(&self) -> Option<String> {
        let url = self.log_bucket_url.as_deref()?;
        let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Restore the log bucket URL from a bucket name remembered in the context.
    pub fn set_log_bucket_name(&mut self, name: Option<&str>) {
        self.log_bucket_url = name.map(|n| format!("{LOG_BUCKET_URL_PREFIX}{n}"));
    }
}

/// Whether `id` is safe to embed unquoted in remote paths and unit names.
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
