// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing log kept in the operation's log bucket.
//!
//! Objects are keyed `<commandRequestId>/<name>`. The main log is
//! `cfn-log.txt`; complete command output is stored beside it. Writes are
//! best effort: failures go to the internal log and never fail a step.

use std::sync::Arc;
use tfr_adapters::ObjectStore;

/// Main user log object name.
pub const MAIN_LOG_FILE: &str = "cfn-log.txt";

#[derive(Clone)]
pub struct UserLog {
    store: Arc<dyn ObjectStore>,
    bucket: Option<String>,
    command_request_id: String,
}

impl UserLog {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: Option<String>,
        command_request_id: impl Into<String>,
    ) -> Self {
        Self { store, bucket, command_request_id: command_request_id.into() }
    }

    /// Object key for `name` within this command's prefix.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{name}", self.command_request_id)
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Append a timestamped line to the main log.
    ///
    /// Format: `2026-01-30T08:14:09Z message`
    pub async fn append(&self, message: &str) {
        let Some(bucket) = self.bucket.as_deref() else {
            return;
        };
        let line = format!("{} {message}\n", format_utc_now());
        let key = self.key(MAIN_LOG_FILE);
        if let Err(e) = self.store.append(bucket, &key, &line).await {
            tracing::warn!(bucket, key = %key, error = %e, "failed to write user log");
        }
    }

    /// Store `content` as the object `name`, replacing any previous one.
    pub async fn put(&self, name: &str, content: &str) {
        let Some(bucket) = self.bucket.as_deref() else {
            return;
        };
        let key = self.key(name);
        match self.store.put(bucket, &key, content.as_bytes().to_vec()).await {
            Ok(()) => tracing::debug!(bucket, key = %key, "uploaded log file"),
            Err(e) => tracing::warn!(bucket, key = %key, error = %e, "failed to upload log file"),
        }
    }
}

fn format_utc_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
#[path = "user_log_tests.rs"]
mod tests;
