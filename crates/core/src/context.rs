// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation context persisted between invocations.
//!
//! The caller stores this value verbatim and hands it back on the next
//! invocation. Nothing else survives between invocations, so every remote
//! handle has to be reconstructible from these fields plus the resource model.

use crate::backoff;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Detached-process supervision backend on the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessManager {
    /// Transient `systemd --user` units.
    Systemd,
    /// `nohup` background processes tracked by pid and exit files.
    Nohup,
}

crate::simple_display! {
    ProcessManager {
        Systemd => "systemd",
        Nohup => "nohup",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported process manager type: {0}")]
pub struct UnknownProcessManager(pub String);

impl FromStr for ProcessManager {
    type Err = UnknownProcessManager;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "systemd" => Ok(ProcessManager::Systemd),
            "nohup" => Ok(ProcessManager::Nohup),
            other => Err(UnknownProcessManager(other.to_string())),
        }
    }
}

/// Resumable state of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContext {
    /// Current step name; `None` before the first invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Minted once per operation, namespaces the persisted logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_request_id: Option<String>,
    #[serde(default = "not_started")]
    pub last_delay_seconds: i32,
    /// Fixed for the rest of the operation once recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_manager: Option<ProcessManager>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_bucket_name: Option<String>,
}

fn not_started() -> i32 {
    backoff::NOT_STARTED
}

impl Default for OperationContext {
    fn default() -> Self {
        Self {
            step_id: None,
            command_request_id: None,
            last_delay_seconds: backoff::NOT_STARTED,
            process_manager: None,
            log_bucket_name: None,
        }
    }
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True before the first step has been selected.
    pub fn is_fresh(&self) -> bool {
        self.step_id.is_none()
    }

    /// Reset backoff on entry to a new step.
    pub fn reset_backoff(&mut self) {
        self.last_delay_seconds = backoff::NOT_STARTED;
    }

    /// Advance the backoff and return the delay to report to the caller.
    pub fn next_delay(&mut self) -> i32 {
        self.last_delay_seconds = backoff::next_delay(self.last_delay_seconds);
        self.last_delay_seconds
    }

    /// Record the process manager unless one is already recorded, and return
    /// the one in effect for this operation.
    pub fn pin_process_manager(&mut self, candidate: ProcessManager) -> ProcessManager {
        *self.process_manager.get_or_insert(candidate)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
