// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;
use std::time::Duration;
use tfr_adapters::remote::DEFAULT_COMMAND_TIMEOUT;
use tfr_adapters::RemotePaths;

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Remote data root override (`TFR_DATA_ROOT`)
pub fn data_root() -> Option<String> {
    non_empty("TFR_DATA_ROOT")
}

/// Remote scratch root override (`TFR_TMP_ROOT`)
pub fn tmp_root() -> Option<String> {
    non_empty("TFR_TMP_ROOT")
}

/// Remote layout, with defaults for unset roots.
pub fn remote_paths() -> RemotePaths {
    let defaults = RemotePaths::default();
    RemotePaths::new(
        data_root().unwrap_or_else(|| defaults.data_root().to_string()),
        tmp_root().unwrap_or_else(|| defaults.tmp_root().to_string()),
    )
}

/// Per-command ceiling for remote calls (default 30s, `TFR_COMMAND_TIMEOUT_MS`).
pub fn command_timeout() -> Duration {
    std::env::var("TFR_COMMAND_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_COMMAND_TIMEOUT)
}

/// Object store root: TFR_STORE_DIR > <data dir>/tfr/objects
pub fn store_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty("TFR_STORE_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::data_local_dir().map(|d| d.join("tfr").join("objects"))
}

/// Directory for the internal log file, if file logging is wanted (`TFR_LOG_DIR`).
pub fn log_dir() -> Option<PathBuf> {
    non_empty("TFR_LOG_DIR").map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
