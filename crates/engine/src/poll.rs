// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observing a detached process from a polling step.

use crate::user_log::UserLog;
use tfr_adapters::DetachedProcess;
use tfr_core::HandlerFailure;

/// Poll `process` once. Returns `true` while it is still running.
///
/// Liveness is sampled before draining so that output written by a process
/// that exits in between is drained in the same call that observes the exit.
/// Once finished, complete output goes to the user log bucket and a failed
/// exit becomes a handled failure.
pub async fn check_still_running_or_error(
    process: &dyn DetachedProcess,
    log: &UserLog,
) -> Result<bool, HandlerFailure> {
    let command = process.command();
    let running = process.is_running().await?;
    drain_pending_output(process).await?;
    if running {
        return Ok(true);
    }

    let stdout = process.full_stdout().await?;
    let stderr = process.full_stderr().await?;
    log.put(&format!("{command}-stdout.txt"), &stdout).await;
    log.put(&format!("{command}-stderr.txt"), &stderr).await;

    if process.was_failure().await? {
        let message = format!("Error in {command}: {}", process.error_string().await?);
        tracing::warn!(
            %command,
            stderr = %or_empty(&stderr),
            stdout = %or_empty(&stdout),
            "{message}"
        );
        return Err(HandlerFailure::handled(format!("{message}; see logs for more detail.")));
    }

    if !stderr.trim().is_empty() {
        tracing::warn!(%command, %stderr, "command succeeded but wrote to stderr");
    }
    tracing::info!(%command, "command finished");
    Ok(false)
}

async fn drain_pending_output(process: &dyn DetachedProcess) -> Result<(), HandlerFailure> {
    let command = process.command();
    let stdout = process.incremental_stdout().await?;
    if !stdout.is_empty() {
        tracing::info!(%command, "new stdout:\n{stdout}");
    }
    let stderr = process.incremental_stderr().await?;
    if !stderr.is_empty() {
        tracing::info!(%command, "new stderr:\n{stderr}");
    }
    Ok(())
}

fn or_empty(s: &str) -> &str {
    if s.trim().is_empty() {
        "(empty)"
    } else {
        s
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
