// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed step sequences for each operation kind.
//!
//! Every operation is a straight line of named steps. The step name is what
//! gets persisted in [`OperationContext::step_id`](crate::OperationContext),
//! so the names are part of the resumable wire format and must not change.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A persisted step name that does not belong to the operation's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid step: {0}")]
pub struct UnknownStep(pub String);

/// An ordered, fixed set of steps.
pub trait StepSequence:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = UnknownStep> + Send + Sync + 'static
{
    /// All steps in execution order.
    const ALL: &'static [Self];

    /// Name persisted in the operation context.
    fn name(&self) -> &'static str;

    /// Step a fresh operation starts at (`None` for an empty sequence).
    fn first() -> Option<Self> {
        Self::ALL.first().copied()
    }

    /// Index of this step in [`StepSequence::ALL`].
    fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// True when `next` comes strictly after `self`.
    fn precedes(&self, next: &Self) -> bool {
        self.position() < next.position()
    }
}

crate::step_sequence! {
    /// Steps of a create operation.
    pub enum CreateStep {
        /// Create the remote workdir.
        SyncMkdir => "CREATE_SYNC_MKDIR",
        /// Upload the configuration for the first time.
        SyncConfig => "CREATE_SYNC_CONFIG",
        /// Start `terraform init`.
        AsyncInit => "CREATE_ASYNC_INIT",
        /// Poll init; once finished move on to apply.
        WaitOnInit => "CREATE_WAIT_ON_INIT",
        /// Start `terraform apply`.
        AsyncApply => "CREATE_ASYNC_APPLY",
        /// Poll apply; once finished collect outputs and succeed.
        WaitThenReturn => "CREATE_WAIT_THEN_RETURN",
    }
}

crate::step_sequence! {
    /// Steps of an update operation.
    pub enum UpdateStep {
        /// Replace the configuration (and variables) in the workdir.
        SyncConfig => "UPDATE_SYNC_CONFIG",
        /// Start `terraform apply`.
        AsyncApply => "UPDATE_ASYNC_APPLY",
        /// Poll apply; once finished collect outputs and succeed.
        WaitThenReturn => "UPDATE_WAIT_THEN_RETURN",
    }
}

crate::step_sequence! {
    /// Steps of a delete operation.
    pub enum DeleteStep {
        /// Start `terraform destroy`.
        Init => "DELETE_INIT",
        /// Poll destroy.
        AsyncDestroy => "DELETE_ASYNC_DESTROY",
        /// Remove the workdir.
        SyncCleanup => "DELETE_SYNC_CLEANUP",
        /// Terminal step.
        Done => "DELETE_DONE",
    }
}

/// Kind of operation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

crate::simple_display! {
    OperationKind {
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(OperationKind::Create),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
