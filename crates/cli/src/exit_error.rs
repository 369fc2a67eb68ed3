// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;
use tfr_core::OperationStatus;

/// Exit code for an operation that reported FAILED.
pub const EXIT_OPERATION_FAILED: i32 = 1;
/// Exit code for errors outside the operation (bad input, setup).
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Non-zero exit for a terminal failure; `None` otherwise.
    ///
    /// The event itself is already on stdout, so the message stays empty.
    pub fn for_status(status: OperationStatus) -> Option<Self> {
        match status {
            OperationStatus::Failed => Some(Self::new(EXIT_OPERATION_FAILED, "")),
            OperationStatus::InProgress | OperationStatus::Success => None,
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
