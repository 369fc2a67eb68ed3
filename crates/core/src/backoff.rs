// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll delay backoff.
//!
//! Mirrors Terraform's own state polling, which tops out at 10 seconds on
//! long jobs. Sequence from a fresh step: 0, 1, 2, 4, 8, 10, 10, ...

/// Delay value meaning "backoff has not started for this step".
pub const NOT_STARTED: i32 = -1;

/// Upper bound for the poll delay, in seconds.
pub const MAX_CHECK_INTERVAL_SECONDS: i32 = 10;

/// Compute the delay that follows `last`.
pub fn next_delay(last: i32) -> i32 {
    if last < 0 {
        0
    } else if last == 0 {
        1
    } else {
        MAX_CHECK_INTERVAL_SECONDS.min(last.saturating_mul(2))
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
