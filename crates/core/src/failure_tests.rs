// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io;

#[test]
fn handled_failure_has_no_cause() {
    let failure = HandlerFailure::handled("Error in apply: errno 1");
    assert!(failure.is_handled());
    assert_eq!(failure.to_string(), "Error in apply: errno 1");
    assert!(failure.cause_chain().is_empty());
}

#[test]
fn unhandled_with_cause_exposes_chain() {
    let inner = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
    let failure = HandlerFailure::unhandled_with("command did not complete", inner);
    assert!(!failure.is_handled());
    assert_eq!(failure.message(), "command did not complete");
    assert_eq!(failure.cause_chain(), vec!["read timed out".to_string()]);
}

#[test]
fn unhandled_from_keeps_error_as_source() {
    let failure =
        HandlerFailure::unhandled_from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
    assert_eq!(failure.message(), "refused");
    assert_eq!(failure.cause_chain(), vec!["refused".to_string()]);
}
