// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lowercase alphanumerics: safe in remote file names and systemd unit names.
const ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Length of a command request id.
pub const COMMAND_REQUEST_ID_LEN: usize = 6;

/// Prefix of identifiers minted for resources created without one.
pub const RESOURCE_ID_PREFIX: &str = "TerraformDeployment-";

/// Source of random tokens.
pub trait IdGen: Send + Sync {
    /// A random token of `len` characters from a shell-safe alphabet.
    fn token(&self, len: usize) -> String;

    fn command_request_id(&self) -> String {
        self.token(COMMAND_REQUEST_ID_LEN)
    }

    fn resource_identifier(&self) -> String {
        format!("{RESOURCE_ID_PREFIX}{}", self.token(8))
    }
}

/// Random ids backed by nanoid.
#[derive(Clone, Copy, Debug, Default)]
pub struct NanoIdGen;

impl IdGen for NanoIdGen {
    fn token(&self, len: usize) -> String {
        nanoid::nanoid!(len, &ALPHABET)
    }
}

/// Deterministic ids for tests: `t1`, `t2`, ... padded to the requested length.
#[derive(Clone, Debug, Default)]
pub struct SequentialIdGen {
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGen for SequentialIdGen {
    fn token(&self, len: usize) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let raw = format!("t{n}");
        if raw.len() >= len {
            raw
        } else {
            format!("{raw}{}", "0".repeat(len - raw.len()))
        }
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
