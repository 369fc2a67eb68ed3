// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfr-engine: resumable step engine for terraform deployments

pub mod deps;
pub mod env;
pub mod operations;
mod poll;
pub mod user_log;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use deps::{EngineDeps, SetupError};
pub use operations::{handle, CreateOperation, DeleteOperation, UpdateOperation};
pub use user_log::UserLog;
pub use worker::{invoke, Operation, Transition, Worker};
