// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfr-core: data model for resumable remote Terraform operations

pub mod macros;

pub mod backoff;
pub mod context;
pub mod failure;
pub mod id;
pub mod model;
pub mod progress;
pub mod steps;

pub use backoff::{next_delay, MAX_CHECK_INTERVAL_SECONDS};
pub use context::{OperationContext, ProcessManager, UnknownProcessManager};
pub use failure::{BoxError, HandlerFailure};
pub use id::{IdGen, NanoIdGen, SequentialIdGen};
pub use model::{is_valid_identifier, ResourceModel};
pub use progress::{OperationStatus, ProgressEvent};
pub use steps::{CreateStep, DeleteStep, OperationKind, StepSequence, UnknownStep, UpdateStep};
