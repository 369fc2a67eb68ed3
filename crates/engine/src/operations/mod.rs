// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Create, update and delete as step sequences.

mod create;
mod delete;
mod update;

pub use create::CreateOperation;
pub use delete::DeleteOperation;
pub use update::UpdateOperation;

use crate::deps::EngineDeps;
use crate::worker::invoke;
use tfr_core::{OperationContext, OperationKind, ProgressEvent, ResourceModel};

/// Run one invocation of the operation of the given kind.
pub async fn handle(
    kind: OperationKind,
    deps: &EngineDeps,
    model: ResourceModel,
    context: Option<OperationContext>,
) -> ProgressEvent {
    match kind {
        OperationKind::Create => invoke(&CreateOperation, deps, model, context).await,
        OperationKind::Update => invoke(&UpdateOperation, deps, model, context).await,
        OperationKind::Delete => invoke(&DeleteOperation, deps, model, context).await,
    }
}
