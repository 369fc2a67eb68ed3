// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result of one invocation, returned to the caller.

use crate::context::OperationContext;
use crate::model::ResourceModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

crate::simple_display! {
    OperationStatus {
        InProgress => "IN_PROGRESS",
        Success => "SUCCESS",
        Failed => "FAILED",
    }
}

/// Progress event: IN_PROGRESS carries the context and delay, terminal
/// statuses drop the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    pub resource_model: ResourceModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<OperationContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_delay_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn in_progress(
        model: ResourceModel,
        context: OperationContext,
        delay_seconds: i32,
        message: Option<String>,
    ) -> Self {
        Self {
            status: OperationStatus::InProgress,
            resource_model: model,
            callback_context: Some(context),
            callback_delay_seconds: Some(delay_seconds),
            message,
        }
    }

    pub fn success(model: ResourceModel) -> Self {
        Self {
            status: OperationStatus::Success,
            resource_model: model,
            callback_context: None,
            callback_delay_seconds: None,
            message: None,
        }
    }

    pub fn failed(model: ResourceModel, message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            resource_model: model,
            callback_context: None,
            callback_delay_seconds: None,
            message: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != OperationStatus::InProgress
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
