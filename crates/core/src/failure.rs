// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal failures raised while executing a step.
//!
//! Both variants end the operation. They differ in how they are reported:
//! a handled failure is an expected, user-actionable condition and is shown
//! as-is; an unhandled failure is prefixed with the active step name and its
//! full cause chain goes to the internal log.

use thiserror::Error;

/// Boxed error used as the chained cause of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum HandlerFailure {
    /// Expected condition, e.g. a remote command exited non-zero or the
    /// configuration has an unsupported content type.
    #[error("{message}")]
    Handled {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
    /// Anything else: timeouts, unreachable host, missing parameters, defects.
    #[error("{message}")]
    Unhandled {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl HandlerFailure {
    pub fn handled(message: impl Into<String>) -> Self {
        HandlerFailure::Handled { message: message.into(), cause: None }
    }

    pub fn unhandled(message: impl Into<String>) -> Self {
        HandlerFailure::Unhandled { message: message.into(), cause: None }
    }

    pub fn unhandled_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        HandlerFailure::Unhandled { message: message.into(), cause: Some(cause.into()) }
    }

    /// Wrap an error as an unhandled failure, using its display as the message.
    pub fn unhandled_from<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = err.to_string();
        HandlerFailure::Unhandled { message, cause: Some(Box::new(err)) }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, HandlerFailure::Handled { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            HandlerFailure::Handled { message, .. } | HandlerFailure::Unhandled { message, .. } => {
                message
            }
        }
    }

    /// Display strings of the chained causes, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = std::error::Error::source(self);
        while let Some(err) = next {
            chain.push(err.to_string());
            next = err.source();
        }
        chain
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
