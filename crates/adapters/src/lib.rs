// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfr-adapters: remote host and external service adapters

pub mod config_source;
pub mod outputs;
pub mod params;
pub mod paths;
pub mod process;
pub mod remote;
pub mod store;
pub mod toolbox;
pub mod upload;

pub use config_source::{ConfigSourceError, ConfigurationSource};
pub use outputs::{terraform_outputs, OutputsError};
pub use params::{
    EnvParameterStore, ParameterError, ParameterStore, StaticParameterStore, TerraformParameters,
};
pub use paths::RemotePaths;
pub use process::{detached_process, DetachedProcess, TerraformCommand};
pub use remote::{CommandOutput, RemoteChannel, RemoteError, SshChannel};
pub use store::{LocalObjectStore, ObjectStore, StoreError};
pub use toolbox::SshToolbox;
pub use upload::{ConfigurationUploader, Upload, UploadError};

#[cfg(any(test, feature = "test-support"))]
pub use remote::{FakeFailure, FakeRemote, RemoteCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryObjectStore;

use tfr_core::HandlerFailure;

impl From<RemoteError> for HandlerFailure {
    fn from(err: RemoteError) -> Self {
        HandlerFailure::unhandled_from(err)
    }
}

impl From<ParameterError> for HandlerFailure {
    fn from(err: ParameterError) -> Self {
        HandlerFailure::unhandled_from(err)
    }
}

impl From<ConfigSourceError> for HandlerFailure {
    fn from(err: ConfigSourceError) -> Self {
        HandlerFailure::unhandled_from(err)
    }
}

impl From<OutputsError> for HandlerFailure {
    fn from(err: OutputsError) -> Self {
        HandlerFailure::unhandled_from(err)
    }
}

impl From<UploadError> for HandlerFailure {
    /// An unsupported content type is the user's to fix; anything else is not.
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnknownContentType(_) => HandlerFailure::handled(err.to_string()),
            other => HandlerFailure::unhandled_from(other),
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
