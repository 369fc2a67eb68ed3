// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators shared by every invocation.

use crate::env;
use std::sync::Arc;
use tfr_adapters::{
    ConfigurationSource, EnvParameterStore, LocalObjectStore, ObjectStore, RemoteChannel,
    RemotePaths, SshChannel, SshToolbox, TerraformParameters,
};
use tfr_core::{IdGen, NanoIdGen};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot determine object store directory; set TFR_STORE_DIR")]
    NoStoreDir,
}

#[derive(Clone)]
pub struct EngineDeps {
    pub remote: Arc<dyn RemoteChannel>,
    pub params: TerraformParameters,
    pub objects: Arc<dyn ObjectStore>,
    pub config: ConfigurationSource,
    pub paths: RemotePaths,
    pub ids: Arc<dyn IdGen>,
}

impl EngineDeps {
    pub fn new(
        remote: Arc<dyn RemoteChannel>,
        params: TerraformParameters,
        objects: Arc<dyn ObjectStore>,
        paths: RemotePaths,
        ids: Arc<dyn IdGen>,
    ) -> Self {
        let config = ConfigurationSource::new(Arc::clone(&objects));
        Self { remote, params, objects, config, paths, ids }
    }

    /// Production wiring: SSH with parameters from the environment, a local
    /// object store, and random ids.
    pub fn from_env() -> Result<Self, SetupError> {
        let params = TerraformParameters::new(Arc::new(EnvParameterStore));
        let remote = SshChannel::new(params.clone()).with_timeout(env::command_timeout());
        let store_dir = env::store_dir().ok_or(SetupError::NoStoreDir)?;
        tracing::debug!(store_dir = %store_dir.display(), "using local object store");
        Ok(Self::new(
            Arc::new(remote),
            params,
            Arc::new(LocalObjectStore::new(store_dir)),
            env::remote_paths(),
            Arc::new(NanoIdGen),
        ))
    }

    pub fn ssh(&self) -> SshToolbox {
        SshToolbox::new(Arc::clone(&self.remote))
    }
}
