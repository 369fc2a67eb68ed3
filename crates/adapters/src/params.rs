// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection parameters for the Terraform host.
//!
//! Parameters are read from a [`ParameterStore`] each time they are needed,
//! so a rotated key or host takes effect on the next step.

use crate::remote::SshTarget;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tfr_core::ProcessManager;
use thiserror::Error;

/// Environment variable prefix used by [`EnvParameterStore`].
pub const ENV_PREFIX: &str = "CFN_TERRAFORM_";

pub const SSH_HOST: &str = "ssh-host";
pub const SSH_PORT: &str = "ssh-port";
pub const SSH_USERNAME: &str = "ssh-username";
pub const SSH_KEY: &str = "ssh-key";
pub const SSH_FINGERPRINT: &str = "ssh-fingerprint";
pub const PROCESS_MANAGER: &str = "process-manager";

const DEFAULT_SSH_PORT: u16 = 22;

/// Errors from parameter lookup
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Parameter '/cfn/terraform/{0}' must be set in parameter store.")]
    Missing(String),
    #[error("Parameter '/cfn/terraform/{name}' is invalid: '{value}'")]
    Invalid { name: String, value: String },
    #[error("Parameter '/cfn/terraform/{name}' could not be read: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Source of named parameters
#[async_trait]
pub trait ParameterStore: Send + Sync + 'static {
    /// Look up the parameter `name` (e.g. `ssh-host`). `Ok(None)` when unset.
    async fn get(&self, name: &str) -> Result<Option<String>, ParameterError>;
}

/// Reads `ssh-host` from `CFN_TERRAFORM_SSH_HOST`, and so on.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvParameterStore;

impl EnvParameterStore {
    pub fn env_var(name: &str) -> String {
        format!("{ENV_PREFIX}{}", name.to_ascii_uppercase().replace('-', "_"))
    }
}

#[async_trait]
impl ParameterStore for EnvParameterStore {
    async fn get(&self, name: &str) -> Result<Option<String>, ParameterError> {
        match std::env::var(Self::env_var(name)) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ParameterError::Unavailable { name: name.to_string(), reason: e.to_string() }),
        }
    }
}

/// In-memory parameters, for tests and embedding.
#[derive(Clone, Default)]
pub struct StaticParameterStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl StaticParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: impl Into<String>) -> &Self {
        self.values.lock().insert(name.to_string(), value.into());
        self
    }

    pub fn remove(&self, name: &str) -> &Self {
        self.values.lock().remove(name);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticParameterStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { values: Arc::new(Mutex::new(values)) }
    }
}

#[async_trait]
impl ParameterStore for StaticParameterStore {
    async fn get(&self, name: &str) -> Result<Option<String>, ParameterError> {
        Ok(self.values.lock().get(name).cloned())
    }
}

/// Typed view over the Terraform host parameters.
#[derive(Clone)]
pub struct TerraformParameters {
    store: Arc<dyn ParameterStore>,
}

impl TerraformParameters {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    async fn optional(&self, name: &str) -> Result<Option<String>, ParameterError> {
        Ok(self.store.get(name).await?.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    async fn required(&self, name: &str) -> Result<String, ParameterError> {
        self.optional(name).await?.ok_or_else(|| ParameterError::Missing(name.to_string()))
    }

    pub async fn host(&self) -> Result<String, ParameterError> {
        self.required(SSH_HOST).await
    }

    pub async fn port(&self) -> Result<u16, ParameterError> {
        match self.optional(SSH_PORT).await? {
            None => Ok(DEFAULT_SSH_PORT),
            Some(value) => value
                .parse()
                .map_err(|_| ParameterError::Invalid { name: SSH_PORT.to_string(), value }),
        }
    }

    pub async fn username(&self) -> Result<String, ParameterError> {
        self.required(SSH_USERNAME).await
    }

    /// Private key in OpenSSH/PEM form, newline-terminated.
    pub async fn ssh_key(&self) -> Result<String, ParameterError> {
        self.required(SSH_KEY).await.map(|key| format!("{key}\n"))
    }

    pub async fn fingerprint(&self) -> Result<Option<String>, ParameterError> {
        self.optional(SSH_FINGERPRINT).await
    }

    pub async fn process_manager(&self) -> Result<Option<ProcessManager>, ParameterError> {
        match self.optional(PROCESS_MANAGER).await? {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ParameterError::Invalid { name: PROCESS_MANAGER.to_string(), value }),
        }
    }

    /// Resolve everything needed to open one SSH session.
    pub async fn ssh_target(&self) -> Result<SshTarget, ParameterError> {
        Ok(SshTarget {
            host: self.host().await?,
            port: self.port().await?,
            username: self.username().await?,
            private_key: self.ssh_key().await?,
            fingerprint: self.fingerprint().await?,
        })
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
