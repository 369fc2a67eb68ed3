// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a resource's Terraform configuration comes from.
//!
//! Inline content wins over a URL, which wins over an `s3://` object path.

use crate::store::{ObjectStore, StoreError};
use std::sync::Arc;
use tfr_core::ResourceModel;
use thiserror::Error;

/// Errors from configuration retrieval
#[derive(Debug, Error)]
pub enum ConfigSourceError {
    #[error("No configuration properties are set")]
    NotSet,
    #[error("Failed to download file at {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid S3 path: {0}")]
    InvalidObjectPath(String),
    #[error("Failed to get S3 file at {path}; check it exists and permissions are set")]
    Object {
        path: String,
        #[source]
        source: StoreError,
    },
    #[error("S3 file at {0} is empty")]
    EmptyObject(String),
}

/// Parsed configuration location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation<'a> {
    Inline(&'a str),
    Url(&'a str),
    Object { bucket: &'a str, key: &'a str },
}

impl<'a> ConfigLocation<'a> {
    pub fn from_model(model: &'a ResourceModel) -> Result<Self, ConfigSourceError> {
        if let Some(content) = model.configuration_content.as_deref() {
            return Ok(ConfigLocation::Inline(content));
        }
        if let Some(url) = model.configuration_url.as_deref() {
            return Ok(ConfigLocation::Url(url));
        }
        if let Some(path) = model.configuration_s3_path.as_deref() {
            let (bucket, key) = parse_object_path(path)
                .ok_or_else(|| ConfigSourceError::InvalidObjectPath(path.to_string()))?;
            return Ok(ConfigLocation::Object { bucket, key });
        }
        Err(ConfigSourceError::NotSet)
    }
}

/// Split `s3://bucket/key` into its parts.
pub fn parse_object_path(path: &str) -> Option<(&str, &str)> {
    let (bucket, key) = path.strip_prefix("s3://")?.split_once('/')?;
    (!bucket.is_empty() && !key.is_empty()).then_some((bucket, key))
}

/// Fetches configuration bytes for a resource model.
#[derive(Clone)]
pub struct ConfigurationSource {
    objects: Arc<dyn ObjectStore>,
    http: reqwest::Client,
}

impl ConfigurationSource {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects, http: reqwest::Client::new() }
    }

    pub async fn fetch(&self, model: &ResourceModel) -> Result<Vec<u8>, ConfigSourceError> {
        match ConfigLocation::from_model(model)? {
            ConfigLocation::Inline(content) => Ok(content.as_bytes().to_vec()),
            ConfigLocation::Url(url) => self.download(url).await,
            ConfigLocation::Object { bucket, key } => {
                let path = format!("s3://{bucket}/{key}");
                tracing::info!(%path, "fetching configuration object");
                let body = self
                    .objects
                    .get(bucket, key)
                    .await
                    .map_err(|source| ConfigSourceError::Object { path: path.clone(), source })?;
                if body.is_empty() {
                    return Err(ConfigSourceError::EmptyObject(path));
                }
                Ok(body)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ConfigSourceError> {
        tracing::info!(%url, "downloading configuration");
        let wrap = |source| ConfigSourceError::Download { url: url.to_string(), source };
        let response = self.http.get(url).send().await.map_err(wrap)?;
        let response = response.error_for_status().map_err(wrap)?;
        let body = response.bytes().await.map_err(wrap)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
#[path = "config_source_tests.rs"]
mod tests;
