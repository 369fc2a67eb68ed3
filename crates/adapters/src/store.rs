// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bucket/key object storage.
//!
//! Used to fetch `s3://` configurations and to persist complete command
//! logs next to the user log.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors from object storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("invalid object location {bucket}/{key}")]
    InvalidKey { bucket: String, key: String },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    /// Append `text` to an object, creating it if absent.
    async fn append(&self, bucket: &str, key: &str, text: &str) -> Result<(), StoreError> {
        let mut body = match self.get(bucket, key).await {
            Ok(body) => body,
            Err(StoreError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        body.extend_from_slice(text.as_bytes());
        self.put(bucket, key, body).await
    }
}

/// Objects as files under `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = || StoreError::InvalidKey { bucket: bucket.to_string(), key: key.to_string() };
        let relative = Path::new(bucket).join(key);
        let normal = !bucket.is_empty()
            && !key.is_empty()
            && !bucket.contains('/')
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if normal {
            Ok(self.root.join(relative))
        } else {
            Err(invalid())
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }
        tokio::fs::write(&path, body).await.map_err(|source| StoreError::Io { path, source })
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod memory {
    use super::{ObjectStore, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct MemoryState {
        objects: BTreeMap<(String, String), Vec<u8>>,
        fail_writes: bool,
    }

    /// In-memory object store for tests
    #[derive(Clone)]
    pub struct MemoryObjectStore {
        inner: Arc<Mutex<MemoryState>>,
    }

    impl Default for MemoryObjectStore {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(MemoryState {
                    objects: BTreeMap::new(),
                    fail_writes: false,
                })),
            }
        }
    }

    impl MemoryObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
            self.inner.lock().objects.insert((bucket.to_string(), key.to_string()), body.into());
        }

        /// Object body as UTF-8, if present.
        pub fn text(&self, bucket: &str, key: &str) -> Option<String> {
            self.inner
                .lock()
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .map(|b| String::from_utf8_lossy(b).into_owned())
        }

        /// Keys stored in `bucket`, sorted
        pub fn keys(&self, bucket: &str) -> Vec<String> {
            self.inner
                .lock()
                .objects
                .keys()
                .filter(|(b, _)| b == bucket)
                .map(|(_, k)| k.clone())
                .collect()
        }

        /// Make every subsequent `put` fail.
        pub fn fail_writes(&self) {
            self.inner.lock().fail_writes = true;
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryObjectStore {
        async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
            self.inner
                .lock()
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
        }

        async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
            let mut state = self.inner.lock();
            if state.fail_writes {
                return Err(StoreError::Io {
                    path: format!("{bucket}/{key}").into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            state.objects.insert((bucket.to_string(), key.to_string()), body);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryObjectStore;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
