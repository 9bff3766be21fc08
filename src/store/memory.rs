//! store::memory
//!
//! In-memory blob store for deterministic testing.
//!
//! # Design
//!
//! The memory store implements the `BlobStore` trait against a plain map,
//! assigns monotonically increasing versions, records every operation for
//! verification, and allows configuring failure scenarios for error-path
//! tests. It is always consistent, so the `want_version` hint passed to
//! `get` only shows up in the operation log.
//!
//! # Example
//!
//! ```
//! use silt::store::{BlobStore, InMemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//!
//! let version = store.put("bucket", "repo/HEAD", b"ref: refs/heads/main").await.unwrap();
//! assert_eq!(version, "v1");
//!
//! let blob = store.get("bucket", "repo/HEAD", None).await.unwrap();
//! assert_eq!(blob.data, b"ref: refs/heads/main");
//! assert_eq!(blob.version.as_deref(), Some("v1"));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{Blob, BlobStore, BlobWriter, StoreError};

/// In-memory blob store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<Inner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Stored blobs by (bucket, key).
    blobs: HashMap<(String, String), StoredBlob>,
    /// Next version number to assign.
    next_version: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<StoreOp>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    version: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get with the given error.
    Get(StoreError),
    /// Fail put (buffered or streaming) with the given error.
    Put(StoreError),
    /// Fail delete with the given error.
    Delete(StoreError),
    /// Fail list with the given error.
    List(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Get {
        bucket: String,
        key: String,
        want_version: Option<String>,
    },
    Put {
        bucket: String,
        key: String,
        len: usize,
    },
    Delete {
        bucket: String,
        key: String,
    },
    List {
        bucket: String,
        key_prefix: String,
    },
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blob directly, bypassing the operation log.
    ///
    /// Returns the version assigned to the blob. Use this to lay out remote
    /// state before exercising the transport.
    pub fn seed(&self, bucket: &str, key: &str, data: &[u8]) -> String {
        let mut inner = self.lock();
        let version = inner.assign_version();
        inner.blobs.insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                data: data.to_vec(),
                version: version.clone(),
            },
        );
        version
    }

    /// Check whether a blob exists.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.lock()
            .blobs
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Get the current version of a blob, if it exists.
    pub fn version_of(&self, bucket: &str, key: &str) -> Option<String> {
        self.lock()
            .blobs
            .get(&(bucket.to_string(), key.to_string()))
            .map(|b| b.version.clone())
    }

    /// Get a blob's content as UTF-8 text, if it exists.
    pub fn text(&self, bucket: &str, key: &str) -> Option<String> {
        self.lock()
            .blobs
            .get(&(bucket.to_string(), key.to_string()))
            .map(|b| String::from_utf8_lossy(&b.data).into_owned())
    }

    /// Get the recorded operations.
    pub fn operations(&self) -> Vec<StoreOp> {
        self.lock().operations.clone()
    }

    /// Clear the recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Configure an operation to fail.
    pub fn set_fail_on(&self, fail: FailOn) {
        self.lock().fail_on = Some(fail);
    }

    /// Remove any configured failure.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn assign_version(&mut self) -> String {
        self.next_version += 1;
        format!("v{}", self.next_version)
    }
}

#[async_trait]
impl BlobStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(
        &self,
        bucket: &str,
        key: &str,
        want_version: Option<&str>,
    ) -> Result<Blob, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
            want_version: want_version.map(str::to_string),
        });
        if let Some(FailOn::Get(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner
            .blobs
            .get(&(bucket.to_string(), key.to_string()))
            .map(|b| Blob {
                data: b.data.clone(),
                version: Some(b.version.clone()),
            })
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, key)))
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<String, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
            len: data.len(),
        });
        if let Some(FailOn::Put(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        let version = inner.assign_version();
        inner.blobs.insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                data: data.to_vec(),
                version: version.clone(),
            },
        );
        Ok(version)
    }

    async fn begin_put(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn BlobWriter>, StoreError> {
        Ok(Box::new(MemoryBlobWriter {
            store: self.clone(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            buf: Vec::new(),
        }))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if let Some(FailOn::Delete(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner
            .blobs
            .remove(&(bucket.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", bucket, key)))
    }

    async fn list(&self, bucket: &str, key_prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOp::List {
            bucket: bucket.to_string(),
            key_prefix: key_prefix.to_string(),
        });
        if let Some(FailOn::List(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        let needle = format!("{}/", key_prefix.trim_end_matches('/'));
        let mut names: Vec<String> = inner
            .blobs
            .keys()
            .filter(|(b, _)| b == bucket)
            .filter_map(|(_, k)| k.strip_prefix(&needle).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Streaming writer that buffers chunks and stores them on finish.
struct MemoryBlobWriter {
    store: InMemoryStore,
    bucket: String,
    key: String,
    buf: Vec<u8>,
}

#[async_trait]
impl BlobWriter for MemoryBlobWriter {
    async fn write(&mut self, chunk: &[u8]) -> Result<(), StoreError> {
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<String, StoreError> {
        self.store.put(&self.bucket, &self.key, &self.buf).await
    }
}
