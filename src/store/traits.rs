//! store::traits
//!
//! Blob-store trait definition for the remote side of the transport.
//!
//! # Design
//!
//! The `BlobStore` trait is async because store operations involve network
//! I/O. The transport layer never talks to a concrete service directly; it
//! only sees named blobs behind this trait. Wire concerns (authentication,
//! request signing, payload encryption, retries) belong to the
//! implementation, never to callers.
//!
//! A store is allowed to be eventually consistent. `get` accepts the version
//! a caller last observed for the key so an implementation can use it to
//! serve read-after-write reads; stores with no version support may ignore
//! it and return `version: None`.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from blob-store operations.
///
/// These map to the common failure modes of hosted object stores.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The credentials were rejected or lack permission.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The store returned an error response.
    #[error("store error: {code} - {message}")]
    Backend {
        /// Protocol status code
        code: u16,
        /// Error message from the store
        message: String,
    },
}

impl StoreError {
    /// Check if this error means the key simply does not exist.
    ///
    /// Callers probing for optional resources treat this as "absent",
    /// not as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Check if this error is a transient failure that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }
}

/// A blob returned by [`BlobStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw blob content.
    pub data: Vec<u8>,
    /// Store-assigned version of the content, when the store tracks one.
    pub version: Option<String>,
}

impl Blob {
    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The blob-store abstraction the transport is built on.
///
/// Only five operations are required: GET, PUT (buffered and streaming),
/// DELETE, and LIST. All of them address blobs as `bucket` + `key`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the store name (e.g., "amazon-s3", "memory").
    fn name(&self) -> &'static str;

    /// Fetch a blob.
    ///
    /// `want_version` is the version the caller last wrote or observed for
    /// this key. An eventually consistent store uses it to serve a read that
    /// is at least as new as that write.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the key does not exist
    async fn get(
        &self,
        bucket: &str,
        key: &str,
        want_version: Option<&str>,
    ) -> Result<Blob, StoreError>;

    /// Store a blob, returning the version the store assigned to it.
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<String, StoreError>;

    /// Begin a streaming upload to `key`.
    ///
    /// The blob becomes visible only once [`BlobWriter::finish`] returns;
    /// the returned version covers the full content written.
    async fn begin_put(&self, bucket: &str, key: &str) -> Result<Box<dyn BlobWriter>, StoreError>;

    /// Delete a blob.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// List blob names under `key_prefix`.
    ///
    /// The keyspace is flat; returned names are relative to
    /// `key_prefix + "/"` and may themselves contain `/`.
    async fn list(&self, bucket: &str, key_prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// An in-progress streaming upload created by [`BlobStore::begin_put`].
#[async_trait]
pub trait BlobWriter: Send {
    /// Append a chunk to the upload.
    async fn write(&mut self, chunk: &[u8]) -> Result<(), StoreError>;

    /// Complete the upload and return the store-assigned version.
    async fn finish(self: Box<Self>) -> Result<String, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(StoreError::NotFound("k".into()).is_not_found());
        assert!(!StoreError::Network("down".into()).is_not_found());
        assert!(!StoreError::AccessDenied("nope".into()).is_not_found());
    }

    #[test]
    fn is_transient_classification() {
        assert!(StoreError::Network("reset".into()).is_transient());
        assert!(!StoreError::NotFound("k".into()).is_transient());
        assert!(!StoreError::Backend {
            code: 500,
            message: "oops".into()
        }
        .is_transient());
    }

    #[test]
    fn error_display_formatting() {
        assert_eq!(
            StoreError::NotFound("repo/objects/x".into()).to_string(),
            "not found: repo/objects/x"
        );
        assert_eq!(
            StoreError::Backend {
                code: 403,
                message: "SignatureDoesNotMatch".into()
            }
            .to_string(),
            "store error: 403 - SignatureDoesNotMatch"
        );
    }

    #[test]
    fn blob_len() {
        let blob = Blob {
            data: b"abc".to_vec(),
            version: Some("v1".into()),
        };
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
    }
}
