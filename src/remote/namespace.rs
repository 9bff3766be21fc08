//! remote::namespace
//!
//! The per-session view of one repository mirror on the blob store.
//!
//! # Design
//!
//! A `RemoteNamespace` is rooted at the repository's object database
//! (`<key_prefix>/objects`) and exposes blob operations addressed by
//! repository-relative paths; refs and `packed-refs` are reached with
//! leading `../` segments the same way alternates entries are. It owns the
//! version manifest for the lifetime of one open → use → close session:
//! every write or delete updates the manifest in memory, every read passes
//! the tracked version back to the store, and close flushes the manifest
//! once if anything changed.
//!
//! Sessions are single-caller. Concurrent pushes from independent sessions
//! to the same remote are unsupported and can silently lose each other's
//! version-tracking updates; nothing locks the manifest key.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use silt::remote::RemoteNamespace;
//! use silt::store::InMemoryStore;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryStore::new());
//! let ns = RemoteNamespace::open_at(store.clone(), "backups", "repo.git")
//!     .await
//!     .unwrap();
//!
//! ns.write_blob("ab/cd1234", b"loose object bytes").await.unwrap();
//! ns.close().await;
//!
//! assert!(store.contains("backups", "repo.git/objects/ab/cd1234"));
//! assert!(store.contains("backups", "repo.git.manifest"));
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error};

use super::errors::TransportError;
use super::packs::{self, PackDescriptor};
use super::refs::RefResolver;
use super::uri::RemoteUri;
use crate::core::keys::resolve_key;
use crate::core::manifest::{VersionManifest, MANIFEST_EXT};
use crate::core::types::Ref;
use crate::store::{Blob, BlobStore, BlobWriter};

/// Directory of the object database under the repository prefix.
const OBJECTS_DIR: &str = "objects";

/// Location of the alternates file, relative to the object database.
const INFO_ALTERNATES: &str = "info/alternates";

/// Upper bound on the close-time manifest write.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// One repository mirror, scoped to a bucket and key prefix.
///
/// Alternates produced by [`alternates`](Self::alternates) share the parent
/// session's manifest; only the session that loaded the manifest should be
/// closed.
pub struct RemoteNamespace {
    store: Arc<dyn BlobStore>,
    bucket: String,
    objects_key: String,
    manifest_key: String,
    manifest: Arc<Mutex<VersionManifest>>,
}

impl std::fmt::Debug for RemoteNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteNamespace")
            .field("bucket", &self.bucket)
            .field("objects_key", &self.objects_key)
            .field("manifest_key", &self.manifest_key)
            .finish_non_exhaustive()
    }
}

impl RemoteNamespace {
    /// Open a session for the repository a URI addresses.
    pub async fn open(
        store: Arc<dyn BlobStore>,
        uri: &RemoteUri,
    ) -> Result<Self, TransportError> {
        Self::open_at(store, uri.bucket(), uri.key_prefix()).await
    }

    /// Open a session for the repository under `key_prefix` in `bucket`.
    ///
    /// Loads the version manifest first; a missing manifest is fine, any
    /// other failure aborts the open.
    pub async fn open_at(
        store: Arc<dyn BlobStore>,
        bucket: &str,
        key_prefix: &str,
    ) -> Result<Self, TransportError> {
        let key_prefix = key_prefix.trim_matches('/');
        let manifest_key = format!("{}{}", key_prefix, MANIFEST_EXT);

        let manifest = VersionManifest::load(store.as_ref(), bucket, &manifest_key)
            .await
            .map_err(|source| TransportError::ManifestLoad {
                key: manifest_key.clone(),
                source,
            })?;
        debug!(
            bucket,
            key_prefix,
            tracked = manifest.len(),
            "opened remote namespace"
        );

        Ok(Self {
            store,
            bucket: bucket.to_string(),
            objects_key: format!("{}/{}", key_prefix, OBJECTS_DIR),
            manifest_key,
            manifest: Arc::new(Mutex::new(manifest)),
        })
    }

    /// Bucket this namespace reads and writes.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store key of the object database root.
    pub fn objects_key(&self) -> &str {
        &self.objects_key
    }

    fn resolve(&self, path: &str) -> Result<String, TransportError> {
        Ok(resolve_key(&self.objects_key, path)?)
    }

    /// Read a blob, or `None` if it does not exist.
    ///
    /// The version last tracked for the key is passed to the store so the
    /// read observes at least this session's own writes.
    pub async fn open_blob(&self, path: &str) -> Result<Option<Blob>, TransportError> {
        let key = self.resolve(path)?;
        let hint = self.manifest.lock().await.version_of(&key).map(str::to_string);
        match self.store.get(&self.bucket, &key, hint.as_deref()).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => Err(TransportError::store("get", &self.bucket, &key, source)),
        }
    }

    /// Read a blob as text, or `None` if it does not exist.
    pub(crate) async fn read_text(&self, path: &str) -> Result<Option<String>, TransportError> {
        Ok(self
            .open_blob(path)
            .await?
            .map(|blob| String::from_utf8_lossy(&blob.data).into_owned()))
    }

    /// Write a blob and track the version the store assigned.
    pub async fn write_blob(&self, path: &str, data: &[u8]) -> Result<(), TransportError> {
        let key = self.resolve(path)?;
        let version = self
            .store
            .put(&self.bucket, &key, data)
            .await
            .map_err(|source| TransportError::store("put", &self.bucket, &key, source))?;
        self.manifest.lock().await.track(&key, Some(&version));
        Ok(())
    }

    /// Begin a streaming write; the version is tracked when the returned
    /// handle is finished.
    pub async fn begin_write(&self, path: &str) -> Result<PendingWrite, TransportError> {
        let key = self.resolve(path)?;
        let writer = self
            .store
            .begin_put(&self.bucket, &key)
            .await
            .map_err(|source| TransportError::store("put", &self.bucket, &key, source))?;
        Ok(PendingWrite {
            writer,
            bucket: self.bucket.clone(),
            key,
            manifest: Arc::clone(&self.manifest),
        })
    }

    /// Delete a blob and drop its tracked version.
    pub async fn delete_blob(&self, path: &str) -> Result<(), TransportError> {
        let key = self.resolve(path)?;
        self.store
            .delete(&self.bucket, &key)
            .await
            .map_err(|source| TransportError::store("delete", &self.bucket, &key, source))?;
        self.manifest.lock().await.untrack(&key);
        Ok(())
    }

    /// List blob names under a repository-relative path.
    pub async fn list(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let key = self.resolve(path)?;
        self.store
            .list(&self.bucket, &key)
            .await
            .map_err(|source| TransportError::store("list", &self.bucket, &key, source))
    }

    /// Discover complete pack files in the object database.
    pub async fn pack_names(&self) -> Result<Vec<PackDescriptor>, TransportError> {
        packs::list_packs(self.store.as_ref(), &self.bucket, &self.objects_key).await
    }

    /// Build the advertised ref set for this session.
    pub async fn advertised_refs(&self) -> Result<BTreeMap<String, Ref>, TransportError> {
        RefResolver::new(self).advertised_refs().await
    }

    /// Open the alternate object databases named in `objects/info/alternates`.
    ///
    /// A missing alternates file means no alternates. Each entry is a
    /// location relative to this object database; the returned namespaces
    /// share this session's manifest and must not be closed separately.
    pub async fn alternates(&self) -> Result<Vec<RemoteNamespace>, TransportError> {
        let Some(text) = self.read_text(INFO_ALTERNATES).await? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            out.push(self.open_alternate(line)?);
        }
        Ok(out)
    }

    /// Open a sibling object database at a location relative to this one.
    pub fn open_alternate(&self, location: &str) -> Result<RemoteNamespace, TransportError> {
        Ok(RemoteNamespace {
            store: Arc::clone(&self.store),
            bucket: self.bucket.clone(),
            objects_key: self.resolve(location)?,
            manifest_key: self.manifest_key.clone(),
            manifest: Arc::clone(&self.manifest),
        })
    }

    /// Close the session, writing the manifest back if anything changed.
    ///
    /// A failed or timed-out manifest write is logged and swallowed;
    /// closing never fails the operation that just completed.
    pub async fn close(self) {
        let mut manifest = self.manifest.lock().await;
        if !manifest.is_dirty() {
            debug!(key = %self.manifest_key, "manifest unchanged, skipping flush");
            return;
        }
        let flush = manifest.flush(self.store.as_ref(), &self.bucket, &self.manifest_key);
        match tokio::time::timeout(FLUSH_TIMEOUT, flush).await {
            Ok(Ok(())) => debug!(key = %self.manifest_key, "flushed version manifest"),
            Ok(Err(err)) => {
                error!(key = %self.manifest_key, error = %err, "failed to write version manifest")
            }
            Err(_) => {
                error!(key = %self.manifest_key, "timed out writing version manifest")
            }
        }
    }
}

/// An in-progress streaming write through a [`RemoteNamespace`].
///
/// Dropping the handle without calling [`finish`](Self::finish) abandons
/// the upload and tracks nothing.
pub struct PendingWrite {
    writer: Box<dyn BlobWriter>,
    bucket: String,
    key: String,
    manifest: Arc<Mutex<VersionManifest>>,
}

impl PendingWrite {
    /// Append a chunk to the upload.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        self.writer
            .write(chunk)
            .await
            .map_err(|source| TransportError::store("put", &self.bucket, &self.key, source))
    }

    /// Complete the upload and track the version the store assigned.
    pub async fn finish(self) -> Result<(), TransportError> {
        let version = self
            .writer
            .finish()
            .await
            .map_err(|source| TransportError::store("put", &self.bucket, &self.key, source))?;
        self.manifest.lock().await.track(&self.key, Some(&version));
        Ok(())
    }
}
