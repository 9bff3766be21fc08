//! core::manifest
//!
//! Per-repository record of store-assigned blob versions.
//!
//! # Design
//!
//! An eventually consistent store does not promise that a client which just
//! wrote a key will see that write on its next read. The manifest closes
//! that gap: every write or delete during a session updates an in-memory
//! key→version map, every read passes the recorded version back to the
//! store as a precondition hint, and the whole map is persisted next to the
//! repository (`<key_prefix>.manifest`) so later sessions inherit it.
//!
//! The manifest blob itself is the one key that needs strong consistency;
//! everything else only needs eventual consistency once versioned.
//!
//! # Format
//!
//! Flat property-style UTF-8 text, one `key=version` entry per line.
//! `#`/`!` comment lines and blank lines are ignored on read; entry order
//! carries no meaning.
//!
//! # Example
//!
//! ```
//! use silt::core::manifest::VersionManifest;
//!
//! let mut manifest = VersionManifest::new();
//! assert!(!manifest.is_dirty());
//!
//! manifest.track("repo/objects/ab/cd", Some("v2"));
//! assert!(manifest.is_dirty());
//! assert_eq!(manifest.version_of("repo/objects/ab/cd"), Some("v2"));
//!
//! let reloaded = VersionManifest::parse(&manifest.to_text());
//! assert_eq!(reloaded.version_of("repo/objects/ab/cd"), Some("v2"));
//! ```

use std::collections::BTreeMap;

use crate::store::{BlobStore, StoreError};

/// Extension of the manifest blob, appended to the repository key prefix.
pub const MANIFEST_EXT: &str = ".manifest";

/// The last store-assigned version this client wrote or observed, per key.
///
/// Owned exclusively by one transport session with a strict
/// open → use → close lifecycle. The dirty flag starts false, becomes true
/// on the first effective change, and gates whether the manifest is
/// rewritten at close.
#[derive(Debug, Clone, Default)]
pub struct VersionManifest {
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl VersionManifest {
    /// Create an empty, clean manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the manifest blob from the store.
    ///
    /// A missing blob is not an error; the manifest simply starts empty.
    /// Any other store failure is returned to the caller, which must treat
    /// it as fatal to session construction.
    pub async fn load(
        store: &dyn BlobStore,
        bucket: &str,
        manifest_key: &str,
    ) -> Result<Self, StoreError> {
        match store.get(bucket, manifest_key, None).await {
            Ok(blob) => Ok(Self::parse(&String::from_utf8_lossy(&blob.data))),
            Err(err) if err.is_not_found() => Ok(Self::new()),
            Err(err) => Err(err),
        }
    }

    /// Parse property-style text into a clean manifest.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, version) = match line.split_once('=') {
                Some((key, version)) => (key.trim(), version.trim()),
                None => (line, ""),
            };
            if !key.is_empty() {
                entries.insert(key.to_string(), version.to_string());
            }
        }
        Self {
            entries,
            dirty: false,
        }
    }

    /// Serialize every entry as `key=version` lines.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, version) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(version);
            out.push('\n');
        }
        out
    }

    /// Record the version the store assigned to `key`.
    ///
    /// Marks the manifest dirty only when the version for `key` actually
    /// changed; re-tracking the same version is a no-op. A `None` version
    /// (store without version support) leaves the manifest untouched.
    pub fn track(&mut self, key: &str, version: Option<&str>) {
        let Some(version) = version else {
            return;
        };
        if self.entries.get(key).map(String::as_str) != Some(version) {
            self.entries.insert(key.to_string(), version.to_string());
            self.dirty = true;
        }
    }

    /// Forget the version tracked for `key`.
    ///
    /// Marks the manifest dirty only if an entry was actually removed.
    pub fn untrack(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
    }

    /// The version last tracked for `key`, to pass as a read hint.
    pub fn version_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether any entry changed since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the manifest back to the store if anything changed.
    ///
    /// Clears the dirty flag on success so a second flush is a no-op.
    /// Callers own the policy for failures; a session close logs and
    /// swallows them.
    pub async fn flush(
        &mut self,
        store: &dyn BlobStore,
        bucket: &str,
        manifest_key: &str,
    ) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        store
            .put(bucket, manifest_key, self.to_text().as_bytes())
            .await?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_ignores_comments_and_blanks() {
        let manifest = VersionManifest::parse(
            "# comment\n\n! also a comment\nrepo/objects/ab=v3\n  repo/HEAD = v1 \n",
        );
        assert_eq!(manifest.version_of("repo/objects/ab"), Some("v3"));
        assert_eq!(manifest.version_of("repo/HEAD"), Some("v1"));
        assert_eq!(manifest.len(), 2);
        assert!(!manifest.is_dirty());
    }

    #[test]
    fn text_round_trip_preserves_entries() {
        let mut manifest = VersionManifest::new();
        manifest.track("repo/objects/ab/cd", Some("v2"));
        manifest.track("repo/objects/pack/pack-1.pack", Some("v7"));
        manifest.track("repo/HEAD", Some("v1"));
        manifest.untrack("repo/HEAD");

        let reloaded = VersionManifest::parse(&manifest.to_text());
        assert_eq!(reloaded.version_of("repo/objects/ab/cd"), Some("v2"));
        assert_eq!(
            reloaded.version_of("repo/objects/pack/pack-1.pack"),
            Some("v7")
        );
        assert_eq!(reloaded.version_of("repo/HEAD"), None);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn track_same_version_twice_is_a_noop() {
        let mut manifest = VersionManifest::parse("k=v1\n");
        manifest.track("k", Some("v1"));
        assert!(!manifest.is_dirty());

        manifest.track("k", Some("v2"));
        assert!(manifest.is_dirty());
        assert_eq!(manifest.version_of("k"), Some("v2"));
    }

    #[test]
    fn track_without_version_is_ignored() {
        let mut manifest = VersionManifest::new();
        manifest.track("k", None);
        assert!(!manifest.is_dirty());
        assert!(manifest.is_empty());
    }

    #[test]
    fn untrack_missing_key_stays_clean() {
        let mut manifest = VersionManifest::new();
        manifest.untrack("absent");
        assert!(!manifest.is_dirty());

        manifest.track("k", Some("v1"));
        manifest.untrack("k");
        assert!(manifest.is_dirty());
        assert_eq!(manifest.version_of("k"), None);
    }

    #[tokio::test]
    async fn load_missing_manifest_starts_empty() {
        let store = InMemoryStore::new();
        let manifest = VersionManifest::load(&store, "b", "repo.manifest")
            .await
            .unwrap();
        assert!(manifest.is_empty());
        assert!(!manifest.is_dirty());
    }

    #[tokio::test]
    async fn flush_then_load_round_trips() {
        let store = InMemoryStore::new();
        let mut manifest = VersionManifest::new();
        manifest.track("repo/objects/ab/cd1234", Some("v2"));
        manifest.flush(&store, "b", "repo.manifest").await.unwrap();
        assert!(!manifest.is_dirty());

        let reloaded = VersionManifest::load(&store, "b", "repo.manifest")
            .await
            .unwrap();
        assert_eq!(reloaded.version_of("repo/objects/ab/cd1234"), Some("v2"));
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn clean_manifest_does_not_write() {
        let store = InMemoryStore::new();
        let mut manifest = VersionManifest::new();
        manifest.flush(&store, "b", "repo.manifest").await.unwrap();
        assert!(!store.contains("b", "repo.manifest"));
    }
}
