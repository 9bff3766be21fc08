//! remote::errors
//!
//! Transport error taxonomy.
//!
//! # Design
//!
//! Store failures are wrapped with the operation, bucket, and key so a
//! failure can be diagnosed without retrying; the transport itself never
//! retries. "Key absent" is not represented here — operations probing for
//! optional resources return `Option` instead, and only dependent lookups
//! escalate absence into an error.

use thiserror::Error;

use crate::core::keys::KeyError;
use crate::store::StoreError;

/// Errors from transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote URI does not follow the addressing scheme.
    #[error("cannot parse remote uri '{0}'")]
    BadUri(String),

    /// A store operation failed, with the context needed to diagnose it.
    #[error("cannot {op} '{key}' in bucket '{bucket}': {source}")]
    Store {
        /// Operation name (get, put, delete, list)
        op: &'static str,
        /// Bucket the operation ran against
        bucket: String,
        /// Fully resolved store key
        key: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// The version manifest could not be loaded for a reason other than
    /// absence. Fatal: the session must fail to open, since no consistency
    /// guarantee can be given without it.
    #[error("cannot load version manifest '{key}': {source}")]
    ManifestLoad {
        /// Manifest blob key
        key: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A ref blob exists but its content is neither an object id nor a
    /// symbolic indirection.
    #[error("malformed ref '{name}': {content:?}")]
    MalformedRef {
        /// Ref name as requested
        name: String,
        /// Offending first line of the blob
        content: String,
    },

    /// A symbolic ref chain revisited a name already on the resolution path.
    #[error("cyclic symbolic ref chain at '{0}'")]
    CyclicRef(String),

    /// A `packed-refs` line did not parse as `<object id> <ref name>`.
    #[error("bad packed-refs line: {0:?}")]
    BadPackedRefs(String),

    /// A repository-relative path could not be resolved to a store key.
    #[error(transparent)]
    Key(#[from] KeyError),
}

impl TransportError {
    /// Wrap a store failure with its operation context.
    pub(crate) fn store(op: &'static str, bucket: &str, key: &str, source: StoreError) -> Self {
        TransportError::Store {
            op,
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        }
    }

    /// Check if the underlying cause was a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransportError::Store { source, .. } if source.is_not_found()
        )
    }

    /// Check if this failure is specific to one ref rather than the session.
    pub fn is_ref_error(&self) -> bool {
        matches!(
            self,
            TransportError::MalformedRef { .. }
                | TransportError::CyclicRef(_)
                | TransportError::BadPackedRefs(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_carries_context() {
        let err = TransportError::store(
            "get",
            "backups",
            "repo.git/objects/ab/cd",
            StoreError::Network("connection reset".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("get"));
        assert!(msg.contains("backups"));
        assert!(msg.contains("repo.git/objects/ab/cd"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn not_found_classification() {
        let absent = TransportError::store("get", "b", "k", StoreError::NotFound("k".into()));
        assert!(absent.is_not_found());

        let down = TransportError::store("get", "b", "k", StoreError::Network("down".into()));
        assert!(!down.is_not_found());
        assert!(!TransportError::CyclicRef("HEAD".into()).is_not_found());
    }

    #[test]
    fn ref_error_classification() {
        assert!(TransportError::MalformedRef {
            name: "HEAD".into(),
            content: "junk".into()
        }
        .is_ref_error());
        assert!(TransportError::CyclicRef("HEAD".into()).is_ref_error());
        assert!(!TransportError::BadUri("x".into()).is_ref_error());
    }

    #[test]
    fn key_error_converts() {
        let err: TransportError = KeyError::EscapesPrefix {
            prefix: "repo".into(),
            path: "../../x".into(),
        }
        .into();
        assert!(err.to_string().contains("climbs above"));
    }
}
