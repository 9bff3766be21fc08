//! core::types
//!
//! Strong types for the advertised ref set.
//!
//! # Types
//!
//! - [`ObjectId`] - Validated git object identifier (SHA-1)
//! - [`Ref`] - A named pointer, either direct or symbolic
//! - [`RefStorage`] - How a ref was discovered on the remote
//!
//! # Validation
//!
//! `ObjectId` enforces validity at construction time; a value that is not
//! exactly forty hex digits cannot be represented.
//!
//! # Examples
//!
//! ```
//! use silt::core::{ObjectId, Ref, RefStorage};
//!
//! let id = ObjectId::new("abcdef0123456789abcdef0123456789abcdef01").unwrap();
//! let main = Ref::direct("refs/heads/main", id, RefStorage::Loose);
//! let head = Ref::symbolic("HEAD", main);
//!
//! assert_eq!(head.name(), "HEAD");
//! assert_eq!(head.object_id(), Some(id));
//! assert!(ObjectId::new("not-a-sha").is_err());
//! ```

use std::fmt;
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}

/// Length of a hex-encoded object id.
pub const OBJECT_ID_HEX_LEN: usize = 40;

/// A validated git object identifier.
///
/// Stored as raw bytes; construction accepts exactly forty hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// Parse a hex-encoded object id.
    pub fn new(s: &str) -> Result<Self, TypeError> {
        if s.len() != OBJECT_ID_HEX_LEN {
            return Err(TypeError::InvalidObjectId(s.to_string()));
        }
        let raw = hex::decode(s).map_err(|_| TypeError::InvalidObjectId(s.to_string()))?;
        let mut id = [0u8; 20];
        id.copy_from_slice(&raw);
        Ok(ObjectId(id))
    }

    /// Check whether `s` is a well-formed object id literal.
    pub fn is_id(s: &str) -> bool {
        Self::new(s).is_ok()
    }

    /// Raw id bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", hex::encode(self.0))
    }
}

impl std::str::FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// How a ref was discovered on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStorage {
    /// The ref does not exist yet; placeholder for a dangling symbolic target.
    New,
    /// Found as an individual blob under `refs/`.
    Loose,
    /// Found inside the bulk `packed-refs` listing.
    Packed,
    /// Present in both forms; the loose value takes precedence.
    LoosePacked,
}

impl fmt::Display for RefStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefStorage::New => write!(f, "new"),
            RefStorage::Loose => write!(f, "loose"),
            RefStorage::Packed => write!(f, "packed"),
            RefStorage::LoosePacked => write!(f, "loose-packed"),
        }
    }
}

/// A named pointer to a version-control object.
///
/// Either direct (carries an object id) or symbolic (points at another ref
/// by name). Values are built fresh per session while advertising refs and
/// owned by the caller; the remote blobs stay authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    /// A ref holding an object id (or none, for a placeholder).
    Direct {
        name: String,
        id: Option<ObjectId>,
        storage: RefStorage,
    },
    /// A ref pointing at another ref.
    Symbolic { name: String, target: Box<Ref> },
}

impl Ref {
    /// Build a direct ref.
    pub fn direct(name: &str, id: ObjectId, storage: RefStorage) -> Self {
        Ref::Direct {
            name: name.to_string(),
            id: Some(id),
            storage,
        }
    }

    /// Build a placeholder for a ref that does not exist yet.
    pub fn unresolved(name: &str) -> Self {
        Ref::Direct {
            name: name.to_string(),
            id: None,
            storage: RefStorage::New,
        }
    }

    /// Build a symbolic ref wrapping its resolved target.
    pub fn symbolic(name: &str, target: Ref) -> Self {
        Ref::Symbolic {
            name: name.to_string(),
            target: Box::new(target),
        }
    }

    /// The ref's own name.
    pub fn name(&self) -> &str {
        match self {
            Ref::Direct { name, .. } | Ref::Symbolic { name, .. } => name,
        }
    }

    /// Whether this ref is a symbolic indirection.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Ref::Symbolic { .. })
    }

    /// The immediate target of a symbolic ref.
    pub fn target(&self) -> Option<&Ref> {
        match self {
            Ref::Symbolic { target, .. } => Some(target),
            Ref::Direct { .. } => None,
        }
    }

    /// The final direct ref at the end of the symbolic chain.
    pub fn leaf(&self) -> &Ref {
        let mut r = self;
        while let Ref::Symbolic { target, .. } = r {
            r = target;
        }
        r
    }

    /// The object id this ref ultimately points at, if resolved.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self.leaf() {
            Ref::Direct { id, .. } => *id,
            Ref::Symbolic { .. } => None,
        }
    }

    /// The storage kind; symbolic refs themselves count as loose.
    pub fn storage(&self) -> RefStorage {
        match self {
            Ref::Direct { storage, .. } => *storage,
            Ref::Symbolic { .. } => RefStorage::Loose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "abcdef0123456789abcdef0123456789abcdef01";

    #[test]
    fn object_id_round_trips() {
        let id = ObjectId::new(ID).unwrap();
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn object_id_accepts_uppercase_hex() {
        let id = ObjectId::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn object_id_rejects_bad_input() {
        assert!(ObjectId::new("").is_err());
        assert!(ObjectId::new("abcdef").is_err());
        assert!(ObjectId::new("zzcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(ObjectId::new("abcdef0123456789abcdef0123456789abcdef012").is_err());
        assert!(!ObjectId::is_id("ref: refs/heads/main"));
    }

    #[test]
    fn symbolic_chain_resolves_to_leaf() {
        let id = ObjectId::new(ID).unwrap();
        let main = Ref::direct("refs/heads/main", id, RefStorage::Loose);
        let head = Ref::symbolic("HEAD", main.clone());

        assert!(head.is_symbolic());
        assert_eq!(head.target(), Some(&main));
        assert_eq!(head.leaf(), &main);
        assert_eq!(head.object_id(), Some(id));
        assert_eq!(head.storage(), RefStorage::Loose);
    }

    #[test]
    fn unresolved_ref_has_no_id() {
        let ghost = Ref::unresolved("refs/heads/ghost");
        assert_eq!(ghost.object_id(), None);
        assert_eq!(ghost.storage(), RefStorage::New);
        assert!(!ghost.is_symbolic());
    }
}
