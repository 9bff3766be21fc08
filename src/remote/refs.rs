//! remote::refs
//!
//! Building the advertised ref set from remote blobs.
//!
//! # Design
//!
//! The remote stores refs the way a local repository does: small text blobs
//! under `refs/`, a `HEAD` blob, and an optional bulk `packed-refs`
//! listing. Advertising runs in three passes over one accumulator:
//!
//! 1. ingest `packed-refs`, pre-populating the accumulator with `Packed`
//!    entries;
//! 2. resolve every name listed under `refs/` — a loose blob for a name
//!    already seen packed classifies as `LoosePacked`, loose value winning;
//! 3. resolve `HEAD`.
//!
//! Symbolic chains (`ref: <target>`) are followed through the accumulator
//! so shared targets are read once. A chain that revisits a name on its own
//! path fails with [`TransportError::CyclicRef`] instead of looping. A
//! symbolic ref whose target does not exist still advertises: the target is
//! synthesized as an unresolved placeholder.

use std::collections::BTreeMap;

use super::errors::TransportError;
use super::namespace::RemoteNamespace;
use crate::core::keys::PARENT_DIR;
use crate::core::types::{ObjectId, Ref, RefStorage};

/// Name of the well-known head ref.
pub const HEAD: &str = "HEAD";

/// Repository file holding the bulk ref listing.
const PACKED_REFS: &str = "packed-refs";

/// Directory loose refs live under.
const REFS_DIR: &str = "refs";

/// Marker prefix of a symbolic ref blob.
const SYMREF_PREFIX: &str = "ref: ";

/// Accumulating resolver for one advertisement pass.
pub(crate) struct RefResolver<'a> {
    db: &'a RemoteNamespace,
    refs: BTreeMap<String, Ref>,
}

impl<'a> RefResolver<'a> {
    pub(crate) fn new(db: &'a RemoteNamespace) -> Self {
        Self {
            db,
            refs: BTreeMap::new(),
        }
    }

    /// Run the three advertisement passes and return the final ref set.
    pub(crate) async fn advertised_refs(
        mut self,
    ) -> Result<BTreeMap<String, Ref>, TransportError> {
        self.ingest_packed_refs().await?;
        self.read_loose_refs().await?;
        self.resolve(HEAD).await?;
        Ok(self.refs)
    }

    /// Pre-populate the accumulator from the `packed-refs` blob, if any.
    async fn ingest_packed_refs(&mut self) -> Result<(), TransportError> {
        let path = format!("{}{}", PARENT_DIR, PACKED_REFS);
        let Some(text) = self.db.read_text(&path).await? else {
            return Ok(());
        };
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Peel lines annotate the entry above them; object ids of
            // peeled tags are not part of the advertised set here.
            if line.starts_with('^') {
                continue;
            }
            let parsed = line
                .split_once(' ')
                .and_then(|(id, name)| ObjectId::new(id).ok().map(|id| (id, name)));
            let Some((id, name)) = parsed else {
                return Err(TransportError::BadPackedRefs(line.to_string()));
            };
            self.refs
                .insert(name.to_string(), Ref::direct(name, id, RefStorage::Packed));
        }
        Ok(())
    }

    /// Resolve every ref listed under `refs/`.
    async fn read_loose_refs(&mut self) -> Result<(), TransportError> {
        let names = self
            .db
            .list(&format!("{}{}", PARENT_DIR, REFS_DIR))
            .await?;
        for name in names {
            self.resolve(&format!("{}/{}", REFS_DIR, name)).await?;
        }
        Ok(())
    }

    /// Resolve one ref name to a concrete [`Ref`].
    ///
    /// Returns `None` when the ref does not exist. The requested name is
    /// always re-read from the store so a loose blob can override a packed
    /// entry; only symbolic targets reuse the accumulator.
    pub(crate) async fn resolve(&mut self, name: &str) -> Result<Option<Ref>, TransportError> {
        // Symbolic indirection is followed iteratively: `chain` holds the
        // names still waiting for their target, innermost last.
        let mut chain: Vec<String> = Vec::new();
        let mut current = name.to_string();

        let mut resolved = loop {
            if !chain.is_empty() {
                if let Some(known) = self.refs.get(&current) {
                    break known.clone();
                }
                if chain.iter().any(|n| n == &current) {
                    return Err(TransportError::CyclicRef(current));
                }
            }

            let line = match self.read_ref_line(&current).await? {
                Some(line) => line,
                None if chain.is_empty() => return Ok(None),
                // Dangling symbolic target: advertise a placeholder so the
                // symbolic ref still has something to point at.
                None => break Ref::unresolved(&current),
            };

            if line.is_empty() {
                return Err(TransportError::MalformedRef {
                    name: current,
                    content: line,
                });
            }

            if let Some(target) = line.strip_prefix(SYMREF_PREFIX) {
                let target = target.to_string();
                chain.push(current);
                current = target;
                continue;
            }

            match ObjectId::new(&line) {
                Ok(id) => {
                    let storage = match self.refs.get(&current) {
                        Some(prior) if prior.storage() == RefStorage::Packed => {
                            RefStorage::LoosePacked
                        }
                        _ => RefStorage::Loose,
                    };
                    let direct = Ref::direct(&current, id, storage);
                    self.refs.insert(current.clone(), direct.clone());
                    break direct;
                }
                Err(_) => {
                    return Err(TransportError::MalformedRef {
                        name: current,
                        content: line,
                    })
                }
            }
        };

        while let Some(sym_name) = chain.pop() {
            resolved = Ref::symbolic(&sym_name, resolved);
            self.refs.insert(sym_name, resolved.clone());
        }
        Ok(Some(resolved))
    }

    /// Read the first line of a ref blob, or `None` if the blob is absent.
    async fn read_ref_line(&self, name: &str) -> Result<Option<String>, TransportError> {
        let path = format!("{}{}", PARENT_DIR, name);
        let Some(blob) = self.db.open_blob(&path).await? else {
            return Ok(None);
        };
        let text = String::from_utf8(blob.data).map_err(|_| TransportError::MalformedRef {
            name: name.to_string(),
            content: "<binary>".to_string(),
        })?;
        let line = text.lines().next().unwrap_or("").trim_end_matches('\r');
        Ok(Some(line.to_string()))
    }
}
