//! remote::packs
//!
//! Discovery of valid pack files on the remote.
//!
//! # Design
//!
//! Packs are discovered by listing blob names under the `pack` key of the
//! object database. A listed `pack-<id>.pack` counts only when its sibling
//! `pack-<id>.idx` is listed too; an unpaired file is an in-flight or
//! orphaned upload, not an error, and is silently skipped. Result order is
//! unspecified.

use std::collections::HashSet;

use super::errors::TransportError;
use crate::core::keys::resolve_key;
use crate::store::BlobStore;

/// Key under the object database that pack files live in.
pub const PACK_DIR: &str = "pack";

const PACK_PREFIX: &str = "pack-";
const PACK_EXT: &str = ".pack";
const INDEX_EXT: &str = ".idx";

/// A pack file confirmed to have a sibling index.
///
/// Recomputed on every listing; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackDescriptor {
    name: String,
}

impl PackDescriptor {
    /// Pack file name, e.g. `pack-abc123.pack`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the sibling index file, e.g. `pack-abc123.idx`.
    pub fn index_name(&self) -> String {
        format!(
            "{}{}",
            &self.name[..self.name.len() - PACK_EXT.len()],
            INDEX_EXT
        )
    }
}

/// List complete (pack + index) pairs under `objects_key/pack`.
pub async fn list_packs(
    store: &dyn BlobStore,
    bucket: &str,
    objects_key: &str,
) -> Result<Vec<PackDescriptor>, TransportError> {
    let pack_key = resolve_key(objects_key, PACK_DIR)?;
    let names = store
        .list(bucket, &pack_key)
        .await
        .map_err(|source| TransportError::store("list", bucket, &pack_key, source))?;
    Ok(pair_packs(&names))
}

/// Filter listed names down to packs with a confirmed index.
pub(crate) fn pair_packs(names: &[String]) -> Vec<PackDescriptor> {
    let have: HashSet<&str> = names.iter().map(String::as_str).collect();
    names
        .iter()
        .filter(|n| n.starts_with(PACK_PREFIX) && n.ends_with(PACK_EXT))
        .filter(|n| {
            let index = format!("{}{}", &n[..n.len() - PACK_EXT.len()], INDEX_EXT);
            have.contains(index.as_str())
        })
        .map(|n| PackDescriptor { name: n.clone() })
        .collect()
}
