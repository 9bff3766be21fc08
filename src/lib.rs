//! Silt - git remote transport over dumb key-value blob stores
//!
//! Silt adapts a git repository's remote storage layout (refs, loose
//! objects, pack files) onto a generic blob store that offers only
//! eventually-consistent GET/PUT/LIST/DELETE. The remote needs no git
//! support at all; it sees nothing but named blobs under a key prefix,
//! which makes plain object storage usable as a fetch/push remote or a
//! backup target.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`store`] - The blob-store boundary: the `BlobStore` trait and an
//!   in-memory implementation for tests
//! - [`core`] - Domain types and pure logic: object ids, refs, key
//!   resolution, and the version manifest
//! - [`remote`] - The session layer: URI addressing, pack discovery, ref
//!   advertisement, and the `RemoteNamespace` facade
//!
//! # Consistency model
//!
//! The store may be eventually consistent. Silt records the version the
//! store assigns to every key it writes in a per-repository manifest,
//! passes that version back on reads, and persists the manifest next to
//! the repository at session close. The manifest blob is the only key that
//! needs strong consistency; everything else needs only eventual
//! consistency once versioned.
//!
//! # Limitations
//!
//! Concurrent pushes from independent clients to the same remote are
//! unsupported; nothing locks the manifest key, so overlapping sessions
//! can silently lose each other's version-tracking updates.

pub mod core;
pub mod remote;
pub mod store;
