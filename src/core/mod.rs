//! core
//!
//! Domain types and pure logic shared by the transport.
//!
//! # Modules
//!
//! - [`types`]: Object ids and the `Ref`/`RefStorage` model
//! - [`keys`]: Repository-relative path to store-key resolution
//! - [`manifest`]: The per-repository version manifest

pub mod keys;
pub mod manifest;
pub mod types;

pub use keys::{resolve_key, KeyError};
pub use manifest::VersionManifest;
pub use types::{ObjectId, Ref, RefStorage, TypeError};
