//! store
//!
//! The blob-store boundary of the transport.
//!
//! # Architecture
//!
//! The [`BlobStore`] trait defines the five operations (GET, buffered PUT,
//! streaming PUT, DELETE, LIST) the transport needs from a remote object
//! store. Everything above this boundary is store-agnostic; wire clients
//! (request signing, encryption, retry policy) live behind it.
//!
//! # Modules
//!
//! - `traits`: Core `BlobStore` trait, [`Blob`], and [`StoreError`]
//! - [`memory`]: Deterministic in-memory implementation for testing

pub mod memory;
mod traits;

pub use memory::{FailOn, InMemoryStore, StoreOp};
pub use traits::*;
