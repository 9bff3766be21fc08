//! remote
//!
//! The transport session layer over the blob-store boundary.
//!
//! # Architecture
//!
//! A fetch or push engine opens a [`RemoteNamespace`] for the repository a
//! [`RemoteUri`] addresses, enumerates refs and packs through it, reads and
//! writes individual blobs, and closes it. The namespace owns the version
//! manifest for the session and annotates every store call with the tracked
//! versions; the engine never touches store keys directly.
//!
//! # Modules
//!
//! - `errors`: The [`TransportError`] taxonomy
//! - `uri`: The `amazon-s3://` addressing scheme
//! - `packs`: Pack discovery and pairing
//! - `refs`: Advertised ref set construction
//! - `namespace`: The session facade
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use silt::remote::{RemoteNamespace, RemoteUri};
//! use silt::store::InMemoryStore;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryStore::new());
//! store.seed(
//!     "backups",
//!     "repo.git/refs/heads/main",
//!     b"abcdef0123456789abcdef0123456789abcdef01",
//! );
//!
//! let uri: RemoteUri = "amazon-s3://AKIA123@backups/repo.git".parse().unwrap();
//! let ns = RemoteNamespace::open(store, &uri).await.unwrap();
//!
//! let refs = ns.advertised_refs().await.unwrap();
//! assert!(refs.contains_key("refs/heads/main"));
//! ns.close().await;
//! # });
//! ```

mod errors;
mod namespace;
mod packs;
mod refs;
mod uri;

pub use errors::TransportError;
pub use namespace::{PendingWrite, RemoteNamespace};
pub use packs::{list_packs, PackDescriptor, PACK_DIR};
pub use refs::HEAD;
pub use uri::{RemoteUri, S3_SCHEME};
