//! Integration tests for ref advertisement and pack discovery.
//!
//! These tests lay out a full repository mirror in the in-memory store and
//! verify the advertised ref set and pack catalog a session produces.

use std::sync::Arc;

use silt::core::{ObjectId, RefStorage};
use silt::remote::{RemoteNamespace, HEAD};
use silt::store::{BlobStore, InMemoryStore};

const BUCKET: &str = "backups";
const PREFIX: &str = "repo.git";

const MAIN_ID: &str = "abcdef0123456789abcdef0123456789abcdef01";
const DEV_ID: &str = "0123456789abcdef0123456789abcdef01234567";
const TAG_ID: &str = "1234567890123456789012345678901234567890";

fn seed_repository(store: &InMemoryStore) {
    store.seed(BUCKET, "repo.git/HEAD", b"ref: refs/heads/main");
    store.seed(BUCKET, "repo.git/refs/heads/main", MAIN_ID.as_bytes());
    store.seed(BUCKET, "repo.git/refs/heads/dev", DEV_ID.as_bytes());
    store.seed(
        BUCKET,
        "repo.git/packed-refs",
        format!(
            "# pack-refs with: peeled fully-peeled\n{} refs/tags/v1\n{} refs/heads/main\n",
            TAG_ID, DEV_ID
        )
        .as_bytes(),
    );
    store.seed(BUCKET, "repo.git/objects/pack/pack-a.pack", b"PACK");
    store.seed(BUCKET, "repo.git/objects/pack/pack-a.idx", b"IDX");
    store.seed(BUCKET, "repo.git/objects/pack/pack-b.pack", b"PACK");
}

async fn open(store: &Arc<InMemoryStore>) -> RemoteNamespace {
    RemoteNamespace::open_at(store.clone() as Arc<dyn BlobStore>, BUCKET, PREFIX)
        .await
        .unwrap()
}

#[tokio::test]
async fn advertises_head_loose_and_packed_refs() {
    let store = Arc::new(InMemoryStore::new());
    seed_repository(&store);
    let ns = open(&store).await;

    let refs = ns.advertised_refs().await.unwrap();
    assert_eq!(refs.len(), 4);

    // HEAD wraps the loose main ref.
    let head = &refs[HEAD];
    assert!(head.is_symbolic());
    assert_eq!(head.object_id(), Some(ObjectId::new(MAIN_ID).unwrap()));

    // main exists both packed and loose; the loose value wins.
    let main = &refs["refs/heads/main"];
    assert_eq!(main.storage(), RefStorage::LoosePacked);
    assert_eq!(main.object_id(), Some(ObjectId::new(MAIN_ID).unwrap()));

    // dev is loose only; v1 is packed only.
    assert_eq!(refs["refs/heads/dev"].storage(), RefStorage::Loose);
    assert_eq!(refs["refs/tags/v1"].storage(), RefStorage::Packed);
    assert_eq!(
        refs["refs/tags/v1"].object_id(),
        Some(ObjectId::new(TAG_ID).unwrap())
    );

    ns.close().await;
}

#[tokio::test]
async fn advertising_is_read_only() {
    let store = Arc::new(InMemoryStore::new());
    seed_repository(&store);
    let ns = open(&store).await;

    ns.advertised_refs().await.unwrap();
    ns.pack_names().await.unwrap();
    ns.close().await;

    assert!(!store.contains(BUCKET, "repo.git.manifest"));
}

#[tokio::test]
async fn pack_catalog_requires_the_index_sibling() {
    let store = Arc::new(InMemoryStore::new());
    seed_repository(&store);
    let ns = open(&store).await;

    let packs = ns.pack_names().await.unwrap();
    let names: Vec<&str> = packs.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["pack-a.pack"]);
    assert_eq!(packs[0].index_name(), "pack-a.idx");

    ns.close().await;
}

#[tokio::test]
async fn empty_repository_advertises_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let ns = open(&store).await;

    assert!(ns.advertised_refs().await.unwrap().is_empty());
    assert!(ns.pack_names().await.unwrap().is_empty());

    ns.close().await;
}

#[tokio::test]
async fn detached_head_advertises_directly() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(BUCKET, "repo.git/HEAD", MAIN_ID.as_bytes());
    let ns = open(&store).await;

    let refs = ns.advertised_refs().await.unwrap();
    let head = &refs[HEAD];
    assert!(!head.is_symbolic());
    assert_eq!(head.object_id(), Some(ObjectId::new(MAIN_ID).unwrap()));
    assert_eq!(head.storage(), RefStorage::Loose);

    ns.close().await;
}
