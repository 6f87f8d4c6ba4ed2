//! Tests for the in-memory object store
use crate::storage::backends::MemoryObjectStore;
use crate::storage::error::StorageError;
use crate::storage::traits::ObjectStore;
use tempfile::TempDir;

async fn store_with(bucket: &str, keys: &[&str]) -> MemoryObjectStore {
    let store = MemoryObjectStore::new();
    store.create_bucket(bucket).await;
    for key in keys {
        store.put_bytes(bucket, key, key.as_bytes().to_vec()).await;
    }
    store
}

#[tokio::test]
async fn test_list_keys_sorted() {
    let store = store_with("src", &["b.nc", "a.nc", "c.txt"]).await;

    let keys = store.list_keys("src").await.unwrap();
    assert_eq!(keys, vec!["a.nc", "b.nc", "c.txt"]);
}

#[tokio::test]
async fn test_list_missing_bucket_is_not_found() {
    let store = MemoryObjectStore::new();

    let err = store.list_keys("nope").await.unwrap_err();
    assert!(matches!(err, StorageError::BucketNotFound(ref b) if b == "nope"));
}

#[tokio::test]
async fn test_copy_keeps_key_and_bytes() {
    let store = store_with("src", &["2020/a.nc"]).await;
    store.create_bucket("dst").await;

    store.copy_object("src", "2020/a.nc", "dst").await.unwrap();

    assert_eq!(store.get_bytes("dst", "2020/a.nc").await.unwrap(), b"2020/a.nc");
    assert!(store.exists("src", "2020/a.nc").await.unwrap());
}

#[tokio::test]
async fn test_copy_into_missing_bucket_fails() {
    let store = store_with("src", &["a.nc"]).await;

    let err = store.copy_object("src", "a.nc", "dst").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_upload_download_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = MemoryObjectStore::new();
    store.create_bucket("staging").await;

    let local = temp_dir.path().join("part.csv");
    std::fs::write(&local, "a,b\n1,2\n").unwrap();
    store.upload_file("staging", "f.csv", &local).await.unwrap();

    let back = temp_dir.path().join("back.csv");
    store.download_file("staging", "f.csv", &back).await.unwrap();
    assert_eq!(std::fs::read_to_string(&back).unwrap(), "a,b\n1,2\n");

    store.delete_object("staging", "f.csv").await.unwrap();
    assert!(!store.exists("staging", "f.csv").await.unwrap());
    // deleting twice is fine, like S3
    store.delete_object("staging", "f.csv").await.unwrap();
}

#[tokio::test]
async fn test_unavailable_bucket_errors() {
    let store = store_with("src", &["a.nc"]).await;
    store.set_unavailable("src").await;

    let err = store.list_keys("src").await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert!(!err.is_not_found());
}
