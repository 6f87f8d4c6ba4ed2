use super::*;
use crate::storage::MemoryObjectStore;
use crate::testing::{sample_variables_json, write_variables};
use proptest::prelude::*;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: MemoryObjectStore,
    differ: SourceDiffer,
}

async fn fixture(source: &[&str], destination: &[&str]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = write_variables(dir.path(), &sample_variables_json());

    let store = MemoryObjectStore::new();
    store.create_bucket("noaa-source").await;
    store.create_bucket("raw-data").await;
    for key in source {
        store.put_bytes("noaa-source", key, b"netcdf".to_vec()).await;
    }
    for key in destination {
        store.put_bytes("raw-data", key, b"netcdf".to_vec()).await;
    }

    let differ = SourceDiffer::new(Arc::new(store.clone()), VariablesLoader::new(path));
    Fixture {
        _dir: dir,
        store,
        differ,
    }
}

#[tokio::test]
async fn test_resolve_bucket_links() {
    let f = fixture(&[], &[]).await;
    let (source, destination) = f.differ.resolve_bucket_links().await.unwrap();
    assert_eq!(source, "noaa-source");
    assert_eq!(destination, "raw-data");
}

#[tokio::test]
async fn test_resolve_bucket_links_missing_config() {
    let store = Arc::new(MemoryObjectStore::new());
    let differ = SourceDiffer::new(store, VariablesLoader::new("/nonexistent/variables.json"));

    let err = differ.resolve_bucket_links().await.unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[tokio::test]
async fn test_sync_copies_only_missing_then_nothing() {
    let f = fixture(&["a.nc", "b.nc"], &["a.nc"]).await;

    let copied = f.differ.sync().await.unwrap();
    assert_eq!(copied, vec!["b.nc"]);
    assert_eq!(f.store.keys("raw-data").await, vec!["a.nc", "b.nc"]);

    let second = f.differ.sync().await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_non_netcdf_destination_key_does_not_count() {
    let f = fixture(&["notes.txt", "a.nc"], &["notes.txt"]).await;

    let missing = f
        .differ
        .compute_missing("noaa-source", "raw-data")
        .await
        .unwrap();
    assert!(missing.contains("notes.txt"));
    assert!(missing.contains("a.nc"));
}

#[tokio::test]
async fn test_sync_skips_non_netcdf_source_keys() {
    let f = fixture(&["README", "a.nc"], &[]).await;

    let copied = f.differ.sync().await.unwrap();
    assert_eq!(copied, vec!["a.nc"]);
    assert_eq!(f.store.keys("raw-data").await, vec!["a.nc"]);

    // skipped keys stay visible to the diff
    let missing = f
        .differ
        .compute_missing("noaa-source", "raw-data")
        .await
        .unwrap();
    assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["README"]);
}

#[tokio::test]
async fn test_empty_buckets_are_not_errors() {
    let f = fixture(&[], &[]).await;
    assert!(f.differ.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_strict_listing_surfaces_errors() {
    let f = fixture(&["a.nc"], &["a.nc"]).await;
    f.store.set_unavailable("raw-data").await;

    let err = f.differ.sync().await.unwrap_err();
    match err {
        SyncError::Listing { bucket, .. } => assert_eq!(bucket, "raw-data"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_lenient_listing_treats_bucket_as_empty() {
    let f = fixture(&["a.nc"], &["a.nc"]).await;
    let store = f.store.clone();
    store.set_unavailable("noaa-source").await;
    let differ = f.differ.with_policy(ListingPolicy::Lenient);

    let missing = differ
        .compute_missing("noaa-source", "raw-data")
        .await
        .unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_lenient_destination_outage_reports_everything_missing() {
    let f = fixture(&["a.nc", "b.nc"], &["a.nc"]).await;
    f.store.set_unavailable("raw-data").await;
    let differ = f.differ.with_policy(ListingPolicy::Lenient);

    let missing = differ
        .compute_missing("noaa-source", "raw-data")
        .await
        .unwrap();
    assert_eq!(missing.len(), 2);
}

#[tokio::test]
async fn test_copy_failure_reports_partial_progress() {
    let f = fixture(&["a.nc", "b.nc"], &[]).await;
    // a.nc copies, then the destination goes away before b.nc
    let store = f.store.clone();
    let wrapper = FailingAfter {
        inner: store.clone(),
        allowed: std::sync::atomic::AtomicUsize::new(1),
    };
    let differ = SourceDiffer::new(Arc::new(wrapper), f.differ.loader.clone());

    let err = differ.sync().await.unwrap_err();
    match err {
        SyncError::Copy { key, copied, .. } => {
            assert_eq!(key, "b.nc");
            assert_eq!(copied, vec!["a.nc"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.keys("raw-data").await, vec!["a.nc"]);
}

/// Lets a fixed number of copies through, then fails
struct FailingAfter {
    inner: MemoryObjectStore,
    allowed: std::sync::atomic::AtomicUsize,
}

#[async_trait::async_trait]
impl ObjectStore for FailingAfter {
    async fn list_keys(&self, bucket: &str) -> crate::storage::StorageResult<Vec<String>> {
        self.inner.list_keys(bucket).await
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        key: &str,
        dest_bucket: &str,
    ) -> crate::storage::StorageResult<()> {
        use std::sync::atomic::Ordering;
        if self.allowed.load(Ordering::SeqCst) == 0 {
            return Err(StorageError::unavailable("connection reset"));
        }
        self.allowed.fetch_sub(1, Ordering::SeqCst);
        self.inner.copy_object(source_bucket, key, dest_bucket).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &std::path::Path,
    ) -> crate::storage::StorageResult<()> {
        self.inner.upload_file(bucket, key, path).await
    }

    async fn download_file(
        &self,
        bucket: &str,
        key: &str,
        path: &std::path::Path,
    ) -> crate::storage::StorageResult<()> {
        self.inner.download_file(bucket, key, path).await
    }

    async fn get_bytes(&self, bucket: &str, key: &str) -> crate::storage::StorageResult<Vec<u8>> {
        self.inner.get_bytes(bucket, key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> crate::storage::StorageResult<()> {
        self.inner.delete_object(bucket, key).await
    }

    async fn exists(&self, bucket: &str, key: &str) -> crate::storage::StorageResult<bool> {
        self.inner.exists(bucket, key).await
    }
}

fn key_strategy() -> impl Strategy<Value = String> {
    ("[a-c]{1,2}", prop_oneof![Just(".nc"), Just(".txt"), Just("")])
        .prop_map(|(stem, ext)| format!("{stem}{ext}"))
}

proptest! {
    #[test]
    fn test_missing_is_set_difference(
        source in prop::collection::vec(key_strategy(), 0..20),
        destination in prop::collection::vec(key_strategy(), 0..20),
    ) {
        let missing = missing_keys(source.clone(), destination.clone());

        let present: BTreeSet<String> =
            destination.iter().filter(|k| k.ends_with(".nc")).cloned().collect();
        let expected: BTreeSet<String> =
            source.iter().filter(|k| !present.contains(*k)).cloned().collect();
        prop_assert_eq!(&missing, &expected);

        // enumeration order does not matter
        let mut source_rev = source.clone();
        source_rev.reverse();
        let mut destination_rev = destination.clone();
        destination_rev.reverse();
        prop_assert_eq!(missing_keys(source_rev, destination_rev), missing);
    }

    #[test]
    fn test_missing_is_empty_after_copy(
        source in prop::collection::vec(key_strategy(), 0..20),
        destination in prop::collection::vec(key_strategy(), 0..20),
    ) {
        let missing = missing_keys(source.clone(), destination.clone());
        let mut after = destination.clone();
        after.extend(missing.iter().filter(|k| k.ends_with(".nc")).cloned());

        let second = missing_keys(source, after);
        prop_assert!(second.iter().all(|k| !k.ends_with(".nc")));
    }
}
