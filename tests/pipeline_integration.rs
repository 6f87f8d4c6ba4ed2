//! End-to-end runs over the in-memory object store, mock extraction tool and
//! in-memory warehouse

mod common;

use common::expect_sample_features;
use ncload::error::ErrorCode;
use ncload::pipeline::OutcomeStatus;
use ncload::storage::ObjectStore;
use ncload::sync::ListingPolicy;
use ncload::testing::{TestContext, RAW_DATA_BUCKET, SOURCE_BUCKET, STAGING_BUCKET};

#[tokio::test]
async fn test_new_file_is_loaded_into_every_feature_table() {
    let mut ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    ctx.add_source_file("b.nc").await;
    ctx.store
        .put_bytes(RAW_DATA_BUCKET, "a.nc", b"CDF\x01".to_vec())
        .await;
    expect_sample_features(&mut ctx);

    let report = ctx.pipeline().unwrap().run().await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.copied, vec!["b.nc"]);

    let temperature = ctx.warehouse.rows("climate.temp_table").await;
    assert_eq!(temperature.len(), 3);
    assert_eq!(
        temperature[2],
        vec!["2020-01-01", "00:00:00", "2.5", "2.5", "279.9"]
    );
    assert_eq!(ctx.warehouse.rows("climate.salinity_table").await.len(), 1);

    let loaded: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| (o.feature.as_str(), o.rows))
        .collect();
    assert_eq!(loaded, vec![("salinity", Some(1)), ("temperature", Some(3))]);
    assert!(ctx.store.keys(STAGING_BUCKET).await.is_empty());
}

#[tokio::test]
async fn test_second_run_copies_nothing() {
    let mut ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    expect_sample_features(&mut ctx);

    let first = ctx.pipeline().unwrap().run().await.unwrap();
    let second = ctx.pipeline().unwrap().run().await.unwrap();

    assert_eq!(first.copied, vec!["a.nc"]);
    assert!(second.copied.is_empty());
    assert!(second.outcomes.is_empty());
    assert_eq!(ctx.warehouse.rows("climate.temp_table").await.len(), 3);
}

#[tokio::test]
async fn test_non_netcdf_files_are_never_copied() {
    let mut ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    ctx.add_source_file("README.txt").await;
    ctx.store
        .put_bytes(RAW_DATA_BUCKET, "notes.txt", b"x".to_vec())
        .await;
    expect_sample_features(&mut ctx);

    let report = ctx.pipeline().unwrap().run().await.unwrap();

    assert_eq!(report.copied, vec!["a.nc"]);
    assert_eq!(
        ctx.store.keys(RAW_DATA_BUCKET).await,
        vec!["a.nc", "notes.txt"]
    );
}

#[tokio::test]
async fn test_strict_listing_failure_aborts_the_run() {
    let ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    ctx.store.set_unavailable(SOURCE_BUCKET).await;

    let err = ctx.pipeline().unwrap().run().await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::SYNC_LISTING_FAILED);
    assert!(ctx.store.keys(RAW_DATA_BUCKET).await.is_empty());
}

#[tokio::test]
async fn test_lenient_listing_treats_unlistable_source_as_empty() {
    let ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    ctx.store.set_unavailable(SOURCE_BUCKET).await;

    let report = ctx
        .pipeline()
        .unwrap()
        .with_listing_policy(ListingPolicy::Lenient)
        .run()
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(report.copied.is_empty());
}

#[tokio::test]
async fn test_unreachable_warehouse_keeps_staged_files_for_retry() {
    let mut ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    expect_sample_features(&mut ctx);
    ctx.warehouse.set_unreachable().await;

    let report = ctx.pipeline().unwrap().run().await.unwrap();

    assert!(!report.is_success());
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == OutcomeStatus::LoadFailed && o.staged_retained));
    assert_eq!(
        ctx.store.keys(STAGING_BUCKET).await,
        vec!["salinity.csv", "temperature.csv"]
    );

    let staged = ctx
        .store
        .get_bytes(STAGING_BUCKET, "temperature.csv")
        .await
        .unwrap();
    let text = String::from_utf8(staged).unwrap();
    assert!(text.starts_with("date,time,lat,lon,value\n"));
    assert_eq!(text.lines().count(), 4);
}

#[tokio::test]
async fn test_report_serializes_for_json_output() {
    let mut ctx = TestContext::new().await.unwrap();
    ctx.add_source_file("a.nc").await;
    expect_sample_features(&mut ctx);

    let report = ctx.pipeline().unwrap().run().await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["copied"], serde_json::json!(["a.nc"]));
    assert_eq!(json["outcomes"][1]["feature"], "temperature");
    assert_eq!(json["outcomes"][1]["status"], "loaded");
    assert_eq!(json["outcomes"][1]["rows"], 3);
    assert!(json["finished_at"].is_string());
}
