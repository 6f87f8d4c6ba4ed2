use super::*;
use crate::storage::MemoryObjectStore;
use crate::testing::{sample_variables_json, write_variables};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    scratch: ScratchSpace,
    store: MemoryObjectStore,
    stager: Stager,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = write_variables(dir.path(), &sample_variables_json());
    let store = MemoryObjectStore::new();
    store.create_bucket("staging").await;
    let scratch = ScratchSpace::create_in(dir.path()).unwrap();
    let stager = Stager::new(Arc::new(store.clone()), VariablesLoader::new(path), &scratch);
    Fixture {
        _dir: dir,
        scratch,
        store,
        stager,
    }
}

fn temperature_table(rows: usize) -> Table {
    let mut table = Table::new(["lat", "lon", "value"]);
    for i in 0..rows {
        table
            .push_row([format!("{i}.5"), format!("-{i}.25"), format!("27{i}.1")])
            .unwrap();
    }
    table
}

#[tokio::test]
async fn test_stage_round_trip() {
    let f = fixture().await;
    let table = temperature_table(5);

    let variables = f.stager.stage(table.clone(), "temperature").await.unwrap();
    assert_eq!(variables.etl.temps3dir, "staging");

    let bytes = f.store.get_bytes("staging", "temperature.csv").await.unwrap();
    let back = Table::from_csv(std::str::from_utf8(&bytes).unwrap()).unwrap();
    assert_eq!(back.len(), 5);
    assert_eq!(back, table);
}

#[tokio::test]
async fn test_stage_keeps_padded_cells() {
    let f = fixture().await;
    let mut table = Table::new(["station", "note"]);
    table.push_row([" a", "b "]).unwrap();
    table.push_row(["  ", "c"]).unwrap();

    f.stager.stage(table.clone(), "salinity").await.unwrap();

    let bytes = f.store.get_bytes("staging", "salinity.csv").await.unwrap();
    let back = Table::from_csv(std::str::from_utf8(&bytes).unwrap()).unwrap();
    assert_eq!(back.rows()[0], vec![" a", "b "]);
    assert_eq!(back, table);
}

#[tokio::test]
async fn test_stage_leaves_exactly_one_object_and_no_local_files() {
    let f = fixture().await;

    f.stager.stage(temperature_table(2), "temperature").await.unwrap();
    f.stager.stage(temperature_table(3), "temperature").await.unwrap();

    assert_eq!(f.store.keys("staging").await, vec!["temperature.csv"]);
    let bytes = f.store.get_bytes("staging", "temperature.csv").await.unwrap();
    // last writer wins
    assert_eq!(String::from_utf8(bytes).unwrap().lines().count(), 4);

    let staging_dir = f.scratch.path().join("staging");
    let leftovers = std::fs::read_dir(&staging_dir).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_stage_empty_table_writes_header_only() {
    let f = fixture().await;

    f.stager.stage(Table::new(["lat", "lon"]), "salinity").await.unwrap();

    let bytes = f.store.get_bytes("staging", "salinity.csv").await.unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "lat,lon\n");
}

#[tokio::test]
async fn test_upload_failure_still_cleans_up() {
    let f = fixture().await;
    f.store.set_unavailable("staging").await;

    let err = f
        .stager
        .stage(temperature_table(1), "temperature")
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::Upload { .. }));

    let staging_dir = f.scratch.path().join("staging");
    assert_eq!(std::fs::read_dir(&staging_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_locate_single_csv_counts() {
    let dir = TempDir::new().unwrap();

    let err = locate_single_csv(dir.path()).await.unwrap_err();
    assert!(matches!(err, StageError::OutputCount { found: 0, .. }));

    std::fs::write(dir.path().join("part-00000.csv"), "a\n").unwrap();
    std::fs::write(dir.path().join("_SUCCESS"), "").unwrap();
    let found = locate_single_csv(dir.path()).await.unwrap();
    assert_eq!(found.file_name().unwrap(), "part-00000.csv");

    std::fs::write(dir.path().join("part-00001.csv"), "a\n").unwrap();
    let err = locate_single_csv(dir.path()).await.unwrap_err();
    assert!(matches!(err, StageError::OutputCount { found: 2, .. }));
}
