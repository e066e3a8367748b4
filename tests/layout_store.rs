use cartograph::layout::{FileLayoutStore, LayoutStore};
use cartograph::topology::{Position, PositionMap};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> FileLayoutStore {
    FileLayoutStore::new(dir.path().join("layout.json"))
}

fn positions(entries: &[(&str, f64, f64)]) -> PositionMap {
    entries
        .iter()
        .map(|(id, x, y)| (id.to_string(), Position { x: *x, y: *y }))
        .collect()
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);

    let snapshot = positions(&[("1", 10.0, 20.0), ("2", -5.5, 140.0)]);
    store.save(&snapshot).await.expect("save");

    assert_eq!(store.load().await, snapshot);
}

#[tokio::test]
async fn load_without_a_snapshot_is_empty() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn corrupt_snapshot_degrades_to_empty() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("layout.json");
    tokio::fs::write(&path, b"{ not json")
        .await
        .expect("write corrupt file");

    let store = FileLayoutStore::new(&path);
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn save_overwrites_the_whole_snapshot() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);

    store
        .save(&positions(&[("1", 1.0, 1.0), ("2", 2.0, 2.0)]))
        .await
        .expect("first save");

    let replacement = positions(&[("3", 3.0, 3.0)]);
    store.save(&replacement).await.expect("second save");

    // Last write wins; earlier entries do not linger.
    assert_eq!(store.load().await, replacement);
}

#[tokio::test]
async fn clear_removes_the_snapshot_and_is_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);

    store
        .save(&positions(&[("1", 7.0, 8.0)]))
        .await
        .expect("save");
    store.clear().await.expect("clear");
    assert!(store.load().await.is_empty());

    // Clearing an absent snapshot is not an error.
    store.clear().await.expect("clear again");
}

#[tokio::test]
async fn save_creates_missing_parent_directories() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileLayoutStore::new(dir.path().join("nested/profile/layout.json"));

    let snapshot = positions(&[("1", 0.0, 0.0)]);
    store.save(&snapshot).await.expect("save into nested path");
    assert_eq!(store.load().await, snapshot);
}
