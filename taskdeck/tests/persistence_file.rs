//! File-backed storage tests.

#![allow(clippy::unwrap_used)] // Test code

use std::sync::Arc;
use taskdeck::persistence::{CURRENT_VERSION, DEFAULT_STORAGE_KEY};
use taskdeck::{Board, CategoryColor, Config, FileKeyValueStore, NewTodo, SnapshotRepository};
use taskdeck_core::storage::KeyValueStore;

#[tokio::test]
async fn test_missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileKeyValueStore::new(dir.path());

    assert_eq!(store.get("todo-app-state").await, Ok(None));
}

#[tokio::test]
async fn test_set_creates_directory_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileKeyValueStore::new(dir.path().join("nested").join("data"));

    store.set("k", b"first").await.unwrap();
    store.set("k", b"second").await.unwrap();

    assert_eq!(store.get("k").await, Ok(Some(b"second".to_vec())));
    let files: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files, ["k.json"]);
}

#[tokio::test]
async fn test_malformed_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo-app-state.json"), "[1, 2, 3").unwrap();

    let repo = SnapshotRepository::new(Arc::new(FileKeyValueStore::new(dir.path())));

    assert!(repo.load().await.is_empty());
}

#[tokio::test]
async fn test_board_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let board = Board::from_config(&config);
    board.load().await.unwrap();
    board.add_category("Errands", CategoryColor::Yellow).await.unwrap();
    let errands = board.categories().await[0].id;
    board
        .add_todo(NewTodo::titled("Post parcel").category(errands))
        .await
        .unwrap();
    board.shutdown(config.shutdown_timeout()).await.unwrap();

    let raw: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json"))).unwrap(),
    )
    .unwrap();
    assert_eq!(raw["version"], CURRENT_VERSION);
    assert_eq!(raw["todos"][0]["categoryId"], errands.to_string());

    let reopened = Board::from_config(&config);
    reopened.load().await.unwrap();

    assert_eq!(reopened.todos().await, board.todos().await);
    assert_eq!(reopened.categories().await, board.categories().await);
}
