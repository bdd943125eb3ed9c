//! Integration tests for the file-backed counter store.
//!
//! Every test works inside its own temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use viewcount_store::{CounterBackend, CounterStore, FileStore, StoreError};

#[tokio::test]
async fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("count.txt")).await.unwrap();

    assert_eq!(store.read().await.unwrap(), None);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.txt");
    let store = FileStore::open(&path).await.unwrap();

    store.write(6).await.unwrap();
    assert_eq!(store.read().await.unwrap(), Some(6));

    // A fresh handle sees the same value, as after a restart.
    let reopened = FileStore::open(&path).await.unwrap();
    assert_eq!(reopened.read().await.unwrap(), Some(6));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "6");
}

#[tokio::test]
async fn write_leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("count.txt")).await.unwrap();

    store.write(1).await.unwrap();
    store.write(2).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![String::from("count.txt")]);
}

#[tokio::test]
async fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("count.txt");
    let store = FileStore::open(&path).await.unwrap();

    store.write(3).await.unwrap();
    assert_eq!(store.read().await.unwrap(), Some(3));
}

#[tokio::test]
async fn hand_edited_value_with_newline_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.txt");
    std::fs::write(&path, "5\n").unwrap();

    let store = FileStore::open(&path).await.unwrap();
    assert_eq!(store.read().await.unwrap(), Some(5));
}

#[tokio::test]
async fn garbage_content_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.txt");
    std::fs::write(&path, "five").unwrap();

    let store = FileStore::open(&path).await.unwrap();
    let err = store.read().await.unwrap_err();
    assert!(matches!(err, StoreError::Malformed { ref raw, .. } if raw == "five"));
}

#[tokio::test]
async fn unreadable_location_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be cannot be read as text.
    let path = dir.path().join("count.txt");
    std::fs::create_dir(&path).unwrap();

    let store = FileStore::open(&path).await.unwrap();
    assert!(matches!(store.read().await, Err(StoreError::Io { .. })));
}

#[tokio::test]
async fn failed_write_keeps_previous_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.txt");
    let store = FileStore::open(&path).await.unwrap();
    store.write(10).await.unwrap();

    // Block the temp file slot with a non-empty directory so the write
    // fails before the rename.
    let blocker = dir.path().join("count.txt.tmp");
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("keep"), "x").unwrap();

    assert!(matches!(store.write(11).await, Err(StoreError::Io { .. })));
    assert_eq!(store.read().await.unwrap(), Some(10));
}

#[tokio::test]
async fn backend_enum_delegates_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = FileStore::open(dir.path().join("count.txt")).await.unwrap();
    let backend = CounterBackend::from(file);

    backend.write(7).await.unwrap();
    assert_eq!(backend.read().await.unwrap(), Some(7));
    assert!(backend.location().starts_with("file:"));
}
