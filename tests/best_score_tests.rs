//! Tests for the best score file
//!
//! These share one file in the temp directory, so they run serially.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use twenty48::best_score::BestScoreStore;
use twenty48::error::GameError;

fn store() -> BestScoreStore {
    let path: PathBuf = std::env::temp_dir().join("twenty48_best_score_test.txt");
    let _ = fs::remove_file(&path);
    BestScoreStore::new(path)
}

#[test]
#[serial]
fn missing_file_reads_as_zero() {
    let store = store();

    assert_eq!(store.load().unwrap(), 0);
}

#[test]
#[serial]
fn saved_score_is_loaded_back() {
    let store = store();

    store.save(2048).unwrap();

    assert_eq!(store.load().unwrap(), 2048);
}

#[test]
#[serial]
fn surrounding_whitespace_is_ignored() {
    let store = store();
    fs::write(store.path(), "  128\n").unwrap();

    assert_eq!(store.load().unwrap(), 128);
}

#[test]
#[serial]
fn corrupt_file_is_an_error() {
    let store = store();
    fs::write(store.path(), "lots").unwrap();

    assert!(matches!(store.load(), Err(GameError::Parse(ref text)) if text == "lots"));
    assert_eq!(store.load_or_default(), 0);
}

#[test]
#[serial]
fn save_overwrites_previous_best() {
    let store = store();

    store.save(512).unwrap();
    store.save(1024).unwrap();

    assert_eq!(store.load().unwrap(), 1024);
}
