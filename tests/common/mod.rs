#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use expense_core::{
    config::ConfigManager,
    core::{services::ExpenseStore, FixedClock},
    storage::JsonFileStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated file store and config manager sharing one base directory.
pub fn setup_test_env() -> (JsonFileStore, ConfigManager) {
    let base = temp_base();
    let storage = JsonFileStore::new(base.join("data")).expect("create json file store");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (storage, config_manager)
}

/// Expense store over `storage` whose clock is pinned to the given day.
pub fn store_on(storage: &JsonFileStore, year: i32, month: u32, day: u32) -> ExpenseStore {
    ExpenseStore::open(
        Box::new(storage.clone()),
        Box::new(FixedClock::on(year, month, day)),
    )
}
