pub mod json_backend;
pub mod memory;

use crate::errors::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key holding the JSON array of expense records.
pub const EXPENSES_KEY: &str = "monthly_expenses";
/// Key holding the signed-in user profile. Absent means signed out.
pub const AUTH_USER_KEY: &str = "auth_user";
/// Copy of an expense snapshot that did not fully parse, kept so the next
/// save cannot destroy the only copy.
pub const UNREADABLE_EXPENSES_KEY: &str = "monthly_expenses_unreadable";

/// Abstraction over string key-value persistence. Every `set` fully
/// overwrites the previous value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
