use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{core::utils::ensure_dir, errors::StorageError};

use super::{KeyValueStore, Result};

const FILE_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed store keeping one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    let written = file
        .write_all(data.as_bytes())
        .and_then(|()| file.flush());
    if let Err(err) = written {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonFileStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonFileStore::new(temp.path().join("data")).expect("json store");
        (store, temp)
    }

    #[test]
    fn set_then_get_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        store.set("monthly_expenses", "[]").expect("write key");
        assert_eq!(store.get("monthly_expenses").unwrap().as_deref(), Some("[]"));
        assert!(store.key_path("monthly_expenses").unwrap().exists());
    }

    #[test]
    fn set_leaves_no_temp_file_behind() {
        let (store, _guard) = store_with_temp_dir();
        store.set("auth_user", "{}").expect("write key");
        let tmp = tmp_path(&store.key_path("auth_user").unwrap());
        assert!(!tmp.exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let (store, _guard) = store_with_temp_dir();
        let path = store.key_path("monthly_expenses").unwrap();
        // A non-empty directory at the target path makes the rename fail.
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(store.set("monthly_expenses", "[]").is_err());
        assert!(!tmp_path(&path).exists());
        assert!(path.is_dir());
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let (store, _guard) = store_with_temp_dir();
        store.remove("never_written").expect("remove is idempotent");
        assert_eq!(store.get("never_written").unwrap(), None);
    }

    #[test]
    fn rejects_keys_that_escape_the_root() {
        let (store, _guard) = store_with_temp_dir();
        let err = store.set("../outside", "x").expect_err("path traversal rejected");
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
