use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

use crate::core::utils::{app_data_dir, config_file_in, data_dir_in, ensure_dir};
use crate::errors::StorageError;

const TMP_SUFFIX: &str = "tmp";

pub const SCAN_DELAY_ENV: &str = "EXPENSE_CORE_SCAN_DELAY_MS";
pub const AUTH_DELAY_ENV: &str = "EXPENSE_CORE_AUTH_DELAY_MS";

/// User preferences and tuning knobs for the mocked services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_scan_delay_ms")]
    pub scan_delay_ms: u64,
    #[serde(default = "Config::default_auth_delay_ms")]
    pub auth_delay_ms: u64,
    #[serde(default = "Config::default_federated_auth_delay_ms")]
    pub federated_auth_delay_ms: u64,
    #[serde(default = "Config::default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory for the persisted key files. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            scan_delay_ms: Self::default_scan_delay_ms(),
            auth_delay_ms: Self::default_auth_delay_ms(),
            federated_auth_delay_ms: Self::default_federated_auth_delay_ms(),
            recent_limit: Self::default_recent_limit(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_scan_delay_ms() -> u64 {
        2000
    }

    pub fn default_auth_delay_ms() -> u64 {
        1000
    }

    pub fn default_federated_auth_delay_ms() -> u64 {
        1500
    }

    pub fn default_recent_limit() -> usize {
        5
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }

    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }

    pub fn federated_auth_delay(&self) -> Duration {
        Duration::from_millis(self.federated_auth_delay_ms)
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| data_dir_in(base))
    }

    /// Applies delay overrides from the environment. Both mocked services
    /// share the auth override.
    pub fn apply_env_overrides(&mut self) {
        if let Some(ms) = env_millis(SCAN_DELAY_ENV) {
            self.scan_delay_ms = ms;
        }
        if let Some(ms) = env_millis(AUTH_DELAY_ENV) {
            self.auth_delay_ms = ms;
            self.federated_auth_delay_ms = ms;
        }
    }
}

fn env_millis(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric delay override");
            None
        }
    }
}

/// Handles persistence of [`Config`] under the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, StorageError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, StorageError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, StorageError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
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

fn write_atomic(path: &Path, data: &str) -> Result<(), StorageError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
