use crate::models::StorageError;
use crate::storage::config::ConfigStorage;
use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment variable pointing at an alternative configuration file.
pub const CONFIG_ENV: &str = "TODO_SESSIONS_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl From<StorageError> for ConfigError {
    fn from(error: StorageError) -> Self {
        ConfigError::Storage(error.to_string())
    }
}

pub const KEYS: &[&str] = &[
    "storage.type",
    "storage.path",
    "session-lifespan",
    "seed-default-list",
];

const VALID_STORAGE_TYPES: &[&str] = &["json", "sqlite", "memory"];

fn validate_storage_path(path: &str) -> Result<PathBuf, ConfigError> {
    // Check for null bytes and other invalid characters
    if path.contains('\0') {
        return Err(ConfigError::InvalidConfig(
            "Path contains invalid characters".to_string(),
        ));
    }

    let path = shellexpand::tilde(path);
    let path = PathBuf::from(path.as_ref());

    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "Path cannot be empty".to_string(),
        ));
    }

    // Check if parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(ConfigError::InvalidConfig(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        // Check if directory is writable
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if let Ok(metadata) = parent.metadata() {
                if metadata.mode() & 0o200 == 0 {
                    return Err(ConfigError::InvalidConfig(format!(
                        "Directory is not writable: {}",
                        parent.display()
                    )));
                }
            }
        }
    }

    Ok(path)
}

fn validate_storage_type(value: &str) -> Result<StorageType, ConfigError> {
    StorageType::from_str(value).ok_or_else(|| {
        ConfigError::InvalidConfig(format!(
            "storage.type must be one of: {}",
            VALID_STORAGE_TYPES.join(", ")
        ))
    })
}

/// JSON storage keeps a directory of session files, SQLite a single database
/// file. Paths that do not exist yet suit either.
fn check_path_suits_type(path: &Path, storage_type: StorageType) -> Result<(), ConfigError> {
    let mismatch = match storage_type {
        StorageType::Json => path.is_file(),
        StorageType::Sqlite => path.is_dir(),
        StorageType::Memory => false,
    };
    if mismatch {
        let expected = match storage_type {
            StorageType::Sqlite => "a database file",
            _ => "a directory",
        };
        return Err(ConfigError::InvalidConfig(format!(
            "{} storage needs {expected} but {} is not one; set storage.path first or unset it",
            storage_type.as_str(),
            path.display()
        )));
    }
    Ok(())
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn validate_lifespan(value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| {
        ConfigError::InvalidConfig(
            "session-lifespan must be a positive number of minutes or 0".to_string(),
        )
    })
}

fn validate_flag(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidConfig(
            "seed-default-list must be true or false".to_string(),
        )),
    }
}

/// Values explicitly set in the configuration file. `None` means "use the default".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    /// Minutes of inactivity after which a session ends; 0 keeps sessions forever.
    #[serde(default)]
    pub session_lifespan: Option<u32>,
    #[serde(default)]
    pub seed_default_list: Option<bool>,
}

impl Config {
    pub fn with_defaults() -> Self {
        Self {
            storage_type: Some(StorageType::Json.as_str().to_string()),
            storage_path: None,
            session_lifespan: Some(0),
            seed_default_list: Some(true),
        }
    }

    fn value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(match key {
            "storage.type" => self.storage_type.clone(),
            "storage.path" => self.storage_path.clone(),
            "session-lifespan" => self.session_lifespan.map(|v| v.to_string()),
            "seed-default-list" => self.seed_default_list.map(|v| v.to_string()),
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        })
    }

    /// Checks values that do not depend on the filesystem. Paths are only
    /// checked when they are set, since their parent may be created later.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref storage_type) = self.storage_type {
            validate_storage_type(storage_type)?;
        }
        if self.storage_path.as_deref() == Some("") {
            return Err(ConfigError::InvalidConfig(
                "Path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::InvalidConfig("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".config").join("todo-sessions").join("config.json"))
}

pub struct ConfigManager {
    storage: ConfigStorage,
    config: Config,
}

impl ConfigManager {
    /// Opens the configuration at `config_path`, `$TODO_SESSIONS_CONFIG`, or
    /// `~/.config/todo-sessions/config.json`, writing defaults on first use.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let storage = ConfigStorage::new(&path);
        if !storage.exists() {
            let defaults = Config::with_defaults();
            storage.save(&defaults)?;
            return Ok(Self {
                storage,
                config: defaults,
            });
        }

        let config = storage.load()?;
        Ok(Self { storage, config })
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// The explicitly configured value for `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.config.value(key)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();

        match key {
            "storage.type" => {
                let storage_type = validate_storage_type(value)?;
                if let Some(ref path) = config.storage_path {
                    check_path_suits_type(&expand_path(path), storage_type)?;
                }
                if config.storage_type.as_deref() != Some(value) {
                    warn!(
                        from = config.storage_type.as_deref().unwrap_or("json"),
                        to = value,
                        "changing storage type; existing sessions are not carried over"
                    );
                }
                config.storage_type = Some(value.to_string());
            }
            "storage.path" => {
                let path = validate_storage_path(value)?;
                check_path_suits_type(&path, self.effective_storage_type())?;
                config.storage_path = Some(path.to_string_lossy().to_string());
            }
            "session-lifespan" => {
                config.session_lifespan = Some(validate_lifespan(value)?);
            }
            "seed-default-list" => {
                config.seed_default_list = Some(validate_flag(value)?);
            }
            _ => {
                return Err(ConfigError::InvalidKey(key.to_string()));
            }
        }
        config.validate()?;
        self.storage.save(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        match key {
            "storage.type" => config.storage_type = None,
            "storage.path" => config.storage_path = None,
            "session-lifespan" => config.session_lifespan = None,
            "seed-default-list" => config.seed_default_list = None,
            _ => return Err(ConfigError::InvalidKey(key.to_string())),
        }
        self.storage.save(&config)?;
        self.config = config;
        Ok(())
    }

    /// Every known key with its effective value and whether that value is the default.
    pub fn list(&self) -> Vec<(String, String, bool)> {
        let defaults = Config::with_defaults();
        KEYS.iter()
            .map(|key| {
                let explicit = self.config.value(key).ok().flatten();
                let is_default = explicit.is_none();
                let value = match (explicit, *key) {
                    (Some(value), _) => value,
                    (None, "storage.path") => self.storage_path().to_string_lossy().to_string(),
                    (None, _) => defaults
                        .value(key)
                        .ok()
                        .flatten()
                        .unwrap_or_else(|| "null".to_string()),
                };
                (key.to_string(), value, is_default)
            })
            .collect()
    }

    pub fn storage_type(&self) -> Option<String> {
        self.config
            .storage_type
            .clone()
            .or_else(|| Config::with_defaults().storage_type)
    }

    /// The configured type, falling back to JSON when unset or unknown.
    pub fn effective_storage_type(&self) -> StorageType {
        self.storage_type()
            .as_deref()
            .and_then(StorageType::from_str)
            .unwrap_or(StorageType::Json)
    }

    /// The explicit `storage.path`, or a default next to the config file that
    /// depends on the storage type: `sessions/` for JSON, `sessions.db` for SQLite.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(ref path) = self.config.storage_path {
            return expand_path(path);
        }
        let dir = self.path().parent().unwrap_or_else(|| Path::new("."));
        match self.effective_storage_type() {
            StorageType::Sqlite => dir.join("sessions.db"),
            StorageType::Json | StorageType::Memory => dir.join("sessions"),
        }
    }

    /// `None` when sessions never expire.
    pub fn session_lifespan(&self) -> Option<chrono::Duration> {
        match self.config.session_lifespan.unwrap_or(0) {
            0 => None,
            minutes => Some(chrono::Duration::minutes(i64::from(minutes))),
        }
    }

    pub fn seed_default_list(&self) -> bool {
        self.config.seed_default_list.unwrap_or(true)
    }
}
