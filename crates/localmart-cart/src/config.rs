// Configuration loading and parsing (config/localmart.toml).

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cart::manager::DEFAULT_CART_KEY;
use crate::cart::totals::Pricing;
use crate::store::default_db_path;

/// Name of the config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "localmart.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// localmart.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the cart. Empty means the platform data directory.
    #[serde(default)]
    pub db_path: String,
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: String::new(),
            cart_key: default_cart_key(),
        }
    }
}

impl StorageConfig {
    /// The database path to open, resolving an empty `db_path` to the
    /// platform default.
    pub fn resolved_db_path(&self) -> PathBuf {
        if self.db_path.trim().is_empty() {
            default_db_path()
        } else {
            PathBuf::from(&self.db_path)
        }
    }
}

fn default_cart_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/localmart.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);

        // Never overwrite a file the user already has.
        let mut dest = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(dest) => dest,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                })
            }
        };
        let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        dest.write_all(&content).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to write {}: {e}", target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to `base_dir`, copying default
/// config files into place first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let pricing = &config.pricing;
    if pricing.delivery_fee <= Decimal::ZERO {
        return Err(ConfigError::ValidationError {
            field: "pricing.delivery_fee".into(),
            message: format!("must be > 0, got {}", pricing.delivery_fee),
        });
    }

    if pricing.tax_rate < Decimal::ZERO || pricing.tax_rate > Decimal::ONE {
        return Err(ConfigError::ValidationError {
            field: "pricing.tax_rate".into(),
            message: format!(
                "must be between 0.0 and 1.0 inclusive, got {}",
                pricing.tax_rate
            ),
        });
    }

    if config.storage.cart_key.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "storage.cart_key".into(),
            message: "must not be empty".into(),
        });
    }

    if config.orders.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "orders.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    if config.orders.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "orders.timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
