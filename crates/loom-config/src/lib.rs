//! # loom-config
//!
//! Layered configuration loading for Loom using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LOOM_*` prefix, `__` as separator)
//! 2. Project-level `.loom/config.toml`
//! 3. User-level `~/.config/loom/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LOOM_MODEL__API_KEY` -> `model.api_key`,
//! `LOOM_GENERAL__MAX_ATTEMPTS` -> `general.max_attempts`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use loom_config::LoomConfig;
//!
//! let config = LoomConfig::load_with_dotenv().expect("config");
//! if config.model.is_configured() {
//!     println!("model: {}", config.model.model);
//! }
//! ```

mod database;
mod error;
mod general;
mod loader;
mod model;
mod server;
mod storage;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::{GeneralConfig, MAX_ATTEMPTS, MIN_ATTEMPTS};
pub use loader::LoaderConfig;
pub use model::ModelConfig;
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LOOM_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoomConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl LoomConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be parsed and
    /// [`ConfigError::InvalidValue`] when a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".loom/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        if self.loader.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "loader.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.model.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.max_steps".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Fail with [`ConfigError::NotConfigured`] unless the model section is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] naming the `model` section.
    pub fn require_model(&self) -> Result<&ModelConfig, ConfigError> {
        if self.model.is_configured() {
            Ok(&self.model)
        } else {
            Err(ConfigError::NotConfigured {
                section: "model".into(),
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("loom").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
