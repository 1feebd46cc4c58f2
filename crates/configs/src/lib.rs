//! # configs
//!
//! Layered runtime settings: built-in defaults, then an optional TOML file,
//! then `FORUM__`-prefixed environment variables (e.g.
//! `FORUM__STORAGE__BACKEND=memory`). Call `load_dotenv` before
//! `Settings::load` so variables from a `.env` file take part.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Settings file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "forum.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local; contents vanish on exit.
    Memory,
    /// JSON documents under `data_dir`.
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Byte limit for the memory backend.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSettings {
    /// Write demo posts into an empty store at startup.
    pub on_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub seed: SeedSettings,
    pub log: LogSettings,
}

/// Exports the variables of a `.env` file into the process environment,
/// without overriding ones already set. Reads `path`, or searches the working
/// directory and its parents when `None`. Returns the file that was loaded.
///
/// Runs before logging is configured, so the caller reports the result.
pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

impl Settings {
    /// Loads settings from `path`, or `DEFAULT_CONFIG_FILE` when `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let settings = Config::builder()
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", "./data")?
            .set_default("seed.on_start", true)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("FORUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
