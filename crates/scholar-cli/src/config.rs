//! Configuration management for the scholar CLI
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. `<config_dir>/config.toml`
//! 3. environment (`SCHOLAR_*`, including values from a `.env` file)
//! 4. command-line flags, applied by the caller through the setters

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// CLI Configuration Constants
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

/// Covers document uploads up to the 10 MiB limit on slow links
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_NOTIFICATION_POLL_SECS: u64 = 30;

pub const DEFAULT_AUTOSAVE_SECS: u64 = 60;

const CONFIG_FILE_NAME: &str = "config.toml";
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub server_url: String,

    /// Holds `config.toml` and the stored session
    pub config_dir: PathBuf,

    pub api_timeout_secs: u64,

    pub notification_poll_secs: u64,

    pub autosave_secs: u64,

    #[serde(default)]
    pub verbose: bool,
}

/// Shape of `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    server_url: Option<String>,
    api_timeout_secs: Option<u64>,
    notification_poll_secs: Option<u64>,
    autosave_secs: Option<u64>,
}

impl Config {
    /// Defaults only
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine the config directory"))?
            .join("scholar");

        Ok(Self::with_config_dir(config_dir))
    }

    fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            config_dir,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            notification_poll_secs: DEFAULT_NOTIFICATION_POLL_SECS,
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
            verbose: false,
        }
    }

    /// Defaults, then `config.toml`, then the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::new()?;

        // The config dir itself can only come from the environment
        if let Ok(dir) = std::env::var("SCHOLAR_CONFIG_DIR") {
            config.config_dir = PathBuf::from(dir);
        }

        config.merge_file(&config.config_file())?;
        config.merge_env()?;
        Ok(config)
    }

    /// Defaults overridden by the environment, ignoring `config.toml`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new()?;
        config.merge_env()?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config file");

        if let Some(url) = file.server_url {
            self.server_url = url;
        }
        if let Some(secs) = file.api_timeout_secs {
            self.api_timeout_secs = secs;
        }
        if let Some(secs) = file.notification_poll_secs {
            self.notification_poll_secs = secs;
        }
        if let Some(secs) = file.autosave_secs {
            self.autosave_secs = secs;
        }
        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("SCHOLAR_SERVER_URL") {
            self.server_url = url;
        }
        if let Ok(dir) = std::env::var("SCHOLAR_CONFIG_DIR") {
            self.config_dir = PathBuf::from(dir);
        }
        if let Some(secs) = env_secs("SCHOLAR_API_TIMEOUT_SECS")? {
            self.api_timeout_secs = secs;
        }
        if let Some(secs) = env_secs("SCHOLAR_NOTIFICATION_POLL_SECS")? {
            self.notification_poll_secs = secs;
        }
        if let Some(secs) = env_secs("SCHOLAR_AUTOSAVE_SECS")? {
            self.autosave_secs = secs;
        }
        Ok(())
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join(SESSION_FILE_NAME)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn set_server_url(&mut self, url: String) {
        self.server_url = url;
    }

    pub fn set_config_dir(&mut self, dir: PathBuf) {
        self.config_dir = dir;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

fn env_secs(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CliError::config(format!("{} must be a whole number of seconds, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config_dir(PathBuf::from(".scholar")))
    }
}
