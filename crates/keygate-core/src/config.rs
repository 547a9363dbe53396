//! Configuration management for Keygate.
//!
//! Loads configuration from ${KEYGATE_HOME}/config.toml with sensible defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Environment variable that overrides `firebase.api_key`.
pub const FIREBASE_API_KEY_ENV: &str = "KEYGATE_FIREBASE_API_KEY";

/// Firebase Identity Toolkit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Web API key of the Firebase project.
    pub api_key: Option<String>,
    /// Identity Toolkit base URL (overridable for emulators).
    pub base_url: String,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u64,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: FirebaseConfig::DEFAULT_BASE_URL.to_string(),
            timeout_secs: FirebaseConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FirebaseConfig {
    pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Returns the API key, preferring the environment over the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(FIREBASE_API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// In-memory provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Simulated latency per call in milliseconds.
    pub latency_ms: u64,
    /// Accounts present at startup (`email = "password"`).
    pub accounts: BTreeMap<String, String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            latency_ms: 250,
            accounts: BTreeMap::new(),
        }
    }
}

impl MemoryConfig {
    pub fn latency(&self) -> Option<Duration> {
        (self.latency_ms > 0).then(|| Duration::from_millis(self.latency_ms))
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity provider backing the screen.
    pub provider: ProviderKind,

    /// Log filter used when `KEYGATE_LOG` is unset.
    pub log_level: String,

    /// Firebase provider configuration.
    pub firebase: FirebaseConfig,

    /// Memory provider configuration.
    pub memory: MemoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            log_level: Config::DEFAULT_LOG_LEVEL.to_string(),
            firebase: FirebaseConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Keygate configuration and data directories.
    //!
    //! KEYGATE_HOME resolution order:
    //! 1. KEYGATE_HOME environment variable (if set)
    //! 2. ~/.config/keygate (default)
    //! 3. ./.keygate when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Keygate home directory.
    pub fn keygate_home() -> PathBuf {
        if let Ok(home) = std::env::var("KEYGATE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".keygate"),
            |h| h.join(".config").join("keygate"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        keygate_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        keygate_home().join("logs")
    }
}
