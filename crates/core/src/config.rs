//! Configuration management
//!
//! This module handles loading, saving, and migrating the cdeploy configuration file.
//! The configuration file is stored in TOML format at ~/.config/cdeploy/config.toml.
//!
//! Raising `SCHEMA_VERSION` needs a matching step in `ConfigManager::migrate`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::invalidation::BatchLimits;
use crate::site::Site;

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Cloud provider settings
    #[serde(default)]
    pub aws: AwsSettings,

    /// Invalidation batch limits
    #[serde(default)]
    pub invalidation: BatchLimits,

    /// Named deployment targets
    #[serde(default)]
    pub sites: Vec<Site>,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinner
    #[serde(default = "default_true")]
    pub progress: bool,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
        }
    }
}

/// Provider profile and region, handed explicitly to the SDK and sync tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    /// Named credentials profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Region for the bucket and the SDK clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl AwsSettings {
    /// Overlay explicitly given values on top of these settings
    pub fn merged(&self, profile: Option<String>, region: Option<String>) -> Self {
        Self {
            profile: profile.or_else(|| self.profile.clone()),
            region: region.or_else(|| self.region.clone()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            aws: AwsSettings::default(),
            invalidation: BatchLimits::default(),
            sites: Vec::new(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(Self::in_dir(config_dir.join("cdeploy")))
    }

    /// Create a ConfigManager for a specific config directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::with_path(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade cdeploy.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        if config.invalidation.warn_threshold > config.invalidation.max_paths {
            tracing::warn!(
                warn_threshold = config.invalidation.warn_threshold,
                max_paths = config.invalidation.max_paths,
                "advisory threshold is above the path ceiling and will never trigger"
            );
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;
        tracing::debug!(
            from = config.schema_version,
            to = SCHEMA_VERSION,
            "migrating configuration"
        );
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
