//! Configuration loading for dungeon-cli.
//!
//! Configuration is loaded from a TOML file (default: `dungeon-cli.toml` in
//! the platform config directory). Every field has a default, so a missing
//! default file is not an error.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dungeon_sync_client::{Identity, SyncConfig};
use dungeon_sync_types::AccountId;
use serde::Deserialize;

/// Root configuration for dungeon-cli.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Sequencer connection.
    pub node: NodeConfig,
    /// Polling behaviour.
    pub sync: PollConfig,
    /// Named accounts.
    pub accounts: AccountsConfig,
}

/// Sequencer connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Sequencer base URL (default: http://127.0.0.1:8080).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Timeout for every read and submission in milliseconds (default: 2000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Time between ticks in milliseconds (default: 500).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Named accounts to switch between.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsConfig {
    /// Alias used when `--account` is not given.
    #[serde(default)]
    pub default: Option<String>,
    /// Alias to account identifier.
    #[serde(default)]
    pub known: BTreeMap<String, String>,
}

// Default value functions
fn default_endpoint() -> String {
    dungeon_sync_client::DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// An account picked from the command line or the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAccount {
    /// Alias it was configured under, if any.
    pub alias: Option<String>,
    /// The account identifier.
    pub id: AccountId,
}

impl fmt::Display for NamedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} ({})", alias, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl Identity for NamedAccount {
    fn account_id(&self) -> AccountId {
        self.id.clone()
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load an explicit config file, or the default one if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::from_file(path)?);
        }
        match default_config_path() {
            Some(path) if path.exists() => Ok(Self::from_file(&path)?),
            _ => Ok(Self::default()),
        }
    }

    /// Library configuration, with an optional endpoint override.
    pub fn sync_config(&self, endpoint: Option<&str>) -> SyncConfig {
        SyncConfig::new(endpoint.unwrap_or(&self.node.endpoint))
            .with_poll_interval(Duration::from_millis(self.sync.poll_interval_ms))
            .with_request_timeout(Duration::from_millis(self.node.request_timeout_ms))
    }

    /// Resolve `--account` (an alias or a raw identifier), falling back to
    /// the configured default alias.
    pub fn resolve_account(&self, requested: Option<&str>) -> Result<NamedAccount> {
        let name = match requested.or(self.accounts.default.as_deref()) {
            Some(name) => name,
            None => anyhow::bail!(
                "no account selected: pass --account or set [accounts] default in the config"
            ),
        };

        if let Some(id) = self.accounts.known.get(name) {
            let id = AccountId::parse(id)
                .with_context(|| format!("account alias {:?} has an invalid identifier", name))?;
            return Ok(NamedAccount {
                alias: Some(name.to_string()),
                id,
            });
        }

        let id = AccountId::parse(name)
            .with_context(|| format!("{:?} is neither a known alias nor an account id", name))?;
        Ok(NamedAccount { alias: None, id })
    }
}

/// Platform default location of `dungeon-cli.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "dungeon-rollup", "dungeon-cli")
        .map(|dirs| dirs.config_dir().join("dungeon-cli.toml"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
