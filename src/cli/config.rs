//! Configuration file
//!
//! Optional JSON file passed with `--config`. Every field has a default, so
//! an empty object (or no file at all) is valid.
//!
//! Precedence: flags, then environment, then file, then defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backup::{BackupConfig, MAX_BACKUP_COUNT};
use crate::store::DEFAULT_PREFIX;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Store servers as host:port
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Session timeout in seconds (default 10)
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    /// Backup directory (default ~/.nodeguard/backup, BACKUP_DIR wins)
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Backups kept before the oldest are pruned (default 100)
    #[serde(default = "default_max_backup_count")]
    pub max_backup_count: usize,

    /// Prefix of the per-service root node
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,
}

fn default_servers() -> Vec<String> {
    vec!["localhost:2181".to_string()]
}
fn default_session_timeout_secs() -> u64 {
    10
}
fn default_max_backup_count() -> usize {
    MAX_BACKUP_COUNT
}
fn default_namespace_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            session_timeout_secs: default_session_timeout_secs(),
            backup_dir: None,
            max_backup_count: default_max_backup_count(),
            namespace_prefix: default_namespace_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides
    pub fn apply_flags(&mut self, servers: &[String]) {
        if !servers.is_empty() {
            self.servers = servers.to_vec();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.servers.is_empty() || self.servers.iter().any(|s| s.trim().is_empty()) {
            return Err(CliError::config_error("servers must list at least one host:port"));
        }

        if self.session_timeout_secs == 0 {
            return Err(CliError::config_error("session_timeout_secs must be > 0"));
        }

        if self.max_backup_count == 0 {
            return Err(CliError::config_error("max_backup_count must be > 0"));
        }

        if self.namespace_prefix.is_empty() || self.namespace_prefix.contains('/') {
            return Err(CliError::config_error(format!(
                "Invalid namespace_prefix: '{}'. Must be non-empty and contain no '/'.",
                self.namespace_prefix
            )));
        }

        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    /// Backup settings, with `BACKUP_DIR` taking precedence over the file
    pub fn backup_config(&self) -> BackupConfig {
        let mut config = BackupConfig {
            dir_override: self.backup_dir.clone(),
            max_count: self.max_backup_count,
        };
        config.apply_env();
        config
    }
}
