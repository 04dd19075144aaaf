//! Queue configuration
//!
//! Capacities for the three pipeline queue kinds and the best-effort send
//! wait used by auto-draining queues. Loaded from TOML; every field is
//! optional and falls back to its default.
//!
//! ```toml
//! outbound_capacity = 1024
//! inbound_capacity = 1024
//! handshake_capacity = 1024
//! autodrain_send_timeout_ms = 10
//! ```

use crate::core::error_handling::ContextualError;
use crate::queue::pipeline::QueueKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_AUTODRAIN_SEND_TIMEOUT_MS: u64 = 10;

/// File name looked up under the user's config directory
pub const DEFAULT_CONFIG_FILE: &str = "queues.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message, .. } | ConfigError::Invalid { message, .. } => {
                Some(message.as_str())
            }
            ConfigError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub outbound_capacity: usize,
    pub inbound_capacity: usize,
    pub handshake_capacity: usize,
    /// Zero makes auto-draining sends strictly non-blocking
    pub autodrain_send_timeout_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_QUEUE_CAPACITY,
            inbound_capacity: DEFAULT_QUEUE_CAPACITY,
            handshake_capacity: DEFAULT_QUEUE_CAPACITY,
            autodrain_send_timeout_ms: DEFAULT_AUTODRAIN_SEND_TIMEOUT_MS,
        }
    }
}

impl QueueConfig {
    /// Capacity configured for a queue kind
    pub fn capacity(&self, kind: QueueKind) -> usize {
        match kind {
            QueueKind::Outbound => self.outbound_capacity,
            QueueKind::Inbound => self.inbound_capacity,
            QueueKind::Handshake => self.handshake_capacity,
        }
    }

    pub fn autodrain_send_timeout(&self) -> Duration {
        Duration::from_millis(self.autodrain_send_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacities = [
            ("outbound_capacity", self.outbound_capacity),
            ("inbound_capacity", self.inbound_capacity),
            ("handshake_capacity", self.handshake_capacity),
        ];
        for (field, value) in capacities {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("{} must be greater than zero", field),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    /// Load and validate a TOML file
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&contents, path)
    }

    /// Load the given file, or the default config file if it exists,
    /// otherwise fall back to defaults
    pub async fn load_or_default(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_fallback(config_file, default_config_path().as_deref()).await
    }

    /// Load `config_file` if given, else `fallback` when that file exists
    pub async fn load_with_fallback(
        config_file: Option<&Path>,
        fallback: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        match (config_file, fallback) {
            (Some(path), _) => Self::load(path).await,
            (None, Some(path)) if path.exists() => {
                log::debug!("Loading queue configuration from {}", path.display());
                Self::load(path).await
            }
            _ => Ok(Self::default()),
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Default configuration path under the user's config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunnelq").join(DEFAULT_CONFIG_FILE))
}
