//! TOML configuration for the input client.
//!
//! ```toml
//! [connection]
//! url = "ws://127.0.0.1:3390"
//! keyboard_layout = "en"
//!
//! [reconnect]
//! auto_reconnect = false
//! max_reconnect_attempts = 3
//! base_reconnect_delay_ms = 1000
//! cap_reconnect_delay_ms = 10000
//!
//! [logging]
//! log_level = "info"
//! ```
//!
//! Every field has a `#[serde(default = "...")]` helper, so a partial file
//! (or an empty one) is valid and missing values take the defaults above.
//! Command-line flags are applied on top of whatever is loaded here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rdp_input_core::{KeyboardLayout, ReconnectPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to connect and how the session is announced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// WebSocket URL of the gateway in front of the RDP host.
    #[serde(default = "default_url")]
    pub url: String,
    /// Short language tag (`en`, `fr`, `de`, `es`, `it`, `pt`, `zh`, `ja`,
    /// `ko`).  Unknown tags fall back to `en`.
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
}

/// Reconnect backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub auto_reconnect: bool,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_base_reconnect_delay_ms")]
    pub base_reconnect_delay_ms: u64,
    #[serde(default = "default_cap_reconnect_delay_ms")]
    pub cap_reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_url() -> String {
    "ws://127.0.0.1:3390".to_string()
}
fn default_keyboard_layout() -> String {
    KeyboardLayout::default().tag().to_string()
}
fn default_max_reconnect_attempts() -> u32 {
    rdp_input_core::domain::reconnect::DEFAULT_MAX_RECONNECT_ATTEMPTS
}
fn default_base_reconnect_delay_ms() -> u64 {
    1_000
}
fn default_cap_reconnect_delay_ms() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            keyboard_layout: default_keyboard_layout(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: false,
            max_reconnect_attempts: default_max_reconnect_attempts(),
            base_reconnect_delay_ms: default_base_reconnect_delay_ms(),
            cap_reconnect_delay_ms: default_cap_reconnect_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ── Derived values ────────────────────────────────────────────────────────────

impl ConnectionConfig {
    pub fn layout(&self) -> KeyboardLayout {
        KeyboardLayout::from_tag(&self.keyboard_layout)
    }
}

impl ReconnectConfig {
    /// Builds the backoff policy used by the connection supervisor.
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            auto_reconnect: self.auto_reconnect,
            max_attempts: self.max_reconnect_attempts,
            base_delay: Duration::from_millis(self.base_reconnect_delay_ms),
            cap_delay: Duration::from_millis(self.cap_reconnect_delay_ms),
        }
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read (including when
    /// it does not exist) and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Like [`ClientConfig::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Writes the config to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system failures or
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
