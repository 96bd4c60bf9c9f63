//! TOML configuration for the demo binary.
//!
//! Reads an `AppConfig` from a caller-supplied path (default `monome.toml`
//! next to the working directory). A missing file is not an error: every
//! field has a default, so the binary runs out of the box against a local
//! device on the stock serialosc port.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file. A config file
//! therefore only needs to spell out what differs from the defaults:
//!
//! ```toml
//! [device]
//! name = "m128-302"
//! port = 17421
//!
//! [session]
//! prefix = "/app"
//! ```

use std::path::{Path, PathBuf};

use monome_core::{DeviceEndpoint, HostCheck, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::session::SessionConfig;

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
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration for the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

/// Which device to dial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Device name, used for resolution and logging.
    #[serde(default = "default_device_name")]
    pub name: String,
    /// Host the device listens on.
    #[serde(default = "default_host")]
    pub host: String,
    /// UDP port the device listens on.
    #[serde(default = "default_device_port")]
    pub port: u16,
}

/// Session parameters announced to the device at bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// UDP port this application listens on. `0` selects an ephemeral port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// OSC address prefix for device events and commands.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Host string announced to the device.
    #[serde(default = "default_host")]
    pub host: String,
    /// Whether focus tracking compares device-reported host strings.
    #[serde(default)]
    pub strict_host_check: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device_name() -> String {
    "monome".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_device_port() -> u16 {
    13188
}
fn default_listen_port() -> u16 {
    8000
}
fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            session: SessionSettings::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            host: default_host(),
            port: default_device_port(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            prefix: default_prefix(),
            host: default_host(),
            strict_host_check: false,
            log_level: default_log_level(),
        }
    }
}

impl DeviceConfig {
    /// The endpoint this config describes.
    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl SessionSettings {
    /// Converts the settings into the session bootstrap parameters.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            listen_port: self.listen_port,
            prefix: self.prefix.clone(),
            host: self.host.clone(),
            host_check: if self.strict_host_check {
                HostCheck::Enabled
            } else {
                HostCheck::Disabled
            },
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
