//! TOML configuration for the chat client.
//!
//! The file is looked up at an explicit `--config` path, or else at the
//! platform-appropriate location:
//! - Windows:  `%APPDATA%\DevChat\config.toml`
//! - Linux:    `~/.config/devchat/config.toml`
//! - macOS:    `~/Library/Application Support/DevChat/config.toml`
//!
//! ```toml
//! [server]
//! ws_url = "wss://backend-web-chat-app.onrender.com/"
//! roster_url = "https://backend-web-chat-app.onrender.com/api/connected-users"
//! roster_timeout_secs = 10
//!
//! [client]
//! username = "bobby"
//! log_level = "info"
//! ```
//!
//! Every field is optional.  A missing file is not an error: the defaults
//! above are used instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

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

    /// An endpoint URL has the wrong scheme.
    #[error("invalid {field}: '{url}' must start with {expected}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        expected: &'static str,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientSettings,
}

/// Where the chat server lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// WebSocket endpoint of the room.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// One-shot roster query endpoint.
    #[serde(default = "default_roster_url")]
    pub roster_url: String,
    /// Timeout for the roster query only.  The room connection has none.
    #[serde(default = "default_roster_timeout_secs")]
    pub roster_timeout_secs: u64,
}

/// Local user preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    /// Pre-filled username candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_ws_url() -> String {
    "wss://backend-web-chat-app.onrender.com/".to_string()
}
fn default_roster_url() -> String {
    "https://backend-web-chat-app.onrender.com/api/connected-users".to_string()
}
fn default_roster_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            roster_url: default_roster_url(),
            roster_timeout_secs: default_roster_timeout_secs(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            username: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn roster_timeout(&self) -> Duration {
        Duration::from_secs(self.roster_timeout_secs)
    }
}

impl ClientConfig {
    /// Checks that both endpoints use a scheme the client can speak.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server.ws_url.starts_with("ws://") || self.server.ws_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl {
                field: "ws_url",
                url: self.server.ws_url.clone(),
                expected: "ws:// or wss://",
            });
        }
        if !(self.server.roster_url.starts_with("http://")
            || self.server.roster_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl {
                field: "roster_url",
                url: self.server.roster_url.clone(),
                expected: "http:// or https://",
            });
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path for this platform.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, or the platform default path when `None`.
///
/// A file that does not exist yields [`ClientConfig::default()`].
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Parses config TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("DevChat"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("devchat"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("DevChat")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
