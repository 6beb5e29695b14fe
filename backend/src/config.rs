//! Application configuration.
//!
//! Settings are read from an optional `artscope.toml` file and then
//! overridden by environment variables:
//!
//! - `HOST`, `PORT`: bind address
//! - `MEDIA_ROOT`: directory for uploads and generated QR codes
//! - `MAX_UPLOAD_BYTES`: request body limit
//! - `SESSION_TTL_SECS`: session lifetime
//! - `SESSION_COOKIE_SECURE`: mark the session cookie `Secure`
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [media]
//! root = "/var/lib/artscope/media"
//!
//! [session]
//! ttl_secs = 86400
//! cookie_secure = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::auth::{DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};

pub const CONFIG_FILE_NAME: &str = "artscope.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub media: MediaSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSettings {
    /// Directory uploaded files are written to
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL prefix the media directory is served under
    #[serde(default = "default_media_url")]
    pub url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_media_url() -> String {
    "/media/".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_cookie_name() -> String {
    "sessionid".to_string()
}

fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url: default_media_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
            cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings whose valid range is narrower than their type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid {
                field: "session.ttl_secs",
                reason: format!("must be at most {} seconds", MAX_SESSION_TTL_SECS),
            });
        }
        Ok(())
    }

    /// Load `artscope.toml` from the first standard location that has one.
    ///
    /// Searches the current directory, `backend/` and the parent directory.
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("backend").join(CONFIG_FILE_NAME),
            Path::new("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                tracing::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// File configuration (or defaults) with process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?.unwrap_or_default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", port)?;
        }
        if let Some(root) = lookup("MEDIA_ROOT") {
            self.media.root = PathBuf::from(root);
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.media.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", limit)?;
        }
        if let Some(ttl) = lookup("SESSION_TTL_SECS") {
            let secs: u64 = parse_env("SESSION_TTL_SECS", ttl.clone())?;
            if secs > MAX_SESSION_TTL_SECS {
                return Err(ConfigError::InvalidEnv {
                    name: "SESSION_TTL_SECS",
                    value: ttl,
                });
            }
            self.session.ttl_secs = secs;
        }
        if let Some(secure) = lookup("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = match secure.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "SESSION_COOKIE_SECURE",
                        value: secure,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
