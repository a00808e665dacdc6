//! Process configuration.
//!
//! The LMS credentials come from the environment and are mandatory: a
//! dashboard without them cannot serve a single request, so loading fails
//! before any socket is bound. Server settings may additionally come from a
//! TOML file, with environment values taking precedence.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const API_URL_VAR: &str = "CANVAS_API_URL";
pub const API_TOKEN_VAR: &str = "CANVAS_API_TOKEN";
pub const ADDR_VAR: &str = "DASHBOARD_ADDR";
pub const TLS_CERT_VAR: &str = "DASHBOARD_TLS_CERT";
pub const TLS_KEY_VAR: &str = "DASHBOARD_TLS_KEY";
pub const CONFIG_FILE_VAR: &str = "DASHBOARD_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";
const DEFAULT_ADDR: &str = "0.0.0.0:9090";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Canvas API credentials not configured: {0} is not set")]
    MissingVar(&'static str),

    #[error("Invalid bind address '{addr}': {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("Canvas API token is not a valid header value")]
    InvalidToken,

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("TLS needs both a certificate and a private key")]
    IncompleteTls,

    #[error("Could not read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Credentials for the upstream LMS.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Base URL without the `/api/v1` prefix and without a trailing slash.
    pub api_url: String,
    pub api_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub addr: SocketAddr,
    pub tls: Option<TlsConfig>,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: ServerSection,
    tls: TlsSection,
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    addr: Option<String>,
    cors_origins: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TlsSection {
    cert: Option<PathBuf>,
    key: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogSection {
    level: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment and the optional config file.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let path = PathBuf::from(
            lookup(CONFIG_FILE_VAR).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
        );
        let contents = read_optional(&path)?;

        Self::from_sources(lookup, contents.as_deref(), &path)
    }

    /// Builds configuration from a variable lookup layered over optional TOML contents.
    ///
    /// `origin` only labels parse errors.
    pub fn from_sources<F>(
        lookup: F,
        toml_str: Option<&str>,
        origin: &Path,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match toml_str {
            Some(content) => {
                toml::from_str::<FileConfig>(content).map_err(|source| ConfigError::ParseFile {
                    path: origin.to_path_buf(),
                    source,
                })?
            }
            None => FileConfig::default(),
        };

        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_blank(API_URL_VAR).ok_or(ConfigError::MissingVar(API_URL_VAR))?;
        let api_token = non_blank(API_TOKEN_VAR).ok_or(ConfigError::MissingVar(API_TOKEN_VAR))?;

        let addr = non_blank(ADDR_VAR)
            .or(file.server.addr)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr { addr, source })?;

        let cert = non_blank(TLS_CERT_VAR).map(PathBuf::from).or(file.tls.cert);
        let key = non_blank(TLS_KEY_VAR).map(PathBuf::from).or(file.tls.key);
        let tls = match (cert, key) {
            (Some(cert), Some(key)) => Some(TlsConfig { cert, key }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Self {
            canvas: CanvasConfig {
                api_url: api_url.trim().trim_end_matches('/').to_string(),
                api_token: api_token.trim().to_string(),
            },
            addr,
            tls,
            cors_origins: file.server.cors_origins,
            log_level: file
                .log
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Reads the config file, or `None` when it does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
}
