use crate::persistence::{self, PersistenceError};
use crate::settings::QuoteSettings;
use std::env;
use std::fmt;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

pub const HTTP_ADDR_VAR: &str = "QUOTE_TOOL_HTTP_ADDR";
pub const LOG_VAR: &str = "QUOTE_TOOL_LOG";
pub const SETTINGS_VAR: &str = "QUOTE_TOOL_SETTINGS";

#[derive(Debug)]
pub enum ConfigError {
    InvalidAddr {
        value: String,
        source: AddrParseError,
    },
    Settings {
        path: PathBuf,
        source: PersistenceError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddr { value, .. } => {
                write!(f, "{HTTP_ADDR_VAR} '{value}' is not a valid socket address")
            }
            ConfigError::Settings { path, source } => {
                write!(f, "unable to load settings from {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidAddr { source, .. } => Some(source),
            ConfigError::Settings { source, .. } => Some(source),
        }
    }
}

/// Process-level configuration read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub log_filter: String,
    pub settings_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let addr = env::var(HTTP_ADDR_VAR).unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let http_addr = addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr.clone(),
                source,
            })?;
        let log_filter = env::var(LOG_VAR).unwrap_or_else(|_| "info".to_string());
        let settings_path = env::var(SETTINGS_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            http_addr,
            log_filter,
            settings_path,
        })
    }

    /// Settings from the configured file, or the defaults when none is set.
    pub fn quote_settings(&self) -> Result<QuoteSettings, ConfigError> {
        match &self.settings_path {
            Some(path) => persistence::load_settings_from_json(path).map_err(|source| {
                ConfigError::Settings {
                    path: path.clone(),
                    source,
                }
            }),
            None => Ok(QuoteSettings::default()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_filter: "info".to_string(),
            settings_path: None,
        }
    }
}
