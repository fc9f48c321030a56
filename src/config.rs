//! Runtime configuration
//!
//! Read once at startup from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DATABASE_PATH_VAR: &str = "HOSPITAL_DB_PATH";
pub const LISTEN_ADDR_VAR: &str = "HOSPITAL_DASHBOARD_ADDR";
pub const ERROR_DETAIL_VAR: &str = "HOSPITAL_DASHBOARD_ERROR_DETAIL";

const DEFAULT_DATABASE_PATH: &str = "hospital_ama.db";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid listen address '{value}': {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub database_path: PathBuf,
    pub listen_addr: SocketAddr,
    /// Append the SQLite diagnostic to section error messages
    pub show_error_detail: bool,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let addr_value = lookup(LISTEN_ADDR_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        let show_error_detail = lookup(ERROR_DETAIL_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            database_path,
            listen_addr,
            show_error_detail,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
