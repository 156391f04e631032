use std::env;
use std::net::SocketAddr;

use thiserror::Error;

// --- 常量 ---
const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
const ADDR_ENV_VAR: &str = "NOTES_ADDR";
const PUBLIC_URL_ENV_VAR: &str = "NOTES_PUBLIC_URL";

const DEFAULT_DATABASE_URL: &str = "sqlite://notes.db";
const DEFAULT_ADDR: &str = "0.0.0.0:5600";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    /// Prefix for every link the API emits; empty means root-relative links.
    pub public_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup(DATABASE_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let raw_addr = lookup(ADDR_ENV_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: ADDR_ENV_VAR,
            value: raw_addr.clone(),
        })?;

        let public_url = lookup(PUBLIC_URL_ENV_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_default();

        Ok(Config {
            database_url,
            addr,
            public_url,
        })
    }
}
