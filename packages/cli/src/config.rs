// ABOUTME: Process configuration read from the environment
// ABOUTME: Listen address, content and upload directories, storage URL, and access settings

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::ParseIntError;
use std::path::PathBuf;

use bulletin_config::constants;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid host address: {0}")]
    InvalidHost(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub content_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub database_url: Option<String>,
    pub admin_key: Option<String>,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var(constants::BULLETIN_PORT).or_else(|| var(constants::PORT)) {
            Some(value) => value.parse::<u16>()?,
            None => constants::DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let host_value =
            var(constants::BULLETIN_HOST).unwrap_or_else(|| constants::DEFAULT_HOST.to_string());
        let host = host_value
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_value.clone()))?;

        let cookie_secure = match var(constants::BULLETIN_COOKIE_SECURE) {
            Some(value) => parse_flag(constants::BULLETIN_COOKIE_SECURE, &value)?,
            None => true,
        };

        Ok(Config {
            host,
            port,
            content_dir: var(constants::BULLETIN_CONTENT_DIR)
                .unwrap_or_else(|| constants::DEFAULT_CONTENT_DIR.to_string())
                .into(),
            upload_dir: var(constants::BULLETIN_UPLOAD_DIR)
                .unwrap_or_else(|| constants::DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            database_url: var(constants::DATABASE_URL).or_else(|| var(constants::POSTGRES_URL)),
            admin_key: var(constants::ACCESS_ADMIN_KEY),
            cookie_secure,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
