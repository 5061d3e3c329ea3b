//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

use lumina_core::progress::DEFAULT_PAGES_PER_DAY;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Directory holding one JSON document per storage key.
    pub data_dir: PathBuf,
    pub log_level: Level,
    /// Pages per day assumed by time-left estimates.
    pub reading_pace: u32,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let reading_pace = match std::env::var("READING_PACE") {
            Ok(raw) => parse_reading_pace(&raw)?,
            Err(_) => DEFAULT_PAGES_PER_DAY,
        };

        let allowed_origin = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            data_dir,
            log_level,
            reading_pace,
            allowed_origin,
        })
    }
}

fn parse_reading_pace(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(pace) if pace > 0 => Ok(pace),
        _ => Err(ConfigError::InvalidValue(
            "READING_PACE".to_string(),
            format!("'{}' is not a positive number of pages", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_pace_must_be_positive() {
        assert_eq!(parse_reading_pace(" 45 ").unwrap(), 45);
        assert!(parse_reading_pace("0").is_err());
        let err = parse_reading_pace("fast").unwrap_err();
        assert!(matches!(&err, ConfigError::InvalidValue(var, _) if var == "READING_PACE"));
        assert!(err.to_string().contains("'fast' is not a positive number"));
    }
}
