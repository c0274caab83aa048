//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid, or the
//! application exits with a clear error message before binding a socket.

use std::env;

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {name}: {message}")]
    Invalid {
        name: &'static str,
        message: String,
    },
}

/// Runtime configuration for the authorization API server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,

    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Log filter directive (`RUST_LOG`).
    pub rust_log: String,

    /// Maximum database connections in the pool.
    pub max_db_connections: u32,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                message: e.to_string(),
            })?,
            Err(_) => 8080,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let max_db_connections = match env::var("MAX_DB_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "MAX_DB_CONNECTIONS",
                message: e.to_string(),
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            database_url,
            host,
            port,
            rust_log,
            max_db_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_reported_by_name() {
        let err = ConfigError::Missing("DATABASE_URL");
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_is_reported_with_reason() {
        let err = ConfigError::Invalid {
            name: "PORT",
            message: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().contains("PORT"));
    }
}
