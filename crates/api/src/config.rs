use std::time::Duration;

use warden_db::BootstrapConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Read once at startup and passed down by value; nothing re-reads the
/// environment afterwards.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Token signing secret and lifetime.
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
}

/// Connection parameters and bootstrap retry budget for PostgreSQL.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub bootstrap: BootstrapConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// See [`JwtConfig::from_env`] and [`DatabaseConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            database: DatabaseConfig::from_env(),
        }
    }
}

impl DatabaseConfig {
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `DATABASE_URL`          | **yes**  | --      |
    /// | `DB_MAX_CONNECTIONS`    | no       | `20`    |
    /// | `DB_CONNECT_ATTEMPTS`   | no       | `5`     |
    /// | `DB_CONNECT_DELAY_SECS` | no       | `5`     |
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let defaults = BootstrapConfig::default();

        let max_attempts: u32 = std::env::var("DB_CONNECT_ATTEMPTS")
            .map(|v| v.parse().expect("DB_CONNECT_ATTEMPTS must be a valid u32"))
            .unwrap_or(defaults.max_attempts);

        let delay = std::env::var("DB_CONNECT_DELAY_SECS")
            .map(|v| {
                Duration::from_secs(v.parse().expect("DB_CONNECT_DELAY_SECS must be a valid u64"))
            })
            .unwrap_or(defaults.delay);

        Self {
            url,
            max_connections,
            bootstrap: BootstrapConfig {
                max_attempts,
                delay,
            },
        }
    }
}
