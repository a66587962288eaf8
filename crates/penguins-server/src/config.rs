//! Server configuration read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use penguins_model::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use penguins_store::{PoolConfig, RetryPolicy, DEFAULT_DATABASE_URL};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub model_path: String,
    pub scaler_path: String,
    pub bind_addr: String,
    pub pool: PoolConfig,
    pub retry: RetryPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            model_path: DEFAULT_MODEL_PATH.into(),
            scaler_path: DEFAULT_SCALER_PATH.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            pool: PoolConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);

        let pool = PoolConfig {
            pool_size: parse(&lookup, "DB_POOL_SIZE", defaults.pool.pool_size)?,
            max_overflow: parse(&lookup, "DB_MAX_OVERFLOW", defaults.pool.max_overflow)?,
            recycle: Duration::from_secs(parse(
                &lookup,
                "DB_POOL_RECYCLE_SECS",
                defaults.pool.recycle.as_secs(),
            )?),
            connect_timeout: Duration::from_secs(parse(
                &lookup,
                "DB_POOL_TIMEOUT_SECS",
                defaults.pool.connect_timeout.as_secs(),
            )?),
        };
        if pool.pool_size == 0 {
            return Err(invalid("DB_POOL_SIZE", "0", "must be at least 1"));
        }
        if pool.recycle.is_zero() {
            return Err(invalid("DB_POOL_RECYCLE_SECS", "0", "must be at least 1"));
        }
        if pool.connect_timeout.is_zero() {
            return Err(invalid("DB_POOL_TIMEOUT_SECS", "0", "must be at least 1"));
        }

        let retry = RetryPolicy {
            max_attempts: parse(&lookup, "DB_CONNECT_RETRIES", defaults.retry.max_attempts)?,
            delay: Duration::from_secs(parse(
                &lookup,
                "DB_CONNECT_DELAY_SECS",
                defaults.retry.delay.as_secs(),
            )?),
        };
        if retry.max_attempts == 0 {
            return Err(invalid("DB_CONNECT_RETRIES", "0", "must be at least 1"));
        }

        Ok(Self {
            database_url: text("DATABASE_URL", defaults.database_url),
            model_path: text("MODEL_PATH", defaults.model_path),
            scaler_path: text("SCALER_PATH", defaults.scaler_path),
            bind_addr: text("BIND_ADDR", defaults.bind_addr),
            pool,
            retry,
        })
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
