//! Environment-driven service configuration.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::suggest::DEFAULT_MAX_SUGGESTIONS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    pub port: u16,

    /// Secret used to sign bearer tokens.
    pub token_secret: String,

    pub token_ttl_hours: i64,

    /// How often the whole population's suggestion records are recomputed.
    pub refresh_interval_secs: u64,

    /// Cap on stored and returned suggestion candidates.
    pub max_suggestions: usize,

    /// Buffer size of the in-process event bus.
    pub event_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let refresh_interval_secs = parse_or("SUGGEST_REFRESH_INTERVAL_SECS", 3600)?;
        if refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid("SUGGEST_REFRESH_INTERVAL_SECS"));
        }

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            port: parse_or("PORT", 4000)?,
            token_secret: require("TOKEN_SECRET")?,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24)?,
            refresh_interval_secs,
            max_suggestions: parse_or("MAX_SUGGEST_USERS", DEFAULT_MAX_SUGGESTIONS)?,
            event_capacity: parse_or("EVENT_BUS_CAPACITY", 256)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}
