//! Configuration management for the checklist binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Where todos are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    /// Process memory, lost on exit
    Memory,
    /// SQLite database at `database_url`
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("expected `memory` or `sqlite`, got `{other}`")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage engine (`CHECKLIST_STORAGE`, default `sqlite`)
    pub storage: StorageKind,
    /// `SQLite` connection URL (`CHECKLIST_DATABASE_URL`)
    pub database_url: String,
    /// Maximum pool connections (`CHECKLIST_MAX_CONNECTIONS`, default 1)
    pub max_connections: u32,
    /// Seconds to wait for running effects on exit (`CHECKLIST_SHUTDOWN_TIMEOUT`, default 5)
    pub shutdown_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKind::Sqlite,
            database_url: "sqlite://checklist.db?mode=rwc".to_string(),
            max_connections: 1,
            shutdown_timeout_secs: 5,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to a value that
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to a value that
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            storage: parse_var(&lookup, "CHECKLIST_STORAGE")?.unwrap_or(defaults.storage),
            database_url: lookup("CHECKLIST_DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_var(&lookup, "CHECKLIST_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            shutdown_timeout_secs: parse_var(&lookup, "CHECKLIST_SHUTDOWN_TIMEOUT")?
                .unwrap_or(defaults.shutdown_timeout_secs),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }

    /// Shutdown timeout as a `Duration`
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
}
