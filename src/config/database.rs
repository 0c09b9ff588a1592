//! Persistence selection and PostgreSQL pool tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Largest pool the hub will open.
pub const MAX_POOL_SIZE: u32 = 100;

/// Where users, groups and messages live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence<'a> {
    /// Process-local store; nothing survives a restart.
    InMemory,
    /// PostgreSQL at the given URL.
    Postgres(&'a str),
}

impl Persistence<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Persistence::InMemory => "memory",
            Persistence::Postgres(_) => "postgres",
        }
    }
}

/// Database configuration
///
/// Leaving `url` unset (or blank) runs the hub on the in-memory store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_pool_min")]
    pub pool_min: u32,

    #[serde(default = "default_pool_max")]
    pub pool_max: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Seconds before an idle connection is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Seconds before any connection is recycled
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,

    /// Apply `migrations/` before serving
    #[serde(default)]
    pub migrate_on_start: bool,
}

impl DatabaseConfig {
    pub fn persistence(&self) -> Persistence<'_> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Persistence::Postgres(url),
            _ => Persistence::InMemory,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    /// Pool settings are only checked when PostgreSQL is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let Persistence::Postgres(url) = self.persistence() else {
            return Ok(());
        };
        if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool_min > self.pool_max {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.pool_max > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge { max: MAX_POOL_SIZE });
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_min: default_pool_min(),
            pool_max: default_pool_max(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            migrate_on_start: false,
        }
    }
}

fn default_pool_min() -> u32 {
    2
}

fn default_pool_max() -> u32 {
    16
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_max_lifetime() -> u64 {
    1800
}
