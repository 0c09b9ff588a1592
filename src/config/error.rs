//! Configuration errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("database pool_min exceeds pool_max")]
    InvalidPoolSize,

    #[error("database pool_max exceeds {max}")]
    PoolSizeTooLarge { max: u32 },

    #[error("outbound buffer must be between 1 and {max}")]
    InvalidOutboundBuffer { max: usize },
}
