use thiserror::Error;

use crate::config::ConfigError;

/// Common error type for rtuscope components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using rtuscope's Error.
pub type Result<T> = std::result::Result<T, Error>;
