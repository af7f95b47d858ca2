//! Rtuscope Common Library
//!
//! This crate provides the types shared between the polling core and the
//! frontend:
//!
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`event`] - Poll events and the notification channel
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod event;

// Re-export commonly used types at the crate root
pub use config::{ConfigError, DeviceConfig, LogFormat, LoggingConfig, MonitorConfig};
pub use error::{Error, Result};
pub use event::{EventReceiver, EventSender, PollEvent, event_channel, format_registers};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use rtuscope_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Text,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Logging(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Logging(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
