//! Configuration for the register monitor.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// The device to poll
    #[serde(default)]
    pub device: DeviceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the polled Modbus RTU device.
///
/// Defaults match the fixed station this tool was written for: a slave at
/// address 1 on COM8, 9600 8N1, exposing a block of 100 holding registers
/// starting at address 301.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM8")
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate (default: 9600)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Data bits (default: 8)
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,

    /// Parity: "none", "even", or "odd" (default: "none")
    #[serde(default = "default_parity")]
    pub parity: String,

    /// Stop bits: 1 or 2 (default: 1)
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,

    /// Modbus slave/unit ID (1-247)
    #[serde(default = "default_slave_id")]
    pub slave_id: u8,

    /// First holding register to read
    #[serde(default = "default_start_address")]
    pub start_address: u16,

    /// Number of registers per read (1-125)
    #[serde(default = "default_quantity")]
    pub quantity: u16,

    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> String {
    "COM8".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_parity() -> String {
    "none".to_string()
}

fn default_stop_bits() -> u8 {
    1
}

fn default_slave_id() -> u8 {
    1
}

fn default_start_address() -> u16 {
    301
}

fn default_quantity() -> u16 {
    100
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    1000
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: default_parity(),
            stop_bits: default_stop_bits(),
            slave_id: default_slave_id(),
            start_address: default_start_address(),
            quantity: default_quantity(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json"
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device.validate()
    }
}

impl DeviceConfig {
    /// Validate the device settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.is_empty() {
            return Err(ConfigError::Validation(
                "Serial port cannot be empty".to_string(),
            ));
        }

        if self.slave_id == 0 {
            return Err(ConfigError::Validation(
                "slave_id must be 1-247".to_string(),
            ));
        }
        if self.slave_id > 247 {
            return Err(ConfigError::Validation(format!(
                "slave_id {} out of range 1-247",
                self.slave_id
            )));
        }

        // Modbus caps a single read-holding-registers request at 125 registers
        if self.quantity == 0 || self.quantity > 125 {
            return Err(ConfigError::Validation(format!(
                "quantity {} out of range 1-125",
                self.quantity
            )));
        }

        if u32::from(self.start_address) + u32::from(self.quantity) > 0x1_0000 {
            return Err(ConfigError::Validation(format!(
                "register range {}..{} exceeds the 16-bit address space",
                self.start_address,
                u32::from(self.start_address) + u32::from(self.quantity)
            )));
        }

        match self.parity.to_lowercase().as_str() {
            "none" | "even" | "odd" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "invalid parity '{}' (use none, even, or odd)",
                    other
                )));
            }
        }

        if !matches!(self.stop_bits, 1 | 2) {
            return Err(ConfigError::Validation(format!(
                "invalid stop_bits {} (use 1 or 2)",
                self.stop_bits
            )));
        }

        if !matches!(self.data_bits, 5..=8) {
            return Err(ConfigError::Validation(format!(
                "invalid data_bits {} (use 5-8)",
                self.data_bits
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
