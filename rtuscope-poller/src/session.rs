//! Serial Modbus RTU session.

use std::time::Duration;

use async_trait::async_trait;
use tokio_modbus::client::{Client, Context, Reader};
use tokio_modbus::prelude::*;
use tracing::debug;

use rtuscope_common::DeviceConfig;

/// Error establishing a session.
///
/// Connect failures are fatal to a worker run: the worker reports them once
/// and exits without retrying.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid serial settings: {0}")]
    Settings(String),
    #[error("Serial open failed: {0}")]
    Open(String),
}

/// Error reading a register block.
///
/// Read failures are transient: the worker reports them per occurrence and
/// keeps polling.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Session is not connected")]
    NotConnected,
    #[error("Read failed: {0}")]
    Transport(String),
    #[error("Modbus exception: {0}")]
    Exception(String),
    #[error("Read timed out after {0} ms")]
    Timeout(u64),
    #[error("Short read: expected {expected} registers, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// A connection to a register-bearing device, as the poll worker sees it.
///
/// `open` must be called before `read_registers`; `close` is idempotent and
/// safe on a session that never opened. Implemented by [`ModbusSession`]
/// for real hardware and by scripted mocks in tests.
#[async_trait]
pub trait RegisterSession: Send {
    /// Allocate the transport and connect. Holds the serial handle on success.
    async fn open(&mut self) -> Result<(), ConnectError>;

    /// Read exactly `quantity` holding registers starting at `start`.
    ///
    /// Any other count, including a partial result, is a [`ReadError`].
    async fn read_registers(&mut self, start: u16, quantity: u16) -> Result<Vec<u16>, ReadError>;

    /// Release the transport. No-op if already closed or never opened.
    async fn close(&mut self);
}

/// Modbus RTU session over a serial port.
///
/// The context is either `None` (not connected) or live; a closed handle is
/// never left reachable for I/O.
pub struct ModbusSession {
    device: DeviceConfig,
    ctx: Option<Context>,
}

impl ModbusSession {
    /// Create a session for a device. Does not touch the port until `open`.
    pub fn new(device: DeviceConfig) -> Self {
        Self { device, ctx: None }
    }

    /// Whether the serial handle is currently held.
    pub fn is_open(&self) -> bool {
        self.ctx.is_some()
    }

    fn serial_builder(&self) -> Result<tokio_serial::SerialPortBuilder, ConnectError> {
        let parity = match self.device.parity.to_lowercase().as_str() {
            "none" => tokio_serial::Parity::None,
            "even" => tokio_serial::Parity::Even,
            "odd" => tokio_serial::Parity::Odd,
            other => {
                return Err(ConnectError::Settings(format!("invalid parity '{}'", other)));
            }
        };

        let stop_bits = match self.device.stop_bits {
            1 => tokio_serial::StopBits::One,
            2 => tokio_serial::StopBits::Two,
            other => {
                return Err(ConnectError::Settings(format!(
                    "invalid stop bits {}",
                    other
                )));
            }
        };

        let data_bits = match self.device.data_bits {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            8 => tokio_serial::DataBits::Eight,
            other => {
                return Err(ConnectError::Settings(format!(
                    "invalid data bits {}",
                    other
                )));
            }
        };

        Ok(tokio_serial::new(&self.device.port, self.device.baud_rate)
            .parity(parity)
            .stop_bits(stop_bits)
            .data_bits(data_bits))
    }
}

#[async_trait]
impl RegisterSession for ModbusSession {
    async fn open(&mut self) -> Result<(), ConnectError> {
        if self.ctx.is_some() {
            return Ok(());
        }

        let builder = self.serial_builder()?;
        let serial = tokio_serial::SerialStream::open(&builder)
            .map_err(|e| ConnectError::Open(format!("{}: {}", self.device.port, e)))?;

        let ctx = rtu::attach_slave(serial, Slave(self.device.slave_id));
        debug!(
            port = %self.device.port,
            slave = self.device.slave_id,
            "serial session opened"
        );
        self.ctx = Some(ctx);
        Ok(())
    }

    async fn read_registers(&mut self, start: u16, quantity: u16) -> Result<Vec<u16>, ReadError> {
        let timeout_ms = self.device.timeout_ms;
        let ctx = self.ctx.as_mut().ok_or(ReadError::NotConnected)?;

        let registers = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            ctx.read_holding_registers(start, quantity),
        )
        .await
        .map_err(|_| ReadError::Timeout(timeout_ms))?
        .map_err(|e| ReadError::Transport(e.to_string()))?
        .map_err(|e| ReadError::Exception(format!("{:?}", e)))?;

        if registers.len() != quantity as usize {
            return Err(ReadError::ShortRead {
                expected: quantity as usize,
                actual: registers.len(),
            });
        }

        Ok(registers)
    }

    async fn close(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            if let Err(e) = ctx.disconnect().await {
                debug!(error = %e, "disconnect failed");
            }
            debug!(port = %self.device.port, "serial session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> DeviceConfig {
        DeviceConfig {
            port: "/dev/rtuscope-no-such-port".to_string(),
            ..DeviceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_missing_port_is_connect_error() {
        let mut session = ModbusSession::new(test_device());
        let err = session.open().await.unwrap_err();

        assert!(matches!(err, ConnectError::Open(_)));
        assert!(!err.to_string().is_empty());
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_open_rejects_bad_parity() {
        let mut device = test_device();
        device.parity = "mark".to_string();

        let mut session = ModbusSession::new(device);
        let err = session.open().await.unwrap_err();

        assert!(matches!(err, ConnectError::Settings(_)));
    }

    #[tokio::test]
    async fn test_read_before_open_fails() {
        let mut session = ModbusSession::new(test_device());
        let err = session.read_registers(301, 100).await.unwrap_err();

        assert!(matches!(err, ReadError::NotConnected));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut session = ModbusSession::new(test_device());
        session.close().await;
        session.close().await;
        assert!(!session.is_open());
    }

    #[test]
    fn test_short_read_diagnostic_names_counts() {
        let err = ReadError::ShortRead {
            expected: 100,
            actual: 50,
        };
        let text = err.to_string();
        assert!(text.contains("100"));
        assert!(text.contains("50"));
    }
}
