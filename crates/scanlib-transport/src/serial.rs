//! Serial port transport for the scanner's USB virtual COM port.
//!
//! The SDS-series scanners enumerate as a CDC-ACM device and speak the
//! control protocol at 115200 baud, 8 data bits, no parity, one stop bit.
//! Commands and simple replies are `\r`-terminated ASCII; status replies are
//! multi-line XML streamed a line at a time.

use async_trait::async_trait;
use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

/// Baud rate the scanner's USB port runs at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial port configuration. Defaults to 115200 8N1, no flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

/// Byte-stream transport over the scanner's serial port.
pub struct SerialTransport {
    port: Option<SerialStream>,
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port at `baud_rate`, 8N1.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let config = SerialConfig {
            baud_rate,
            ..Default::default()
        };
        Self::open_with_config(port, config).await
    }

    /// Open a serial port with full configuration control.
    pub async fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = ?config.parity,
            "Opening scanner serial port"
        );

        let mut stream = tokio_serial::new(port, config.baud_rate)
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(config.parity.into())
            .flow_control(config.flow_control.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("failed to open serial port {port}: {e}"))
            })?;

        // Leave the modem lines idle; the scanner ignores them.
        if let Err(e) = stream.write_data_terminal_ready(false) {
            tracing::warn!(port = %port, error = %e, "Failed to clear DTR");
        }

        tracing::info!(port = %port, baud_rate = config.baud_rate, "Serial port opened");

        Ok(Self {
            port: Some(stream),
            port_name: port.to_string(),
        })
    }

    /// Name of the underlying serial device.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::UnexpectedEof => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            bytes = data.len(),
            text = %String::from_utf8_lossy(data).escape_debug(),
            "Writing"
        );

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Serial write failed");
            map_io_error(e)
        })?;
        port.flush().await.map_err(map_io_error)?;

        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            // A zero-length read on a serial stream means the device vanished.
            Ok(Ok(0)) => {
                tracing::warn!(port = %self.port_name, "Serial port returned EOF");
                Err(Error::ConnectionLost)
            }
            Ok(Ok(n)) => {
                tracing::trace!(
                    port = %self.port_name,
                    bytes = n,
                    text = %String::from_utf8_lossy(&buf[..n]).escape_debug(),
                    "Read"
                );
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "Serial read failed");
                Err(map_io_error(e))
            }
            Err(_) => Err(Error::Timeout),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "Flush before close failed");
            }
            tracing::info!(port = %self.port_name, "Serial port closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_115200_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.flow_control, FlowControl::None);
    }

    #[test]
    fn setting_conversions() {
        assert_eq!(
            tokio_serial::DataBits::from(DataBits::Seven),
            tokio_serial::DataBits::Seven
        );
        assert_eq!(
            tokio_serial::StopBits::from(StopBits::Two),
            tokio_serial::StopBits::Two
        );
        assert_eq!(
            tokio_serial::Parity::from(Parity::Even),
            tokio_serial::Parity::Even
        );
        assert_eq!(
            tokio_serial::FlowControl::from(FlowControl::Hardware),
            tokio_serial::FlowControl::Hardware
        );
    }

    #[test]
    fn io_errors_map_to_connection_lost() {
        let e = map_io_error(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(matches!(e, Error::ConnectionLost));
        let e = map_io_error(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(e, Error::Io(_)));
    }

    #[tokio::test]
    async fn open_missing_port_fails() {
        let result = SerialTransport::open("/dev/scanlib-does-not-exist", 115_200).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
