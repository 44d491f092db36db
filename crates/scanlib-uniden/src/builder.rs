//! Fluent builder for connecting to an SDS-series scanner.
//!
//! Pick the link with [`ScannerBuilder::serial`] or [`ScannerBuilder::udp`],
//! adjust it, then call [`build()`](ScannerBuilder::build) to open the
//! transport and get a ready [`ScannerBridge`]. Tests hand a mock
//! transport to [`build_with_transport()`](ScannerBuilder::build_with_transport)
//! instead.
//!
//! # Example
//!
//! ```no_run
//! use scanlib_uniden::ScannerBuilder;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let scanner = ScannerBuilder::serial("/dev/ttyACM0")
//!     .baud_rate(115_200)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use scanlib_core::{Error, Result, ScannerBridge, Transport};
use scanlib_io::{BridgeConfig, SerialBridge, UdpBridge};
use scanlib_transport::{SerialConfig, DEFAULT_UDP_PORT};
use tracing::debug;

#[derive(Debug, Clone)]
enum Link {
    Serial { port: String, serial: SerialConfig },
    Udp { host: String, port: u16 },
}

/// Builder for a scanner bridge over serial or UDP.
#[derive(Debug, Clone)]
pub struct ScannerBuilder {
    link: Link,
    config: BridgeConfig,
}

impl ScannerBuilder {
    /// Connect over a serial port (e.g. `/dev/ttyACM0`, `COM3`) at 115200 8N1.
    pub fn serial(port: &str) -> Self {
        Self {
            link: Link::Serial {
                port: port.to_string(),
                serial: SerialConfig::default(),
            },
            config: BridgeConfig::default(),
        }
    }

    /// Connect over the network to `host` on the scanner's UDP port.
    pub fn udp(host: &str) -> Self {
        Self {
            link: Link::Udp {
                host: host.to_string(),
                port: DEFAULT_UDP_PORT,
            },
            config: BridgeConfig::default(),
        }
    }

    /// Set the baud rate. No effect on a UDP link.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        if let Link::Serial { serial, .. } = &mut self.link {
            serial.baud_rate = baud;
        }
        self
    }

    /// Replace the full serial line settings. No effect on a UDP link.
    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        if let Link::Serial { serial, .. } = &mut self.link {
            *serial = config;
        }
        self
    }

    /// Set the scanner's UDP port. No effect on a serial link.
    pub fn udp_port(mut self, udp_port: u16) -> Self {
        if let Link::Udp { port, .. } = &mut self.link {
            *port = udp_port;
        }
        self
    }

    /// Override the bridge timing and buffer settings.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Open the transport and return a connected bridge.
    ///
    /// Fails when the port or address cannot be opened. A UDP scanner that
    /// does not answer the probe is not an error; the bridge is returned
    /// with `is_connected() == false` and keeps trying on every command.
    pub async fn build(self) -> Result<Box<dyn ScannerBridge>> {
        self.validate()?;
        match self.link {
            Link::Serial { port, serial } => {
                debug!(port = %port, baud_rate = serial.baud_rate, "opening serial scanner");
                let mut bridge = SerialBridge::new(self.config);
                bridge.connect_with_config(&port, serial).await?;
                Ok(Box::new(bridge))
            }
            Link::Udp { host, port } => {
                debug!(host = %host, port, "opening UDP scanner");
                let mut bridge = UdpBridge::new(self.config);
                bridge.connect(&host, u32::from(port)).await?;
                Ok(Box::new(bridge))
            }
        }
    }

    /// Build a serial bridge on a caller-supplied transport.
    ///
    /// Only valid for a serial link; the port name and line settings are
    /// ignored.
    pub async fn build_with_transport(
        self,
        transport: Box<dyn Transport>,
    ) -> Result<Box<dyn ScannerBridge>> {
        if !matches!(self.link, Link::Serial { .. }) {
            return Err(Error::InvalidParameter(
                "a byte-stream transport needs a serial builder".into(),
            ));
        }
        let mut bridge = SerialBridge::new(self.config);
        bridge.attach(transport).await;
        Ok(Box::new(bridge))
    }

    fn validate(&self) -> Result<()> {
        match &self.link {
            Link::Serial { port, serial } => {
                if port.trim().is_empty() {
                    return Err(Error::InvalidParameter("serial port name is empty".into()));
                }
                if serial.baud_rate == 0 {
                    return Err(Error::InvalidParameter("baud rate must be non-zero".into()));
                }
            }
            Link::Udp { host, port } => {
                if host.trim().is_empty() {
                    return Err(Error::InvalidParameter("host is empty".into()));
                }
                if *port == 0 {
                    return Err(Error::InvalidParameter("UDP port must be non-zero".into()));
                }
            }
        }
        Ok(())
    }
}
