//! Transport implementations for scanlib.
//!
//! - [`SerialTransport`]: the scanner's USB virtual COM port, implementing
//!   the byte-stream [`Transport`](scanlib_core::Transport) trait
//! - [`UdpTransport`]: an unconnected datagram socket aimed at the
//!   scanner's network control port
//!
//! # Example
//!
//! ```no_run
//! use scanlib_transport::SerialTransport;
//! use scanlib_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyACM0", 115_200).await?;
//! transport.send(b"MDL\r").await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;
pub mod udp;

pub use serial::{
    DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits, DEFAULT_BAUD_RATE,
};
pub use udp::{UdpTransport, DEFAULT_UDP_PORT};
