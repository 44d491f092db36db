//! Framing, response correlation, and transport bridges for scanlib.
//!
//! Each bridge owns one background receive task that frames inbound data
//! and resolves the single pending-response slot. Callers see only the
//! [`ScannerBridge`](scanlib_core::ScannerBridge) surface.
//!
//! # Architecture
//!
//! - [`protocol`] -- command classification and wire encoding
//! - [`correlator`] -- the single pending-response slot
//! - [`line`] -- `\r`-delimited framer for the serial byte stream
//! - [`fragment`] -- datagram classifier and multi-fragment reassembler
//! - [`serial`] -- [`SerialBridge`] and its IO task
//! - [`udp`] -- [`UdpBridge`] and its receive loop

pub mod config;
pub mod correlator;
pub mod fragment;
pub mod line;
pub mod protocol;
pub mod serial;
pub mod udp;

pub use config::BridgeConfig;
pub use correlator::{Correlator, Pending, ResponseKind};
pub use fragment::FragmentAssembler;
pub use line::LineFramer;
pub use serial::SerialBridge;
pub use udp::UdpBridge;

/// Output of a framer for one chunk or datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framed {
    /// A complete inbound message, published as a data-received event.
    Message(String),
    /// Payload completing the pending response with this generation.
    Response { generation: u64, payload: String },
    /// A multi-fragment reply skipped sequence numbers.
    PacketLoss { expected: u32, received: u32 },
}
