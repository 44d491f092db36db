//! scanlib-core: Core traits, types, and error definitions for scanlib.
//!
//! This crate holds the transport-agnostic pieces every other scanlib crate
//! builds on. Applications that only consume status snapshots can depend on
//! it without pulling in serial or network code.
//!
//! # Key types
//!
//! - [`ScannerBridge`] -- send-and-wait interface over serial or UDP
//! - [`Transport`] -- byte-stream communication channel
//! - [`Reply`] -- reply text or the `TIMEOUT` / `DISCONNECTED` sentinels
//! - [`BridgeEvent`] -- data-in/data-out notifications
//! - [`ScannerStatus`] -- the decoded device state snapshot
//! - [`Error`] / [`Result`] -- error handling

pub mod bridge;
pub mod error;
pub mod events;
pub mod helpers;
pub mod reply;
pub mod status;
pub mod transport;

// Re-export key types at crate root for ergonomic `use scanlib_core::*`.
pub use bridge::ScannerBridge;
pub use error::{Error, Result};
pub use events::BridgeEvent;
pub use helpers::{command_base, format_freq_mhz, normalize_command, rssi_label};
pub use reply::{Reply, DISCONNECTED, TIMEOUT};
pub use status::ScannerStatus;
pub use transport::Transport;
