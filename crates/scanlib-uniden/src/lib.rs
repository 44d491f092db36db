//! Uniden SDS-series scanner support for scanlib.
//!
//! This crate holds everything specific to the SDS100/SDS200 remote
//! control protocol. It sits on top of the transport-agnostic bridges in
//! `scanlib-io` and provides:
//!
//! - **Command builders** ([`commands`]) -- `MDL`, `GSI`, `KEY`, `MUT`,
//!   `REC`, `FRE` and friends, validated before they reach the wire.
//! - **Screen kinds** ([`screen`]) -- the closed set of `V_Screen` values
//!   the decoder dispatches on.
//! - **Status decoder** ([`decoder`]) -- turns a `ScannerInfo` reply into a
//!   [`ScannerStatus`](scanlib_core::ScannerStatus), all-or-nothing.
//! - **Contact tracking** ([`contacts`]) -- logs each new signal lock.
//! - **Polling** ([`monitor`]) -- one `GSI,0` poll per call, plus a bounded
//!   traffic history for debug views.
//! - **Builder** ([`builder`]) -- opens a serial or UDP bridge.
//!
//! # Example
//!
//! ```
//! use scanlib_core::ScannerStatus;
//! use scanlib_uniden::decoder::update_status;
//!
//! let mut status = ScannerStatus::new();
//! let reply = "GSI,<XML>,<?xml version=\"1.0\"?><ScannerInfo Mode=\"Scan\" \
//!              V_Screen=\"conventional_scan\"><System Name=\"FDNY\"/>\
//!              <ConvFrequency Name=\"Dispatch\" Freq=\"154.2800MHz\" Mod=\"FM\"/>\
//!              <Property Rssi=\"3\"/></ScannerInfo>";
//! assert!(update_status(&mut status, reply));
//! assert_eq!(status.system_name, "FDNY");
//! assert_eq!(status.rssi_numeric, 3);
//! ```

pub mod builder;
pub mod commands;
pub mod contacts;
pub mod decoder;
pub mod monitor;
pub mod screen;

pub use builder::ScannerBuilder;
pub use commands::KeyAction;
pub use contacts::{ContactLogEntry, ContactTracker};
pub use decoder::{decode_status, update_status, DecodeError};
pub use monitor::{PollOutcome, StatusPoller, TrafficLog};
pub use screen::ScreenKind;
