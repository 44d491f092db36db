//! # scanlib -- Remote control for Uniden SDS-series scanners
//!
//! `scanlib` is an asynchronous Rust library for talking to SDS100/SDS200
//! scanners over USB serial or the network. It sends commands, correlates
//! each reply with the command that asked for it, and decodes the scanner's
//! XML status documents into a typed snapshot.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use scanlib::uniden::{ScannerBuilder, StatusPoller, PollOutcome};
//!
//! #[tokio::main]
//! async fn main() -> scanlib::Result<()> {
//!     let scanner = ScannerBuilder::udp("192.168.1.50").build().await?;
//!     let mut poller = StatusPoller::new();
//!     loop {
//!         if let PollOutcome::Updated { .. } = poller.poll(scanner.as_ref()).await {
//!             let status = poller.snapshot();
//!             println!("{} {}", status.system_name, status.channel_name);
//!         }
//!         tokio::time::sleep(Duration::from_millis(250)).await;
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate                | Purpose                                              |
//! |----------------------|------------------------------------------------------|
//! | `scanlib-core`       | [`ScannerBridge`] trait, [`Reply`], events, errors   |
//! | `scanlib-transport`  | Serial and UDP transports                            |
//! | `scanlib-io`         | Framers, response correlator, serial and UDP bridges |
//! | `scanlib-uniden`     | Commands, status decoder, contact tracking, builder  |
//! | **`scanlib`**        | This facade crate -- re-exports everything           |
//!
//! Both bridges implement [`ScannerBridge`], so application code can hold a
//! `Box<dyn ScannerBridge>` and not care how the scanner is attached.
//!
//! ## Replies
//!
//! [`ScannerBridge::send_and_receive`] never returns a transport error. It
//! yields the reply text, [`Reply::Timeout`] or [`Reply::Disconnected`];
//! branch on the sentinels before decoding.
//!
//! ## Feature Flags
//!
//! | Feature  | Enables                               | Default |
//! |----------|---------------------------------------|---------|
//! | `uniden` | [`uniden`] module (SDS-series driver) | yes     |

pub use scanlib_core::*;

/// Serial and UDP transports.
pub mod transport {
    pub use scanlib_transport::*;
}

/// Framers, the response correlator and the two bridges.
pub mod io {
    pub use scanlib_io::*;
}

/// Uniden SDS-series commands, status decoding and connection builder.
///
/// Provides [`ScannerBuilder`](uniden::ScannerBuilder) for opening a bridge
/// and [`StatusPoller`](uniden::StatusPoller) for the polling loop.
#[cfg(feature = "uniden")]
pub mod uniden {
    pub use scanlib_uniden::*;
}
