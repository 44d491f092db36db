//! The `ScannerBridge` trait -- one interface over both transports.
//!
//! A bridge owns the physical connection, normalizes outbound commands,
//! runs the background receive loop that frames inbound data, and
//! correlates the next framed message with the single outstanding
//! `send_and_receive` call. Callers program against `dyn ScannerBridge`
//! and do not care whether the scanner is on a serial port or the network.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::BridgeEvent;
use crate::reply::Reply;

/// Asynchronous command/response interface to a scanner.
///
/// Only one `send_and_receive` may be outstanding per bridge. Issuing a
/// second call before the first completes replaces the first's pending
/// slot; the earlier caller then waits out its own timeout and gets
/// [`Reply::Timeout`]. The scanner never pipelines commands, so neither
/// does the bridge.
#[async_trait]
pub trait ScannerBridge: Send + Sync {
    /// Open the transport.
    ///
    /// `target` is a serial port name or a host address; `param` is the
    /// baud rate or the UDP port respectively.
    async fn connect(&mut self, target: &str, param: u32) -> Result<()>;

    /// Send a command and wait for the matching reply.
    ///
    /// Returns [`Reply::Disconnected`] without touching the wire when there
    /// is no live transport, and [`Reply::Timeout`] when nothing arrives in
    /// time. A timeout stops the wait but does not abort any I/O.
    async fn send_and_receive(&self, command: &str, timeout: Duration) -> Reply;

    /// Send a command without waiting for a reply.
    async fn send_command(&self, command: &str) -> Result<()>;

    /// Whether the bridge currently considers the scanner reachable.
    fn is_connected(&self) -> bool;

    /// Subscribe to data-in/data-out notifications.
    fn subscribe(&self) -> broadcast::Receiver<BridgeEvent>;

    /// Stop the receive loop and release the transport.
    ///
    /// Idempotent and safe to call on a bridge that never connected.
    async fn dispose(&mut self);
}
