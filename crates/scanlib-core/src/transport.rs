//! Byte-stream transport trait.
//!
//! The [`Transport`] trait abstracts over a stream-oriented link to the
//! scanner. The serial port implements it in `scanlib-transport`, and
//! `MockTransport` from `scanlib-test-harness` implements it for tests.
//! The serial bridge in `scanlib-io` drives a `Box<dyn Transport>` so both
//! can be swapped without touching the framing logic.
//!
//! UDP is packet-oriented and is not modelled by this trait; see
//! `scanlib_transport::UdpTransport`.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a scanner.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the scanner.
    ///
    /// Implementations should not return until every byte has been handed
    /// to the underlying device.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the scanner into the provided buffer.
    ///
    /// Returns the number of bytes read. Waits up to `timeout` for data;
    /// returns [`Error::Timeout`](crate::error::Error::Timeout) if nothing
    /// arrives within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport.
    ///
    /// After `close()`, `send()` and `receive()` return
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently open.
    fn is_connected(&self) -> bool;
}
