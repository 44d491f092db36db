//! UDP transport for the scanner's network control port.
//!
//! [`UdpTransport`] wraps an unconnected [`tokio::net::UdpSocket`] bound to an
//! OS-assigned local port. Every send names the scanner's endpoint
//! explicitly. An OS-level "connected" UDP socket filters inbound datagrams
//! inconsistently across platforms, so the socket is never connected.
//!
//! This does not implement [`Transport`](scanlib_core::Transport): the
//! protocol is packet-oriented and the UDP framer needs datagram boundaries.
//!
//! # Example
//!
//! ```no_run
//! use scanlib_transport::UdpTransport;
//! use std::time::Duration;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let transport = UdpTransport::open("192.168.1.60", 50536).await?;
//! transport.send(b"MDL\r").await?;
//!
//! let mut buf = [0u8; 2048];
//! let (n, _src) = transport.recv_from(&mut buf, Duration::from_secs(2)).await?;
//! # Ok(())
//! # }
//! ```

use scanlib_core::error::{Error, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Well-known UDP control port of the scanner.
pub const DEFAULT_UDP_PORT: u16 = 50536;

/// Unconnected datagram socket aimed at one scanner.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote: SocketAddr,
}

impl UdpTransport {
    /// Resolve `host:port` and bind a local socket on an OS-assigned port.
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        let remote = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| {
                tracing::error!(host = %host, port, error = %e, "Failed to resolve scanner address");
                Error::InvalidParameter(format!("cannot resolve {host}:{port}: {e}"))
            })?
            .next()
            .ok_or_else(|| Error::InvalidParameter(format!("no address for {host}:{port}")))?;

        Self::open_addr(remote).await
    }

    /// Bind a local socket for talking to an already-resolved endpoint.
    pub async fn open_addr(remote: SocketAddr) -> Result<Self> {
        let bind_addr = if remote.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
            tracing::error!(addr = %bind_addr, error = %e, "Failed to bind UDP socket");
            Error::Io(e)
        })?;
        let local_addr = socket.local_addr()?;

        tracing::debug!(local = %local_addr, remote = %remote, "UDP socket bound");

        Ok(Self {
            socket,
            local_addr,
            remote,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The scanner endpoint every datagram is sent to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Send one datagram to the scanner.
    pub async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            local = %self.local_addr,
            remote = %self.remote,
            bytes = data.len(),
            "Sending datagram"
        );

        self.socket.send_to(data, self.remote).await.map_err(|e| {
            tracing::error!(remote = %self.remote, error = %e, "Failed to send datagram");
            Error::Io(e)
        })?;
        Ok(())
    }

    /// Wait for the next datagram from any source.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` arm next to a
    /// cancellation token.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (n, src) = self.socket.recv_from(buf).await.map_err(|e| {
            tracing::error!(local = %self.local_addr, error = %e, "Failed to receive datagram");
            Error::Io(e)
        })?;
        tracing::trace!(local = %self.local_addr, remote = %src, bytes = n, "Received datagram");
        Ok((n, src))
    }

    /// Receive a datagram, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if nothing arrives within `timeout`.
    pub async fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<(usize, SocketAddr)> {
        match tokio::time::timeout(timeout, self.recv(buf)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_binds_ephemeral_port() {
        let t = UdpTransport::open("127.0.0.1", DEFAULT_UDP_PORT).await.unwrap();
        assert_ne!(t.local_addr().port(), 0);
        assert_eq!(t.remote_addr().port(), 50536);
    }

    #[tokio::test]
    async fn send_reaches_remote_and_reply_returns() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let t = UdpTransport::open_addr(device.local_addr().unwrap())
            .await
            .unwrap();

        t.send(b"MDL\r").await.unwrap();

        let mut buf = [0u8; 64];
        let (n, client) = device.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"MDL\r");

        device.send_to(b"MDL,SDS200\r", client).await.unwrap();
        let (n, _) = t
            .recv_from(&mut buf, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"MDL,SDS200\r");
    }

    #[tokio::test]
    async fn recv_times_out() {
        let t = UdpTransport::open("127.0.0.1", 9).await.unwrap();
        let mut buf = [0u8; 16];
        let result = t.recv_from(&mut buf, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }
}
