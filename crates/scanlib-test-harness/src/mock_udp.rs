//! Scripted UDP scanner for network bridge tests.
//!
//! [`MockScanner`] binds a loopback UDP socket and plays the part of the
//! scanner's network control port. Each scripted request is answered with
//! zero or more datagrams, sent back to whichever address the request came
//! from.
//!
//! # Example
//!
//! ```
//! use scanlib_test_harness::MockScanner;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let mut scanner = MockScanner::new().await?;
//! scanner.expect(b"MDL\r", b"MDL,SDS200");
//! let port = scanner.port();
//! scanner.start();
//! // ... connect a UdpBridge to 127.0.0.1:port ...
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;

use scanlib_core::error::{Error, Result};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
struct DatagramExpectation {
    request: Vec<u8>,
    replies: Vec<Vec<u8>>,
}

/// A loopback stand-in for the scanner's UDP control port.
///
/// Expectations are processed in order. A request that does not match the
/// next expectation ends the script with an error, reported by
/// [`wait`](MockScanner::wait).
pub struct MockScanner {
    socket: Option<UdpSocket>,
    addr: SocketAddr,
    expectations: VecDeque<DatagramExpectation>,
    reply_gap: Duration,
    handle: Option<JoinHandle<std::result::Result<(), String>>>,
}

impl MockScanner {
    /// Bind to a random loopback port.
    pub async fn new() -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Transport(format!("failed to bind mock scanner: {e}")))?;
        let addr = socket.local_addr()?;
        Ok(Self {
            socket: Some(socket),
            addr,
            expectations: VecDeque::new(),
            reply_gap: Duration::ZERO,
            handle: None,
        })
    }

    /// Answer `request` with a single datagram.
    pub fn expect(&mut self, request: &[u8], reply: &[u8]) {
        self.expect_datagrams(request, &[reply]);
    }

    /// Answer `request` with several datagrams, in order.
    pub fn expect_datagrams(&mut self, request: &[u8], replies: &[&[u8]]) {
        self.expectations.push_back(DatagramExpectation {
            request: request.to_vec(),
            replies: replies.iter().map(|r| r.to_vec()).collect(),
        });
    }

    /// Accept `request` and send nothing back.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect_datagrams(request, &[]);
    }

    /// Pause between consecutive reply datagrams.
    pub fn set_reply_gap(&mut self, gap: Duration) {
        self.reply_gap = gap;
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Start answering requests in a background task.
    pub fn start(&mut self) {
        let Some(socket) = self.socket.take() else {
            return;
        };
        let expectations: Vec<DatagramExpectation> = self.expectations.drain(..).collect();
        let gap = self.reply_gap;

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 2048];
            for (i, expectation) in expectations.iter().enumerate() {
                let (n, client) = socket
                    .recv_from(&mut buf)
                    .await
                    .map_err(|e| format!("expectation {i}: receive error: {e}"))?;

                if buf[..n] != expectation.request[..] {
                    return Err(format!(
                        "expectation {i}: request mismatch: expected {:?}, got {:?}",
                        String::from_utf8_lossy(&expectation.request),
                        String::from_utf8_lossy(&buf[..n])
                    ));
                }

                for (j, reply) in expectation.replies.iter().enumerate() {
                    if j > 0 && !gap.is_zero() {
                        tokio::time::sleep(gap).await;
                    }
                    socket
                        .send_to(reply, client)
                        .await
                        .map_err(|e| format!("expectation {i}: send error: {e}"))?;
                }
            }
            Ok(())
        });

        self.handle = Some(handle);
    }

    /// Wait for the script to finish and report any mismatch.
    pub async fn wait(&mut self) -> std::result::Result<(), String> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| format!("mock scanner task failed: {e}"))?,
            None => Err("mock scanner was not started".into()),
        }
    }
}

impl Drop for MockScanner {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_scripted_request() {
        let mut scanner = MockScanner::new().await.unwrap();
        scanner.expect(b"MDL\r", b"MDL,SDS200");
        scanner.start();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"MDL\r", scanner.addr()).await.unwrap();

        let mut buf = [0u8; 64];
        let (n, _) = client.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"MDL,SDS200");
        scanner.wait().await.unwrap();
    }

    #[tokio::test]
    async fn multiple_datagrams_in_order() {
        let mut scanner = MockScanner::new().await.unwrap();
        scanner.expect_datagrams(b"GLT,FL\r", &[b"one", b"two", b"three"]);
        scanner.start();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"GLT,FL\r", scanner.addr()).await.unwrap();

        let mut buf = [0u8; 64];
        for expected in [&b"one"[..], b"two", b"three"] {
            let (n, _) = client.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], expected);
        }
        scanner.wait().await.unwrap();
    }

    #[tokio::test]
    async fn mismatch_is_reported() {
        let mut scanner = MockScanner::new().await.unwrap();
        scanner.expect(b"MDL\r", b"MDL,SDS200");
        scanner.start();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(b"VER\r", scanner.addr()).await.unwrap();

        let err = scanner.wait().await.unwrap_err();
        assert!(err.contains("request mismatch"));
    }

    #[tokio::test]
    async fn wait_without_start_errors() {
        let mut scanner = MockScanner::new().await.unwrap();
        assert!(scanner.wait().await.is_err());
    }
}
