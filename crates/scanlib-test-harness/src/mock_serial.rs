//! Mock byte-stream transport for deterministic bridge tests.
//!
//! [`MockTransport`] implements [`Transport`] with scripted
//! request/response pairs. A reply can be delivered as several chunks to
//! exercise framing across reads, or withheld entirely to exercise
//! timeouts.
//!
//! The transport is usually moved into a bridge's IO task, so the test
//! keeps a [`MockHandle`] to inspect what was written, inject unsolicited
//! bytes, or pull the cable.
//!
//! # Example
//!
//! ```
//! use scanlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! mock.expect(b"MDL\r", b"MDL,SDS200\r");
//! mock.expect_chunked(b"VER\r", &[b"VER,", b"1.00\r"]);
//! let handle = mock.handle();
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    /// Chunks returned by successive `receive()` calls. Empty for silence.
    chunks: Vec<Vec<u8>>,
}

#[derive(Debug)]
struct State {
    expectations: VecDeque<Expectation>,
    /// Chunks waiting to be read, in order.
    inbound: VecDeque<Vec<u8>>,
    /// Errors returned by the next reads, ahead of any inbound data.
    read_errors: VecDeque<Error>,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// A mock [`Transport`] standing in for the scanner's serial port.
///
/// Expectations are consumed in order. A `send()` that does not match the
/// next expectation fails with [`Error::Protocol`]. When nothing is queued,
/// `receive()` waits out its timeout and returns [`Error::Timeout`], like a
/// quiet serial line.
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

/// Shared view of a [`MockTransport`] that outlives moving it into a bridge.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                expectations: VecDeque::new(),
                inbound: VecDeque::new(),
                read_errors: VecDeque::new(),
                connected: true,
                sent_log: Vec::new(),
            })),
        }
    }

    /// Reply to `request` with `response` in a single read.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expect_chunked(request, &[response]);
    }

    /// Reply to `request` with each chunk delivered by its own read.
    pub fn expect_chunked(&mut self, request: &[u8], chunks: &[&[u8]]) {
        lock(&self.state).expectations.push_back(Expectation {
            request: request.to_vec(),
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        });
    }

    /// Accept `request` but never reply.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect_chunked(request, &[]);
    }

    /// A handle for inspecting and driving the mock after it is moved.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
        }
    }

    /// Every byte slice passed to `send()`, in order.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.handle().sent_data()
    }

    pub fn remaining_expectations(&self) -> usize {
        lock(&self.state).expectations.len()
    }

    /// Simulate unplugging (or re-plugging) the device.
    pub fn set_connected(&mut self, connected: bool) {
        lock(&self.state).connected = connected;
    }
}

impl MockHandle {
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        lock(&self.state).sent_log.clone()
    }

    /// Queue bytes the device sends without being asked.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.state).inbound.push_back(bytes.to_vec());
    }

    /// Make the next `receive()` fail with `error` without dropping the link.
    pub fn inject_read_error(&self, error: Error) {
        lock(&self.state).read_errors.push_back(error);
    }

    /// When set to `false`, `send()` fails with [`Error::NotConnected`] and
    /// `receive()` with [`Error::ConnectionLost`].
    pub fn set_connected(&self, connected: bool) {
        lock(&self.state).connected = connected;
    }

    pub fn remaining_expectations(&self) -> usize {
        lock(&self.state).expectations.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(Error::NotConnected);
        }

        state.sent_log.push(data.to_vec());

        let expectation = state
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Protocol("no more expectations in mock transport".into()))?;

        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }

        state.inbound.extend(expectation.chunks);
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        {
            let mut state = lock(&self.state);
            if !state.connected {
                return Err(Error::ConnectionLost);
            }
            if let Some(error) = state.read_errors.pop_front() {
                return Err(error);
            }

            if let Some(mut chunk) = state.inbound.pop_front() {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    // Leave the remainder for the next read.
                    state.inbound.push_front(chunk.split_off(n));
                }
                return Ok(n);
            }
        }

        tokio::time::sleep(timeout).await;
        Err(Error::Timeout)
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.connected = false;
        state.inbound.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }
}
