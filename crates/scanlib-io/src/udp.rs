//! UDP bridge: unconnected socket plus a background receive loop.
//!
//! The receive loop is the only reader of the socket and the only writer of
//! fragment-assembly state. Callers send from their own task through the
//! shared [`UdpTransport`] and register the pending slot before sending.
//!
//! There is no handshake. Liveness comes from an `MDL` probe right after
//! the socket opens: the bridge counts as connected only if the probe gets
//! a reply. Every later reply re-affirms it, and a failed send clears it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use scanlib_core::error::{Error, Result};
use scanlib_core::events::BridgeEvent;
use scanlib_core::{normalize_command, Reply, ScannerBridge};
use scanlib_transport::UdpTransport;

use crate::config::BridgeConfig;
use crate::correlator::Correlator;
use crate::fragment::FragmentAssembler;
use crate::protocol;
use crate::Framed;

/// Command used to check the scanner is listening.
const PROBE_COMMAND: &str = "MDL";

/// Largest datagram the scanner sends, with headroom.
const MAX_DATAGRAM: usize = 65_536;

struct UdpLink {
    transport: Arc<UdpTransport>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Scanner bridge over the network control port.
pub struct UdpBridge {
    config: BridgeConfig,
    correlator: Arc<Correlator>,
    event_tx: broadcast::Sender<BridgeEvent>,
    connected: Arc<AtomicBool>,
    link: Option<UdpLink>,
}

impl UdpBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        Self {
            config,
            correlator: Arc::new(Correlator::new()),
            event_tx,
            connected: Arc::new(AtomicBool::new(false)),
            link: None,
        }
    }

    /// Start the receive loop on an open transport and probe the scanner.
    ///
    /// Returns whether the probe was answered.
    pub async fn attach(&mut self, transport: UdpTransport) -> bool {
        self.dispose_link().await;

        let transport = Arc::new(transport);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(recv_loop(
            transport.clone(),
            self.config.clone(),
            self.correlator.clone(),
            self.event_tx.clone(),
            cancel.clone(),
        ));
        self.link = Some(UdpLink {
            transport,
            cancel,
            task,
        });

        let probe = self
            .send_and_receive(PROBE_COMMAND, self.config.probe_timeout)
            .await;
        let alive = !probe.is_sentinel();
        if alive {
            debug!(reply = %probe, "scanner answered probe");
        } else {
            tracing::warn!(result = %probe, "scanner did not answer probe");
        }
        alive
    }

    fn mark_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        if was != connected {
            let event = if connected {
                BridgeEvent::Connected
            } else {
                BridgeEvent::Disconnected
            };
            let _ = self.event_tx.send(event);
        }
    }

    async fn dispose_link(&mut self) {
        if let Some(link) = self.link.take() {
            link.cancel.cancel();
            let _ = link.task.await;
            self.correlator.clear();
            self.mark_connected(false);
        }
    }
}

impl Default for UdpBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

#[async_trait]
impl ScannerBridge for UdpBridge {
    async fn connect(&mut self, target: &str, param: u32) -> Result<()> {
        let port = u16::try_from(param)
            .map_err(|_| Error::InvalidParameter(format!("UDP port out of range: {param}")))?;
        let transport = UdpTransport::open(target, port).await?;
        self.attach(transport).await;
        Ok(())
    }

    async fn send_and_receive(&self, command: &str, timeout: Duration) -> Reply {
        let command = normalize_command(command);
        let Some(link) = self.link.as_ref() else {
            return Reply::Disconnected;
        };

        let kind = protocol::udp_response_kind(&command);
        let timeout = if protocol::is_multi_fragment_command(&command) {
            timeout.max(self.config.multi_fragment_timeout_floor)
        } else {
            timeout
        };

        let (generation, rx) = self.correlator.expect(kind);
        let _ = self.event_tx.send(BridgeEvent::DataSent(command.clone()));

        if let Err(e) = link
            .transport
            .send(&protocol::encode_command(&command))
            .await
        {
            debug!(command = %command, error = %e, "UDP send failed");
            self.correlator.abandon(generation);
            self.mark_connected(false);
            return Reply::Disconnected;
        }

        let reply = self.correlator.wait(generation, rx, timeout).await;
        if !reply.is_sentinel() {
            self.mark_connected(true);
        }
        reply
    }

    async fn send_command(&self, command: &str) -> Result<()> {
        let command = normalize_command(command);
        let link = self.link.as_ref().ok_or(Error::NotConnected)?;
        let _ = self.event_tx.send(BridgeEvent::DataSent(command.clone()));
        let result = link.transport.send(&protocol::encode_command(&command)).await;
        if result.is_err() {
            self.mark_connected(false);
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.link.is_some() && self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.event_tx.subscribe()
    }

    async fn dispose(&mut self) {
        self.dispose_link().await;
    }
}

impl Drop for UdpBridge {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

/// Read datagrams in arrival order until cancelled.
///
/// A socket error (on some platforms an ICMP port-unreachable surfaces as
/// one) pauses the loop for `error_backoff` and then resumes.
async fn recv_loop(
    transport: Arc<UdpTransport>,
    config: BridgeConfig,
    correlator: Arc<Correlator>,
    event_tx: broadcast::Sender<BridgeEvent>,
    cancel: CancellationToken,
) {
    let mut assembler = FragmentAssembler::new(config.max_message_len);
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("UDP receive loop cancelled");
                break;
            }

            result = transport.recv(&mut buf) => match result {
                Ok((n, _src)) => {
                    let text = String::from_utf8_lossy(&buf[..n]);
                    let message = text.trim();
                    if message.is_empty() {
                        continue;
                    }
                    let pending = correlator.pending();
                    for framed in assembler.process(message, pending) {
                        match framed {
                            Framed::Message(text) => {
                                let _ = event_tx.send(BridgeEvent::DataReceived(text));
                            }
                            Framed::Response { generation, payload } => {
                                correlator.resolve(generation, payload);
                            }
                            Framed::PacketLoss { expected, received } => {
                                let _ = event_tx.send(BridgeEvent::PacketLoss { expected, received });
                            }
                        }
                    }
                }
                Err(e) => {
                    debug!(error = %e, "UDP receive error, backing off");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(config.error_backoff) => {}
                    }
                }
            },
        }
    }
}
