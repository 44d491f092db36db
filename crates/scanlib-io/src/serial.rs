//! Serial bridge: one IO task owning the byte-stream transport.
//!
//! The IO task is the only code that touches the transport. It writes
//! commands handed to it over an mpsc channel and, between commands, reads
//! in short slices so it can notice new commands and cancellation
//! promptly. Every chunk goes through the [`LineFramer`], and completed
//! replies resolve the shared [`Correlator`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use scanlib_core::error::{Error, Result};
use scanlib_core::events::BridgeEvent;
use scanlib_core::transport::Transport;
use scanlib_core::{normalize_command, Reply, ScannerBridge};
use scanlib_transport::{SerialConfig, SerialTransport};

use crate::config::BridgeConfig;
use crate::correlator::Correlator;
use crate::line::LineFramer;
use crate::protocol;
use crate::Framed;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A request sent from the bridge to its IO task.
enum Request {
    /// Write these bytes to the port.
    Write {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Handle to a running IO task.
struct SerialIo {
    tx: mpsc::Sender<Request>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SerialIo {
    async fn write(&self, bytes: Vec<u8>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Write {
                bytes,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;
        reply_rx.await.map_err(|_| Error::NotConnected)?
    }
}

/// Scanner bridge over a serial port (or any byte-stream [`Transport`]).
pub struct SerialBridge {
    config: BridgeConfig,
    correlator: Arc<Correlator>,
    event_tx: broadcast::Sender<BridgeEvent>,
    connected: Arc<AtomicBool>,
    io: Option<SerialIo>,
}

impl SerialBridge {
    pub fn new(config: BridgeConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        Self {
            config,
            correlator: Arc::new(Correlator::new()),
            event_tx,
            connected: Arc::new(AtomicBool::new(false)),
            io: None,
        }
    }

    /// Open `port` with explicit line settings and start the IO task.
    pub async fn connect_with_config(&mut self, port: &str, serial: SerialConfig) -> Result<()> {
        let transport = SerialTransport::open_with_config(port, serial).await?;
        self.attach(Box::new(transport)).await;
        Ok(())
    }

    /// Start the IO task on an already-open transport.
    ///
    /// Any previous transport is released first.
    pub async fn attach(&mut self, transport: Box<dyn Transport>) {
        self.dispose_io().await;

        let (tx, rx) = mpsc::channel::<Request>(32);
        let cancel = CancellationToken::new();
        self.connected.store(true, Ordering::SeqCst);

        let task = tokio::spawn(io_loop(
            transport,
            self.config.clone(),
            self.correlator.clone(),
            self.event_tx.clone(),
            self.connected.clone(),
            rx,
            cancel.clone(),
        ));

        self.io = Some(SerialIo { tx, cancel, task });
        let _ = self.event_tx.send(BridgeEvent::Connected);
    }

    /// The live IO handle, if the transport is still up.
    fn live_io(&self) -> Option<&SerialIo> {
        self.io
            .as_ref()
            .filter(|_| self.connected.load(Ordering::SeqCst))
    }

    async fn dispose_io(&mut self) {
        if let Some(io) = self.io.take() {
            io.cancel.cancel();
            let _ = io.task.await;
            self.correlator.clear();
        }
    }
}

impl Default for SerialBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

#[async_trait]
impl ScannerBridge for SerialBridge {
    async fn connect(&mut self, target: &str, param: u32) -> Result<()> {
        let serial = SerialConfig {
            baud_rate: param,
            ..Default::default()
        };
        self.connect_with_config(target, serial).await
    }

    async fn send_and_receive(&self, command: &str, timeout: Duration) -> Reply {
        let command = normalize_command(command);
        let Some(io) = self.live_io() else {
            return Reply::Disconnected;
        };

        let kind = protocol::serial_response_kind(&command);
        let timeout = if protocol::is_xml_command(&command) {
            timeout.max(self.config.xml_timeout_floor)
        } else {
            timeout
        };

        let (generation, rx) = self.correlator.expect(kind);
        let _ = self.event_tx.send(BridgeEvent::DataSent(command.clone()));

        if let Err(e) = io.write(protocol::encode_command(&command)).await {
            debug!(command = %command, error = %e, "serial write failed");
            self.correlator.abandon(generation);
            return Reply::Disconnected;
        }

        self.correlator.wait(generation, rx, timeout).await
    }

    async fn send_command(&self, command: &str) -> Result<()> {
        let command = normalize_command(command);
        let io = self.live_io().ok_or(Error::NotConnected)?;
        let _ = self.event_tx.send(BridgeEvent::DataSent(command.clone()));
        io.write(protocol::encode_command(&command)).await
    }

    fn is_connected(&self) -> bool {
        self.live_io().is_some()
    }

    fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.event_tx.subscribe()
    }

    async fn dispose(&mut self) {
        self.dispose_io().await;
    }
}

impl Drop for SerialBridge {
    fn drop(&mut self) {
        if let Some(io) = self.io.take() {
            io.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// IO Loop
// ---------------------------------------------------------------------------

/// The IO task. Runs until cancelled, until the bridge is dropped, or until
/// the port is lost. Any other read error pauses the task for
/// `error_backoff` and reading resumes.
///
/// `tokio::select! { biased; }` orders the arms:
/// 1. Cancellation
/// 2. Outbound writes
/// 3. Idle reads into the framer
async fn io_loop(
    mut transport: Box<dyn Transport>,
    config: BridgeConfig,
    correlator: Arc<Correlator>,
    event_tx: broadcast::Sender<BridgeEvent>,
    connected: Arc<AtomicBool>,
    mut rx: mpsc::Receiver<Request>,
    cancel: CancellationToken,
) {
    let mut framer = LineFramer::new(config.max_message_len);
    let mut lost = false;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("serial IO task cancelled");
                break;
            }

            req = rx.recv() => {
                match req {
                    Some(Request::Write { bytes, reply }) => {
                        let result = transport.send(&bytes).await;
                        if matches!(result, Err(Error::ConnectionLost) | Err(Error::NotConnected)) {
                            lost = true;
                        }
                        let _ = reply.send(result);
                        if lost {
                            break;
                        }
                    }
                    None => {
                        debug!("request channel closed, exiting serial IO task");
                        break;
                    }
                }
            }

            result = async {
                let mut buf = [0u8; 1024];
                match transport.receive(&mut buf, config.read_poll_interval).await {
                    Ok(n) => {
                        let pending = correlator.pending();
                        for framed in framer.process_chunk(&buf[..n], pending) {
                            dispatch(framed, &correlator, &event_tx);
                        }
                        Ok(())
                    }
                    Err(Error::Timeout) => Ok(()),
                    Err(e) => Err(e),
                }
            } => {
                match result {
                    Ok(()) => {}
                    Err(e @ (Error::ConnectionLost | Error::NotConnected)) => {
                        tracing::error!(error = %e, "serial port lost, stopping IO task");
                        lost = true;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "serial read failed, backing off");
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(config.error_backoff) => {}
                        }
                    }
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    correlator.clear();
    if let Err(e) = transport.close().await {
        tracing::warn!(error = %e, "failed to close serial transport");
    }
    let _ = event_tx.send(BridgeEvent::Disconnected);
    debug!(lost, "serial IO task exited");
}

/// Route one framer output to subscribers and the correlator.
fn dispatch(framed: Framed, correlator: &Correlator, event_tx: &broadcast::Sender<BridgeEvent>) {
    match framed {
        Framed::Message(text) => {
            let _ = event_tx.send(BridgeEvent::DataReceived(text));
        }
        Framed::Response {
            generation,
            payload,
        } => {
            if !correlator.resolve(generation, payload) {
                tracing::trace!(generation, "reply arrived for a slot no longer waiting");
            }
        }
        Framed::PacketLoss { expected, received } => {
            let _ = event_tx.send(BridgeEvent::PacketLoss { expected, received });
        }
    }
}
