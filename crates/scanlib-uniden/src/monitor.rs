//! Status polling and a bounded traffic history.
//!
//! [`StatusPoller`] performs one iteration of the caller-driven polling
//! loop: query `GSI,0`, decode the reply into the owned status and feed the
//! contact tracker. The caller decides the cadence and what to do with each
//! [`PollOutcome`]; nothing here is fatal, so a loop simply polls again.
//!
//! [`TrafficLog`] drains a bridge's event stream into `>>`/`<<` lines for a
//! debug view.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use scanlib_core::{BridgeEvent, Reply, ScannerBridge, ScannerStatus};

use crate::commands;
use crate::contacts::{ContactLogEntry, ContactTracker};
use crate::decoder::decode_status;

/// How long one status poll waits for a reply.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Number of traffic lines kept before the oldest is dropped.
pub const DEFAULT_TRAFFIC_LOG_SIZE: usize = 30;

/// Result of one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The status was decoded. `new_contact` is set when a signal lock began.
    Updated { new_contact: Option<ContactLogEntry> },
    /// A reply arrived but was not a status document.
    Unrecognized,
    Timeout,
    Disconnected,
}

/// Owns the status snapshot and refreshes it from a bridge.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    status: ScannerStatus,
    tracker: ContactTracker,
    timeout: Duration,
}

impl StatusPoller {
    pub fn new() -> Self {
        Self {
            status: ScannerStatus::new(),
            tracker: ContactTracker::new(),
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tracker(mut self, tracker: ContactTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Query the scanner once and fold the reply into the status.
    ///
    /// A failed decode keeps the last good status.
    pub async fn poll<B>(&mut self, bridge: &B) -> PollOutcome
    where
        B: ScannerBridge + ?Sized,
    {
        let payload = match bridge
            .send_and_receive(&commands::get_status(), self.timeout)
            .await
        {
            Reply::Response(payload) => payload,
            Reply::Timeout => return PollOutcome::Timeout,
            Reply::Disconnected => return PollOutcome::Disconnected,
        };

        match decode_status(&mut self.status, &payload) {
            Ok(kind) => {
                debug!(screen = %kind, "status updated");
                let new_contact = self.tracker.process(&self.status).cloned();
                PollOutcome::Updated { new_contact }
            }
            Err(e) => {
                debug!(error = %e, "status reply not decoded");
                PollOutcome::Unrecognized
            }
        }
    }

    pub fn status(&self) -> &ScannerStatus {
        &self.status
    }

    /// A detached copy of the status for readers on another cadence.
    pub fn snapshot(&self) -> ScannerStatus {
        self.status.snapshot()
    }

    pub fn tracker(&self) -> &ContactTracker {
        &self.tracker
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded history of commands sent and messages received.
#[derive(Debug)]
pub struct TrafficLog {
    events: broadcast::Receiver<BridgeEvent>,
    lines: VecDeque<String>,
    capacity: usize,
}

impl TrafficLog {
    pub fn new(events: broadcast::Receiver<BridgeEvent>) -> Self {
        Self::with_capacity(events, DEFAULT_TRAFFIC_LOG_SIZE)
    }

    pub fn with_capacity(events: broadcast::Receiver<BridgeEvent>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events,
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pull every event currently queued. Returns the number of lines added.
    pub fn drain(&mut self) -> usize {
        let mut added = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.record(&event) {
                        added += 1;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "traffic log fell behind bridge events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        added
    }

    /// Add the line for `event`, if it carries traffic.
    pub fn record(&mut self, event: &BridgeEvent) -> bool {
        let line = match event {
            BridgeEvent::DataSent(text) => format!(">> {text}"),
            BridgeEvent::DataReceived(text) => format!("<< {text}"),
            _ => return false,
        };
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        true
    }

    /// Logged lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
