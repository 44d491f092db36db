//! The single pending-response slot.
//!
//! A bridge holds at most one outstanding `send_and_receive`. The caller
//! registers the slot with [`Correlator::expect`], the receive task fills
//! it with [`Correlator::resolve`], and [`Correlator::wait`] races the
//! result against the caller's deadline.
//!
//! Registering a new slot drops the previous one. Its caller is orphaned:
//! it sits out the rest of its own timeout and gets [`Reply::Timeout`].
//! The scanner never pipelines commands, so the bridge never queues them.
//! A slot cleared because the link went away is different: its caller gets
//! [`Reply::Disconnected`] at once.
//!
//! Every slot carries a generation number. Framers tag a completed reply
//! with the generation they observed, and a reply for a generation that is
//! no longer pending is discarded. This is how a reply that shows up after
//! its caller gave up is kept away from the next caller.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use scanlib_core::Reply;

/// How the framer should decide a reply is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// The next framed line or simple datagram is the reply.
    Line,
    /// Serial only: accumulate lines until one contains `closing_tag`.
    XmlDocument { closing_tag: &'static str },
    /// UDP only: reassemble footer-sequenced fragments until `EOT="1"`.
    MultiFragment,
}

/// A read-only view of the pending slot, handed to framers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub generation: u64,
    pub kind: ResponseKind,
}

struct Slot {
    generation: u64,
    kind: ResponseKind,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
struct Inner {
    next_generation: u64,
    slot: Option<Slot>,
}

/// Single-slot response correlator shared by a bridge and its receive task.
#[derive(Default)]
pub struct Correlator {
    inner: Mutex<Inner>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The lock is never held across a panic-prone call, so a poisoned
        // guard still holds consistent state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the pending slot, replacing any unresolved one.
    ///
    /// Returns the new slot's generation and the receiver its reply will
    /// arrive on.
    pub fn expect(&self, kind: ResponseKind) -> (u64, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        if let Some(old) = inner.slot.replace(Slot {
            generation,
            kind,
            reply: tx,
        }) {
            tracing::debug!(
                orphaned = old.generation,
                generation,
                "pending response replaced before it resolved"
            );
        }
        (generation, rx)
    }

    /// The currently pending slot, if any.
    pub fn pending(&self) -> Option<Pending> {
        self.lock().slot.as_ref().map(|s| Pending {
            generation: s.generation,
            kind: s.kind,
        })
    }

    /// Fulfil the pending slot if it still has `generation`.
    ///
    /// Returns `true` if a waiting caller received the payload. A stale
    /// generation, an empty slot, or a caller that already gave up are all
    /// silent no-ops.
    pub fn resolve(&self, generation: u64, payload: String) -> bool {
        let slot = {
            let mut inner = self.lock();
            match inner.slot.as_ref() {
                Some(s) if s.generation == generation => inner.slot.take(),
                _ => None,
            }
        };
        match slot {
            Some(slot) => slot.reply.send(Reply::Response(payload)).is_ok(),
            None => false,
        }
    }

    /// Fulfil whatever slot is pending, regardless of generation.
    pub fn resolve_current(&self, payload: String) -> bool {
        let slot = self.lock().slot.take();
        match slot {
            Some(slot) => slot.reply.send(Reply::Response(payload)).is_ok(),
            None => false,
        }
    }

    /// Drop the slot if it still belongs to `generation`.
    pub fn abandon(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.slot.as_ref().map(|s| s.generation) == Some(generation) {
            inner.slot = None;
        }
    }

    /// Drop any pending slot because the link is gone.
    ///
    /// A caller still waiting on it returns [`Reply::Disconnected`] without
    /// sitting out its timeout.
    pub fn clear(&self) {
        let slot = self.lock().slot.take();
        if let Some(slot) = slot {
            let _ = slot.reply.send(Reply::Disconnected);
        }
    }

    /// Race the slot's completion against `timeout`.
    ///
    /// On timeout the slot is abandoned so a late reply cannot resolve a
    /// later caller. If the slot is replaced while waiting, this keeps
    /// waiting until the deadline and then reports a timeout. If it is
    /// cleared by [`clear`](Self::clear), this returns at once.
    pub async fn wait(
        &self,
        generation: u64,
        rx: oneshot::Receiver<Reply>,
        timeout: Duration,
    ) -> Reply {
        let deadline = Instant::now() + timeout;
        match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                tokio::time::sleep_until(deadline).await;
                Reply::Timeout
            }
            Err(_) => {
                self.abandon(generation);
                Reply::Timeout
            }
        }
    }
}
