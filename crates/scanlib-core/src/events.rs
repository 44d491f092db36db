//! Asynchronous bridge event types.
//!
//! Bridges publish these through a [`tokio::sync::broadcast`] channel so a
//! debug view or traffic log can observe every message in and out without
//! registering callbacks on the bridge itself.

/// An event emitted by a scanner bridge.
///
/// Subscribe via [`ScannerBridge::subscribe()`](crate::bridge::ScannerBridge::subscribe).
/// Delivery is best-effort through a bounded channel; a slow consumer may
/// see `RecvError::Lagged` and miss events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A complete inbound message was framed.
    ///
    /// Fired once per line (serial) or once per simple datagram or
    /// reassembled multi-fragment reply (UDP).
    DataReceived(String),

    /// A normalized command was handed to the transport.
    DataSent(String),

    /// The bridge established a live connection.
    Connected,

    /// The bridge lost its connection or was disposed.
    Disconnected,

    /// A multi-fragment reply skipped one or more sequence numbers.
    PacketLoss {
        /// The sequence number that should have arrived next.
        expected: u32,
        /// The sequence number that actually arrived.
        received: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_clone() {
        let e = BridgeEvent::PacketLoss {
            expected: 2,
            received: 4,
        };
        assert_eq!(e.clone(), e);
    }

    #[tokio::test]
    async fn broadcast_delivers_in_order() {
        let (tx, mut rx) = tokio::sync::broadcast::channel(8);
        tx.send(BridgeEvent::DataSent("MDL".into())).unwrap();
        tx.send(BridgeEvent::DataReceived("MDL,SDS200".into()))
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), BridgeEvent::DataSent("MDL".into()));
        assert_eq!(
            rx.recv().await.unwrap(),
            BridgeEvent::DataReceived("MDL,SDS200".into())
        );
    }
}
