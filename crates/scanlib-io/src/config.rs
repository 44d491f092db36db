//! Bridge timing and sizing configuration.

use std::time::Duration;

/// Configuration shared by the serial and UDP bridges.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Minimum wait for serial XML-class commands; the scanner streams the
    /// document slowly, a line at a time.
    pub xml_timeout_floor: Duration,
    /// Minimum wait for the UDP multi-fragment command family.
    pub multi_fragment_timeout_floor: Duration,
    /// Timeout for the `MDL` liveness probe sent on UDP connect.
    pub probe_timeout: Duration,
    /// How long the serial IO task blocks on a read before checking for
    /// commands and cancellation again.
    pub read_poll_interval: Duration,
    /// Pause after a non-fatal read error before the receive loop resumes.
    pub error_backoff: Duration,
    /// Longest line or assembly buffer the framers accept before resetting.
    pub max_message_len: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            xml_timeout_floor: Duration::from_secs(3),
            multi_fragment_timeout_floor: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(2),
            read_poll_interval: Duration::from_millis(50),
            error_backoff: Duration::from_millis(250),
            max_message_len: 64 * 1024,
            event_capacity: 256,
        }
    }
}
