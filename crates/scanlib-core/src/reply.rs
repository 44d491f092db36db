//! The outcome of a send-and-wait exchange.
//!
//! Transport and framing failures never escape a bridge as errors. A caller
//! gets either the raw reply text or one of two reserved sentinels, and
//! branches on them before handing anything to the status decoder.

use std::fmt;

/// Reserved text for a reply that did not arrive before the deadline.
pub const TIMEOUT: &str = "TIMEOUT";

/// Reserved text for a command issued without a live transport.
pub const DISCONNECTED: &str = "DISCONNECTED";

/// Result of [`ScannerBridge::send_and_receive`](crate::bridge::ScannerBridge::send_and_receive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The framed reply text, exactly as the framer produced it.
    Response(String),
    /// No reply arrived within the effective timeout.
    Timeout,
    /// The bridge had no live transport; nothing was sent.
    Disconnected,
}

impl Reply {
    /// The reply payload, or the sentinel string for the two failure cases.
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Response(text) => text,
            Reply::Timeout => TIMEOUT,
            Reply::Disconnected => DISCONNECTED,
        }
    }

    /// The payload if this is a real response.
    pub fn response(&self) -> Option<&str> {
        match self {
            Reply::Response(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<String> {
        match self {
            Reply::Response(text) => Some(text),
            _ => None,
        }
    }

    /// `true` for either sentinel.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Reply::Response(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_text() {
        assert_eq!(Reply::Timeout.as_str(), "TIMEOUT");
        assert_eq!(Reply::Disconnected.as_str(), "DISCONNECTED");
        assert_eq!(Reply::Disconnected.to_string(), DISCONNECTED);
    }

    #[test]
    fn response_passes_through() {
        let r = Reply::Response("MDL,SDS200".into());
        assert_eq!(r.as_str(), "MDL,SDS200");
        assert_eq!(r.response(), Some("MDL,SDS200"));
        assert!(!r.is_sentinel());
        assert_eq!(r.into_response().as_deref(), Some("MDL,SDS200"));
    }

    #[test]
    fn sentinels_have_no_payload() {
        assert!(Reply::Timeout.is_sentinel());
        assert_eq!(Reply::Timeout.response(), None);
        assert_eq!(Reply::Disconnected.into_response(), None);
    }
}
