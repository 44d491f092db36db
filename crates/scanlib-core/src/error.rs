//! Error types for scanlib.
//!
//! Fallible operations below the bridge surface return [`Result<T>`], which
//! uses [`Error`] as the error type. Bridges absorb these errors and report
//! them to callers as [`Reply`](crate::reply::Reply) sentinels instead.

/// The error type for scanlib transport and protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port, UDP socket).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unterminated reply, oversized line).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for data from the scanner.
    #[error("timeout waiting for response")]
    Timeout,

    /// An invalid parameter was passed to a command builder or transport.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the scanner has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the scanner was lost unexpectedly.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
