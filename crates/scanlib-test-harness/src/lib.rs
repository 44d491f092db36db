//! scanlib-test-harness: mock transports for scanlib.
//!
//! [`MockTransport`] stands in for the serial port with scripted,
//! optionally chunked replies. [`MockScanner`] is a loopback UDP endpoint
//! that answers scripted requests with one or more datagrams, the way the
//! scanner's network port does.

pub mod mock_serial;
pub mod mock_udp;

pub use mock_serial::{MockHandle, MockTransport};
pub use mock_udp::MockScanner;
