//! Datagram classification and multi-fragment reassembly for UDP.
//!
//! Most replies fit in one datagram and are handed to the pending slot
//! whole. The `GLT` family is the exception: its XML reply is split across
//! datagrams, each ending in a footer element
//!
//! ```text
//! <Footer No="3" EOT="0"/>
//! ```
//!
//! where `No` is a 1-based sequence number and `EOT="1"` marks the last
//! fragment. UDP may drop or reorder datagrams; a gap in the sequence is
//! reported but not repaired, since the scanner has no retransmit request.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::correlator::{Pending, ResponseKind};
use crate::protocol::{contains_ignore_case, find_ignore_case};
use crate::Framed;

static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<Footer\s+No="(?P<no>\d+)"\s+EOT="(?P<eot>[01])"\s*/>"#)
        .expect("footer pattern is valid")
});

/// Sequencing marker parsed from a fragment's footer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub number: u32,
    pub end_of_transmission: bool,
}

/// Parse the footer element of a fragment, if it has a well-formed one.
pub fn parse_footer(packet: &str) -> Option<Footer> {
    let caps = FOOTER.captures(packet)?;
    let number = caps.name("no")?.as_str().parse().ok()?;
    let end_of_transmission = caps.name("eot")?.as_str() == "1";
    Some(Footer {
        number,
        end_of_transmission,
    })
}

/// Whether a datagram carries XML: an envelope, a declaration, or a footer.
pub fn is_xml_packet(message: &str) -> bool {
    contains_ignore_case(message, "<XML>")
        || contains_ignore_case(message, "<?xml")
        || contains_ignore_case(message, "<Footer")
}

/// The body of a fragment with the command echo, envelope, and footer removed.
///
/// With an XML declaration present the body runs from the declaration up to
/// the footer. Otherwise it is everything after the first comma, minus the
/// footer.
pub fn fragment_body(packet: &str) -> &str {
    if let Some(start) = find_ignore_case(packet, "<?xml") {
        let rest = &packet[start..];
        return match find_ignore_case(rest, "<Footer") {
            Some(end) => &rest[..end],
            None => rest,
        };
    }

    let content = match packet.find(',') {
        Some(comma) => &packet[comma + 1..],
        None => return packet,
    };
    match find_ignore_case(content, "<Footer") {
        Some(end) => &content[..end],
        None => content,
    }
}

/// Reassembly state for one multi-fragment reply.
#[derive(Debug)]
pub struct FragmentAssembler {
    buffer: String,
    last_number: u32,
    prefix: Option<String>,
    /// Generation of the slot this assembly belongs to.
    generation: Option<u64>,
    max_len: usize,
}

impl FragmentAssembler {
    pub fn new(max_len: usize) -> Self {
        Self {
            buffer: String::new(),
            last_number: 0,
            prefix: None,
            generation: None,
            max_len,
        }
    }

    /// Classify and frame one trimmed, non-empty datagram.
    pub fn process(&mut self, message: &str, pending: Option<Pending>) -> Vec<Framed> {
        match pending {
            Some(slot) if slot.kind == ResponseKind::MultiFragment && is_xml_packet(message) => {
                self.assemble(message, slot.generation)
            }
            _ => {
                let mut out = vec![Framed::Message(message.to_string())];
                if let Some(slot) = pending {
                    out.push(Framed::Response {
                        generation: slot.generation,
                        payload: message.to_string(),
                    });
                }
                out
            }
        }
    }

    fn assemble(&mut self, packet: &str, generation: u64) -> Vec<Framed> {
        if self.generation != Some(generation) {
            self.reset();
            self.generation = Some(generation);
        }

        if self.prefix.is_none() {
            if let Some(comma) = packet.find(',').filter(|&i| i > 0) {
                self.prefix = Some(packet[..comma].to_string());
            }
        }

        let mut out = Vec::new();
        let body = fragment_body(packet);

        let Some(footer) = parse_footer(packet) else {
            // No footer: typically the leading echo packet. Content only.
            self.buffer.push_str(body);
            self.check_overflow();
            return out;
        };

        // A sequence number at u32::MAX has no successor; whatever follows
        // it is a gap.
        let expected = self.last_number.wrapping_add(1);
        if footer.number != expected || self.last_number == u32::MAX {
            tracing::warn!(expected, received = footer.number, "UDP packet loss detected");
            out.push(Framed::PacketLoss {
                expected,
                received: footer.number,
            });
        }
        self.last_number = footer.number;
        self.buffer.push_str(body);

        if footer.end_of_transmission {
            let prefix = self.prefix.as_deref().unwrap_or_default();
            let payload = format!("{prefix},{}", self.buffer);
            tracing::debug!(
                fragments = footer.number,
                bytes = payload.len(),
                "multi-fragment reply assembled"
            );
            out.push(Framed::Message(payload.clone()));
            out.push(Framed::Response {
                generation,
                payload,
            });
            self.reset();
        } else {
            self.check_overflow();
        }

        out
    }

    fn check_overflow(&mut self) {
        if self.buffer.len() > self.max_len {
            tracing::warn!(len = self.buffer.len(), "fragment buffer overflow, discarding");
            self.buffer.clear();
        }
    }

    /// Drop all partial assembly state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_number = 0;
        self.prefix = None;
        self.generation = None;
    }

    /// Text accumulated so far for the current reply.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}

impl Default for FragmentAssembler {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}
