//! `\r`-delimited framer for the serial byte stream.
//!
//! Bytes accumulate until a carriage return completes a line. Every line is
//! published as a [`Framed::Message`]. What happens next depends on the
//! pending slot:
//!
//! - [`ResponseKind::Line`]: the line is the reply.
//! - [`ResponseKind::XmlDocument`]: lines accumulate, each re-terminated
//!   with `\r`, until one contains the closing tag (ASCII case-insensitive).
//!   The trimmed accumulation is the reply.
//! - nothing pending: the line is unsolicited and only published.
//!
//! Lines are kept as bytes until the terminator arrives so a multi-byte
//! UTF-8 character split across two reads decodes intact.

use crate::correlator::{Pending, ResponseKind};
use crate::protocol::{contains_ignore_case, TERMINATOR};
use crate::Framed;

/// Serial line framer with an XML document accumulator.
#[derive(Debug)]
pub struct LineFramer {
    line: Vec<u8>,
    /// Set after an overflow; bytes are dropped until the next terminator.
    discarding: bool,
    xml: String,
    /// Generation of the slot the XML accumulator belongs to.
    xml_generation: Option<u64>,
    max_len: usize,
}

impl LineFramer {
    pub fn new(max_len: usize) -> Self {
        Self {
            line: Vec::new(),
            discarding: false,
            xml: String::new(),
            xml_generation: None,
            max_len,
        }
    }

    /// Feed one chunk read from the port.
    ///
    /// `pending` is the slot as it stood when the chunk arrived. Once a
    /// reply for it is produced, the rest of the chunk is treated as
    /// unsolicited.
    pub fn process_chunk(&mut self, chunk: &[u8], mut pending: Option<Pending>) -> Vec<Framed> {
        let mut out = Vec::new();

        for &byte in chunk {
            if byte != TERMINATOR {
                if self.discarding {
                    continue;
                }
                self.line.push(byte);
                if self.line.len() > self.max_len {
                    tracing::warn!(len = self.line.len(), "serial line overflow, discarding");
                    self.line.clear();
                    self.discarding = true;
                }
                continue;
            }

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.line.is_empty() {
                continue;
            }
            let line = String::from_utf8_lossy(&self.line).into_owned();
            self.line.clear();
            out.push(Framed::Message(line.clone()));

            let Some(slot) = pending else {
                continue;
            };
            match slot.kind {
                ResponseKind::XmlDocument { closing_tag } => {
                    if let Some(payload) = self.accumulate_xml(slot.generation, &line, closing_tag) {
                        out.push(Framed::Response {
                            generation: slot.generation,
                            payload,
                        });
                        pending = None;
                    }
                }
                ResponseKind::Line | ResponseKind::MultiFragment => {
                    out.push(Framed::Response {
                        generation: slot.generation,
                        payload: line,
                    });
                    pending = None;
                }
            }
        }

        out
    }

    /// Append a line to the document for `generation`; return the finished
    /// document once the closing tag shows up.
    fn accumulate_xml(&mut self, generation: u64, line: &str, closing_tag: &str) -> Option<String> {
        if self.xml_generation != Some(generation) {
            self.xml.clear();
            self.xml_generation = Some(generation);
        }

        self.xml.push_str(line);
        self.xml.push(TERMINATOR as char);

        if contains_ignore_case(line, closing_tag) {
            let document = self.xml.trim().to_string();
            self.xml.clear();
            self.xml_generation = None;
            return Some(document);
        }

        if self.xml.len() > self.max_len {
            tracing::warn!(len = self.xml.len(), "XML accumulator overflow, discarding");
            self.xml.clear();
        }
        None
    }

    /// Discard any partial line and document.
    pub fn reset(&mut self) {
        self.line.clear();
        self.discarding = false;
        self.xml.clear();
        self.xml_generation = None;
    }

    /// Bytes buffered toward the current line.
    pub fn buffered(&self) -> usize {
        self.line.len()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}
