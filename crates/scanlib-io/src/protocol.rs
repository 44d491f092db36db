//! Command classification and wire encoding.
//!
//! The scanner gives no length prefix or end-of-message marker beyond `\r`.
//! Whether a reply is a single line or a multi-line XML document is known
//! up front from the command's base token, so bridges classify each
//! outbound command before registering the pending slot.

use scanlib_core::command_base;

use crate::correlator::ResponseKind;

/// Byte that terminates every command and every plain reply line.
pub const TERMINATOR: u8 = b'\r';

/// Commands whose replies carry an XML document, and the tag that closes it.
pub const XML_COMMANDS: &[(&str, &str)] = &[
    ("GSI", "</ScannerInfo>"),
    ("PSI", "</ScannerInfo>"),
    ("MSI", "</MSI_INFO>"),
    ("GLT", "</GLT>"),
];

/// Commands whose UDP replies span several footer-sequenced datagrams.
pub const MULTI_FRAGMENT_COMMANDS: &[&str] = &["GLT"];

/// The closing tag of the XML document a command replies with, if any.
///
/// ```
/// use scanlib_io::protocol::closing_tag;
///
/// assert_eq!(closing_tag("GSI,0"), Some("</ScannerInfo>"));
/// assert_eq!(closing_tag("MDL"), None);
/// ```
pub fn closing_tag(command: &str) -> Option<&'static str> {
    let base = command_base(command);
    XML_COMMANDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(base))
        .map(|&(_, tag)| tag)
}

pub fn is_xml_command(command: &str) -> bool {
    closing_tag(command).is_some()
}

pub fn is_multi_fragment_command(command: &str) -> bool {
    let base = command_base(command);
    MULTI_FRAGMENT_COMMANDS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(base))
}

/// How the serial framer should complete the reply to `command`.
pub fn serial_response_kind(command: &str) -> ResponseKind {
    match closing_tag(command) {
        Some(closing_tag) => ResponseKind::XmlDocument { closing_tag },
        None => ResponseKind::Line,
    }
}

/// How the UDP framer should complete the reply to `command`.
///
/// Single-packet XML replies (`GSI`, `PSI`) arrive whole in one datagram,
/// so only the multi-fragment family needs reassembly.
pub fn udp_response_kind(command: &str) -> ResponseKind {
    if is_multi_fragment_command(command) {
        ResponseKind::MultiFragment
    } else {
        ResponseKind::Line
    }
}

/// Encode a normalized command for the wire.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.as_bytes());
    bytes.push(TERMINATOR);
    bytes
}

/// ASCII case-insensitive substring search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// Byte offset of the first ASCII case-insensitive match of `needle`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.is_empty() {
        return Some(0);
    }
    if n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_tags_by_family() {
        assert_eq!(closing_tag("GSI,0"), Some("</ScannerInfo>"));
        assert_eq!(closing_tag("PSI,500"), Some("</ScannerInfo>"));
        assert_eq!(closing_tag("MSI"), Some("</MSI_INFO>"));
        assert_eq!(closing_tag("GLT,FL"), Some("</GLT>"));
        assert_eq!(closing_tag("gsi"), Some("</ScannerInfo>"));
        assert_eq!(closing_tag("KEY,M,P"), None);
    }

    #[test]
    fn only_glt_is_multi_fragment() {
        assert!(is_multi_fragment_command("GLT,FL"));
        assert!(is_multi_fragment_command("glt"));
        assert!(!is_multi_fragment_command("GSI,0"));
        assert!(!is_multi_fragment_command("MDL"));
    }

    #[test]
    fn response_kinds() {
        assert_eq!(serial_response_kind("MDL"), ResponseKind::Line);
        assert_eq!(
            serial_response_kind("GSI,0"),
            ResponseKind::XmlDocument {
                closing_tag: "</ScannerInfo>"
            }
        );
        assert_eq!(udp_response_kind("GSI,0"), ResponseKind::Line);
        assert_eq!(udp_response_kind("GLT,FL"), ResponseKind::MultiFragment);
    }

    #[test]
    fn encode_appends_carriage_return() {
        assert_eq!(encode_command("MDL"), b"MDL\r".to_vec());
        assert_eq!(encode_command(""), b"\r".to_vec());
    }

    #[test]
    fn case_insensitive_search() {
        assert!(contains_ignore_case("<footer No=\"1\"", "<Footer"));
        assert!(contains_ignore_case("x</scannerinfo>", "</ScannerInfo>"));
        assert!(!contains_ignore_case("<Foo", "<Footer"));
        assert_eq!(find_ignore_case("GLT,<xml>,", "<XML>"), Some(4));
        assert_eq!(find_ignore_case("abc", ""), Some(0));
    }
}
