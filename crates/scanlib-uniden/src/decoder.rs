//! Status decoder for `ScannerInfo` documents.
//!
//! A `GSI`/`PSI` reply arrives as `GSI,<XML>,<?xml ...?><ScannerInfo ...>`.
//! [`decode_status`] strips that envelope, parses the document and copies
//! its attributes into a [`ScannerStatus`]. Which child elements carry the
//! interesting data depends on the screen kind, so extraction dispatches
//! on [`ScreenKind`] first and then reads the `Property` and `MonitorList`
//! blocks every screen shares.
//!
//! Decoding is all-or-nothing. Every check that can fail runs before the
//! status is touched, so a truncated or malformed payload leaves the
//! caller's last good snapshot exactly as it was.

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::debug;

use scanlib_core::status::{ELLIPSIS, SCANNING, UNKNOWN};
use scanlib_core::{rssi_label, ScannerStatus};

use crate::screen::ScreenKind;

/// Root element of a status document.
pub const STATUS_ROOT: &str = "ScannerInfo";

const CLOSING_TAG: &str = "</ScannerInfo>";
const ENVELOPE: &str = "<XML>,";

const OFF: &str = "Off";
const UNMUTE: &str = "Unmute";

/// Why a payload was not decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("payload carries no XML document")]
    NoEnvelope,

    #[error("status document is incomplete")]
    Incomplete,

    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("unexpected root element: {0}")]
    UnexpectedRoot(String),
}

/// Strip the `<command>,<XML>,` envelope and return the document text.
///
/// A payload without the envelope is accepted as long as it already starts
/// with `<`.
///
/// ```
/// use scanlib_uniden::decoder::extract_xml;
///
/// assert_eq!(extract_xml("GSI,<XML>,<ScannerInfo/>").unwrap(), "<ScannerInfo/>");
/// assert!(extract_xml("MDL,SDS200").is_err());
/// ```
pub fn extract_xml(payload: &str) -> Result<&str, DecodeError> {
    let data = payload.trim();
    if data.is_empty() {
        return Err(DecodeError::Empty);
    }

    let data = match data.find(ENVELOPE) {
        Some(idx) => data[idx + ENVELOPE.len()..].trim(),
        None => data,
    };

    if data.starts_with('<') {
        Ok(data)
    } else {
        Err(DecodeError::NoEnvelope)
    }
}

/// Decode a status payload into `status`.
///
/// Returns the screen kind the document reported. On error `status` is
/// left unmodified.
pub fn decode_status(status: &mut ScannerStatus, payload: &str) -> Result<ScreenKind, DecodeError> {
    let xml = extract_xml(payload)?;
    if !xml.contains(CLOSING_TAG) {
        return Err(DecodeError::Incomplete);
    }

    let doc = Document::parse(xml).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != STATUS_ROOT {
        return Err(DecodeError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    // Nothing below can fail.
    status.mode = attr(root, "Mode");
    status.screen_kind = attr(root, "V_Screen");
    let kind = ScreenKind::parse(&status.screen_kind);

    match &kind {
        ScreenKind::ConventionalScan | ScreenKind::Other(_) => conventional_scan(root, status),
        ScreenKind::TrunkScan => trunk_scan(root, status),
        ScreenKind::CustomWithScan => {
            system(root, status);
            department(root, status);
            search_frequency(root, status);
            search_range(root, status);
        }
        ScreenKind::CcHitsWithScan => {
            system(root, status);
            department(root, status);
            channel(root, "CcHitsChannel", status);
        }
        ScreenKind::CustomSearch
        | ScreenKind::QuickSearch
        | ScreenKind::CloseCall
        | ScreenKind::CcSearching => {
            search_frequency(root, status);
            search_range(root, status);
        }
        ScreenKind::ToneOut => {
            if let Some(ch) = channel(root, "ToneOutChannel", status) {
                status.tone_a = attr(ch, "ToneA");
                status.tone_b = attr(ch, "ToneB");
            }
        }
        ScreenKind::WxAlert => {
            channel(root, "WxChannel", status);
        }
        ScreenKind::RepeaterFind | ScreenKind::ReverseFrequency | ScreenKind::DirectEntry => {
            search_frequency(root, status);
        }
        ScreenKind::DiscoveryConventional => discovery_conventional(root, status),
        ScreenKind::DiscoveryTrunking => discovery_trunking(root, status),
        ScreenKind::AnalyzeSystemStatus => analyze_system_status(root, status),
        ScreenKind::Analyze => analyze(root, status),
    }

    property(root, status);
    if let Some(list) = child(root, "MonitorList") {
        status.monitor_list_name = attr(list, "Name");
    }

    Ok(kind)
}

/// Boolean form of [`decode_status`] for polling loops that only need to
/// know whether the snapshot moved.
pub fn update_status(status: &mut ScannerStatus, payload: &str) -> bool {
    match decode_status(status, payload) {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "status payload not decoded");
            false
        }
    }
}

/// Parse a frequency attribute such as `"154.2800MHz"` into MHz.
///
/// Returns `None` for an absent (`"---"`), empty or unparsable value.
pub fn parse_frequency_mhz(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw == UNKNOWN {
        return None;
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

// ---------------------------------------------------------------
// Screen-specific extraction
// ---------------------------------------------------------------

fn conventional_scan(root: Node<'_, '_>, s: &mut ScannerStatus) {
    system(root, s);
    department(root, s);
    if let Some(freq) = child(root, "ConvFrequency") {
        s.channel_name = attr(freq, "Name");
        s.modulation = attr(freq, "Mod");
        s.service_type = attr(freq, "SvcType");
        s.hold = attr_or(freq, "Hold", OFF);
        set_frequency(s, freq, "Freq");
    }
}

fn trunk_scan(root: Node<'_, '_>, s: &mut ScannerStatus) {
    system(root, s);
    department(root, s);

    if let Some(site) = child(root, "Site") {
        s.site_name = attr(site, "Name");
        s.modulation = attr(site, "Mod");
    }

    // The literal value "TGID" is a device artifact; it is stored unfiltered.
    if let Some(tgid) = child(root, "TGID") {
        s.channel_name = attr(tgid, "Name");
        s.talkgroup_id = attr(tgid, "TGID");
        s.unit_id = attr(tgid, "U_Id");
        s.service_type = attr(tgid, "SvcType");
        s.hold = attr_or(tgid, "Hold", OFF);
    }

    if let Some(freq) = child(root, "SiteFrequency") {
        set_frequency(s, freq, "Freq");
    }
}

/// Read a named single-channel element (`Name`, `Mod`, `Hold`, `Freq`).
fn channel<'a, 'input>(
    root: Node<'a, 'input>,
    element: &str,
    s: &mut ScannerStatus,
) -> Option<Node<'a, 'input>> {
    let ch = child(root, element)?;
    s.channel_name = attr(ch, "Name");
    s.modulation = attr(ch, "Mod");
    s.hold = attr_or(ch, "Hold", OFF);
    set_frequency(s, ch, "Freq");
    Some(ch)
}

fn discovery_conventional(root: Node<'_, '_>, s: &mut ScannerStatus) {
    let Some(disc) = child(root, "ConventionalDiscovery") else {
        return;
    };
    s.modulation = attr(disc, "Mod");
    s.range_lower = attr(disc, "Lower");
    s.range_upper = attr(disc, "Upper");
    s.talkgroup_id = attr(disc, "TGID");
    s.unit_id = attr(disc, "U_Id");
    set_frequency(s, disc, "Freq");
    set_hit_count(s, disc);
}

fn discovery_trunking(root: Node<'_, '_>, s: &mut ScannerStatus) {
    let Some(disc) = child(root, "TrunkingDiscovery") else {
        return;
    };
    s.system_name = attr_or(disc, "SystemName", SCANNING);
    s.site_name = attr(disc, "SiteName");
    s.talkgroup_id = attr(disc, "TGID");
    s.channel_name = attr(disc, "TgidName");
    s.unit_id = attr(disc, "U_Id");
    set_hit_count(s, disc);
}

fn analyze_system_status(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(ss) = child(root, "SystemStatus") {
        s.system_name = attr_or(ss, "SystemName", SCANNING);
        s.site_name = attr(ss, "SiteName");
        s.attenuator = attr_or(ss, "Att", OFF);
        s.p25_status = attr(ss, "P25Status");
    }
}

fn analyze(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(analyze) = child(root, "Analyze") {
        s.system_name = attr_or(analyze, "SystemName", SCANNING);
        s.site_name = attr(analyze, "SiteName");
        s.channel_name = attr(analyze, "Msg1");
    }
    if let Some(band) = child(root, "WaterfallBand") {
        s.range_lower = attr(band, "Lower");
        s.range_upper = attr(band, "Upper");
        s.modulation = attr(band, "Mod");
        set_frequency(s, band, "Center");
    }
}

// ---------------------------------------------------------------
// Shared elements
// ---------------------------------------------------------------

fn system(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(sys) = child(root, "System") {
        s.system_name = attr_or(sys, "Name", SCANNING);
    }
}

fn department(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(dept) = child(root, "Department") {
        s.department_name = attr_or(dept, "Name", ELLIPSIS);
    }
}

fn search_frequency(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(freq) = child(root, "SrchFrequency") {
        s.modulation = attr(freq, "Mod");
        set_frequency(s, freq, "Freq");
    }
}

fn search_range(root: Node<'_, '_>, s: &mut ScannerStatus) {
    if let Some(range) = child(root, "SearchRange") {
        s.range_lower = attr(range, "Lower");
        s.range_upper = attr(range, "Upper");
    }
}

fn property(root: Node<'_, '_>, s: &mut ScannerStatus) {
    let Some(prop) = child(root, "Property") else {
        return;
    };

    let rssi = prop.attribute("Rssi").unwrap_or("0");
    s.rssi_label = rssi_label(rssi);
    if let Ok(value) = rssi.parse() {
        s.rssi_numeric = value;
    }

    s.mute = attr_or(prop, "Mute", UNMUTE);
    s.attenuator = attr_or(prop, "Att", OFF);
    s.alert_led = attr_or(prop, "A_Led", OFF);
    s.p25_status = attr(prop, "P25Status");
    s.recording = attr_or(prop, "Rec", OFF);

    if let Some(Ok(vol)) = prop.attribute("VOL").map(str::parse) {
        s.volume = vol;
    }
    if let Some(Ok(sql)) = prop.attribute("SQL").map(str::parse) {
        s.squelch = sql;
    }
}

// ---------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn attr(node: Node<'_, '_>, name: &str) -> String {
    attr_or(node, name, UNKNOWN)
}

/// An attribute value, or `fallback` when it is absent or empty.
fn attr_or(node: Node<'_, '_>, name: &str, fallback: &str) -> String {
    match node.attribute(name) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

fn set_frequency(s: &mut ScannerStatus, node: Node<'_, '_>, name: &str) {
    if let Some(freq) = node.attribute(name).and_then(parse_frequency_mhz) {
        s.frequency_mhz = freq;
    }
}

fn set_hit_count(s: &mut ScannerStatus, node: Node<'_, '_>) {
    if let Some(Ok(hits)) = node.attribute("HitCount").map(str::parse) {
        s.hit_count = hits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(screen: &str, body: &str) -> String {
        format!(
            "GSI,<XML>,<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <ScannerInfo Mode=\"Scan\" V_Screen=\"{screen}\">{body}</ScannerInfo>"
        )
    }

    fn decoded(payload: &str) -> ScannerStatus {
        let mut status = ScannerStatus::new();
        decode_status(&mut status, payload).unwrap();
        status
    }

    // ===============================================================
    // Envelope handling
    // ===============================================================

    #[test]
    fn extract_strips_envelope() {
        assert_eq!(
            extract_xml("  GSI,<XML>,  <ScannerInfo/>\r\n").unwrap(),
            "<ScannerInfo/>"
        );
        assert_eq!(
            extract_xml("PSI,<XML>,\r<?xml version=\"1.0\"?>").unwrap(),
            "<?xml version=\"1.0\"?>"
        );
    }

    #[test]
    fn extract_accepts_bare_document() {
        assert_eq!(extract_xml("<ScannerInfo/>").unwrap(), "<ScannerInfo/>");
    }

    #[test]
    fn extract_rejects_non_xml() {
        assert_eq!(extract_xml(""), Err(DecodeError::Empty));
        assert_eq!(extract_xml(" \r\n "), Err(DecodeError::Empty));
        assert_eq!(extract_xml("MDL,SDS200"), Err(DecodeError::NoEnvelope));
        assert_eq!(extract_xml("GSI,<XML>,"), Err(DecodeError::NoEnvelope));
        assert_eq!(extract_xml("TIMEOUT"), Err(DecodeError::NoEnvelope));
    }

    // ===============================================================
    // Conventional and trunked scanning
    // ===============================================================

    #[test]
    fn conventional_scan_reference_document() {
        let payload = "GSI,<XML>,<?xml version=\"1.0\"?><ScannerInfo Mode=\"Scan\" \
                       V_Screen=\"conventional_scan\"><System Name=\"FDNY\"/>\
                       <ConvFrequency Name=\"Dispatch\" Freq=\"154.2800MHz\" Mod=\"FM\"/>\
                       <Property Rssi=\"3\"/></ScannerInfo>";
        let mut status = ScannerStatus::new();
        let kind = decode_status(&mut status, payload).unwrap();

        assert_eq!(kind, ScreenKind::ConventionalScan);
        assert_eq!(status.mode, "Scan");
        assert_eq!(status.screen_kind, "conventional_scan");
        assert_eq!(status.system_name, "FDNY");
        assert_eq!(status.channel_name, "Dispatch");
        assert!((status.frequency_mhz - 154.28).abs() < 1e-4);
        assert_eq!(status.modulation, "FM");
        assert_eq!(status.rssi_numeric, 3);
        assert_eq!(status.rssi_label, "S3");
        // Absent attributes take their fallbacks.
        assert_eq!(status.service_type, "---");
        assert_eq!(status.hold, "Off");
        assert_eq!(status.mute, "Unmute");
        assert_eq!(status.p25_status, "---");
    }

    #[test]
    fn conventional_scan_full_channel() {
        let status = decoded(&doc(
            "conventional_scan",
            "<MonitorList Name=\"Full Database\"/>\
             <System Name=\"County\"/><Department Name=\"Fire\"/>\
             <ConvFrequency Name=\"Fireground\" SvcType=\"Fire Tac\" Mod=\"NFM\" \
              Hold=\"On\" Freq=\"  460.5750MHz\"/>",
        ));
        assert_eq!(status.monitor_list_name, "Full Database");
        assert_eq!(status.department_name, "Fire");
        assert_eq!(status.service_type, "Fire Tac");
        assert_eq!(status.hold, "On");
        assert!((status.frequency_mhz - 460.575).abs() < 1e-4);
    }

    #[test]
    fn trunk_scan_talkgroup() {
        let status = decoded(&doc(
            "trunk_scan",
            "<System Name=\"Metro P25\"/><Department Name=\"Police\"/>\
             <Site Name=\"Downtown\" Mod=\"P25\"/>\
             <TGID Name=\"PD Dispatch\" TGID=\"1234\" U_Id=\"5678\" SvcType=\"Law Dispatch\"/>\
             <SiteFrequency Freq=\"851.0125MHz\"/>",
        ));
        assert_eq!(status.system_name, "Metro P25");
        assert_eq!(status.site_name, "Downtown");
        assert_eq!(status.modulation, "P25");
        assert_eq!(status.channel_name, "PD Dispatch");
        assert_eq!(status.talkgroup_id, "1234");
        assert_eq!(status.unit_id, "5678");
        assert_eq!(status.service_type, "Law Dispatch");
        assert!((status.frequency_mhz - 851.0125).abs() < 1e-4);
    }

    #[test]
    fn literal_tgid_value_is_stored_as_is() {
        let status = decoded(&doc(
            "trunk_scan",
            "<TGID Name=\"\" TGID=\"TGID\"/>",
        ));
        assert_eq!(status.talkgroup_id, "TGID");
        assert_eq!(status.channel_name, "---");
    }

    // ===============================================================
    // Other screens
    // ===============================================================

    #[test]
    fn custom_with_scan_reads_search_range() {
        let status = decoded(&doc(
            "custom_with_scan",
            "<System Name=\"Air\"/><SrchFrequency Freq=\"118.1000MHz\" Mod=\"AM\"/>\
             <SearchRange Lower=\"108.0000MHz\" Upper=\"137.0000MHz\"/>",
        ));
        assert_eq!(status.system_name, "Air");
        assert_eq!(status.modulation, "AM");
        assert!((status.frequency_mhz - 118.1).abs() < 1e-4);
        assert_eq!(status.range_lower, "108.0000MHz");
        assert_eq!(status.range_upper, "137.0000MHz");
    }

    #[test]
    fn search_screens_share_extraction() {
        for screen in ["custom_search", "quick_search", "close_call", "cc_searching"] {
            let status = decoded(&doc(
                screen,
                "<System Name=\"ignored\"/><SrchFrequency Freq=\"162.5500MHz\" Mod=\"FM\"/>\
                 <SearchRange Lower=\"25\" Upper=\"512\"/>",
            ));
            assert_eq!(status.system_name, "SCANNING", "{screen}");
            assert!((status.frequency_mhz - 162.55).abs() < 1e-4, "{screen}");
            assert_eq!(status.range_upper, "512", "{screen}");
        }
    }

    #[test]
    fn cchits_with_scan_channel() {
        let status = decoded(&doc(
            "cchits_with_scan",
            "<CcHitsChannel Name=\"Hit 1\" Mod=\"FM\" Freq=\"453.2500MHz\"/>",
        ));
        assert_eq!(status.channel_name, "Hit 1");
        assert!((status.frequency_mhz - 453.25).abs() < 1e-4);
    }

    #[test]
    fn tone_out_reads_tones() {
        let status = decoded(&doc(
            "tone_out",
            "<ToneOutChannel Name=\"Station 5\" Mod=\"FM\" ToneA=\"600.0Hz\" \
             ToneB=\"1200.0Hz\" Freq=\"154.3850MHz\"/>",
        ));
        assert_eq!(status.channel_name, "Station 5");
        assert_eq!(status.tone_a, "600.0Hz");
        assert_eq!(status.tone_b, "1200.0Hz");
        assert!((status.frequency_mhz - 154.385).abs() < 1e-4);
    }

    #[test]
    fn weather_and_repeater_screens() {
        let status = decoded(&doc(
            "wx_alert",
            "<WxChannel Name=\"WX1\" Mod=\"FM\" Freq=\"162.5500MHz\"/>",
        ));
        assert_eq!(status.channel_name, "WX1");

        for screen in ["repeater_find", "reverse_frequency", "direct_entry"] {
            let status = decoded(&doc(
                screen,
                "<SrchFrequency Freq=\"146.5200MHz\" Mod=\"NFM\"/>",
            ));
            assert_eq!(status.modulation, "NFM", "{screen}");
            assert!((status.frequency_mhz - 146.52).abs() < 1e-4, "{screen}");
        }
    }

    #[test]
    fn discovery_conventional_hits() {
        let status = decoded(&doc(
            "discovery_conventional",
            "<ConventionalDiscovery Mod=\"FM\" Lower=\"150\" Upper=\"160\" \
             Freq=\"155.4750MHz\" HitCount=\"12\"/>",
        ));
        assert_eq!(status.range_lower, "150");
        assert_eq!(status.hit_count, 12);
        assert!((status.frequency_mhz - 155.475).abs() < 1e-4);
        assert_eq!(status.talkgroup_id, "---");
    }

    #[test]
    fn discovery_trunking_names() {
        let status = decoded(&doc(
            "discovery_trunking",
            "<TrunkingDiscovery SystemName=\"\" SiteName=\"North\" TGID=\"42\" \
             TgidName=\"Fire Ops\" HitCount=\"x\"/>",
        ));
        assert_eq!(status.system_name, "SCANNING");
        assert_eq!(status.site_name, "North");
        assert_eq!(status.talkgroup_id, "42");
        assert_eq!(status.channel_name, "Fire Ops");
        assert_eq!(status.hit_count, 0);
    }

    #[test]
    fn analyze_screens() {
        let status = decoded(&doc(
            "analyze_system_status",
            "<SystemStatus SystemName=\"Metro\" SiteName=\"Hill\" Att=\"On\" P25Status=\"Phase II\"/>",
        ));
        assert_eq!(status.system_name, "Metro");
        assert_eq!(status.attenuator, "On");
        assert_eq!(status.p25_status, "Phase II");

        let status = decoded(&doc(
            "analyze",
            "<Analyze SystemName=\"Metro\" Msg1=\"Sweeping\"/>\
             <WaterfallBand Lower=\"400\" Upper=\"470\" Mod=\"FM\" Center=\"435.0000MHz\"/>",
        ));
        assert_eq!(status.channel_name, "Sweeping");
        assert_eq!(status.range_upper, "470");
        assert!((status.frequency_mhz - 435.0).abs() < 1e-4);
    }

    #[test]
    fn unknown_screen_falls_back_to_conventional() {
        let mut status = ScannerStatus::new();
        let kind = decode_status(
            &mut status,
            &doc("band_scope", "<System Name=\"Fallback\"/><ConvFrequency Name=\"Ch\"/>"),
        )
        .unwrap();
        assert_eq!(kind, ScreenKind::Other("band_scope".into()));
        assert_eq!(status.system_name, "Fallback");
        assert_eq!(status.channel_name, "Ch");
    }

    #[test]
    fn missing_root_attributes_fall_back() {
        let status = decoded("<ScannerInfo><System Name=\"X\"/></ScannerInfo>");
        assert_eq!(status.mode, "---");
        assert_eq!(status.screen_kind, "---");
        assert_eq!(status.system_name, "X");
    }

    // ===============================================================
    // Property block
    // ===============================================================

    #[test]
    fn property_block_fields() {
        let status = decoded(&doc(
            "conventional_scan",
            "<Property VOL=\"12\" SQL=\"3\" Sig=\"0\" Att=\"On\" Rec=\"On\" Mute=\"Mute\" \
             A_Led=\"Red\" P25Status=\"Data\" Rssi=\"5\"/>",
        ));
        assert_eq!(status.volume, 12);
        assert_eq!(status.squelch, 3);
        assert_eq!(status.attenuator, "On");
        assert_eq!(status.recording, "On");
        assert_eq!(status.mute, "Mute");
        assert_eq!(status.alert_led, "Red");
        assert_eq!(status.p25_status, "Data");
        assert_eq!(status.rssi_label, "S5");
        assert_eq!(status.rssi_numeric, 5);
    }

    #[test]
    fn unparsable_numbers_keep_previous_values() {
        let mut status = ScannerStatus::new();
        status.rssi_numeric = 4;
        status.volume = 10;
        status.squelch = 2;
        decode_status(
            &mut status,
            &doc("conventional_scan", "<Property Rssi=\"x\" VOL=\"\" SQL=\"high\"/>"),
        )
        .unwrap();
        assert_eq!(status.rssi_label, "Sx");
        assert_eq!(status.rssi_numeric, 4);
        assert_eq!(status.volume, 10);
        assert_eq!(status.squelch, 2);
    }

    #[test]
    fn rssi_absent_or_empty() {
        let status = decoded(&doc("conventional_scan", "<Property/>"));
        assert_eq!(status.rssi_label, "S0");
        assert_eq!(status.rssi_numeric, 0);

        let status = decoded(&doc("conventional_scan", "<Property Rssi=\"\"/>"));
        assert_eq!(status.rssi_label, "S0");
    }

    #[test]
    fn empty_attribute_yields_fallback() {
        let status = decoded(&doc(
            "conventional_scan",
            "<System Name=\"\"/><Department Name=\"\"/>\
             <ConvFrequency Name=\"\" Mod=\"\" Hold=\"\"/><Property Mute=\"\" Att=\"\"/>",
        ));
        assert_eq!(status.system_name, "SCANNING");
        assert_eq!(status.department_name, "...");
        assert_eq!(status.channel_name, "---");
        assert_eq!(status.modulation, "---");
        assert_eq!(status.hold, "Off");
        assert_eq!(status.mute, "Unmute");
        assert_eq!(status.attenuator, "Off");
    }

    // ===============================================================
    // Frequency parsing
    // ===============================================================

    #[test]
    fn frequency_band_edges() {
        assert_eq!(parse_frequency_mhz("25.0000MHz"), Some(25.0));
        assert_eq!(parse_frequency_mhz("6000.0000MHz"), Some(6000.0));
        assert_eq!(parse_frequency_mhz(" 154.2800 MHz"), Some(154.28));
    }

    #[test]
    fn frequency_placeholders_leave_value_unchanged() {
        assert_eq!(parse_frequency_mhz("---"), None);
        assert_eq!(parse_frequency_mhz(""), None);
        assert_eq!(parse_frequency_mhz("MHz"), None);
        assert_eq!(parse_frequency_mhz("1.2.3"), None);

        for raw in ["---", ""] {
            let mut status = ScannerStatus::new();
            status.frequency_mhz = 460.5;
            decode_status(
                &mut status,
                &doc("conventional_scan", &format!("<ConvFrequency Freq=\"{raw}\"/>")),
            )
            .unwrap();
            assert_eq!(status.frequency_mhz, 460.5);
        }
    }

    // ===============================================================
    // Failure leaves the status untouched
    // ===============================================================

    #[test]
    fn incomplete_document_is_rejected() {
        let mut status = ScannerStatus::new();
        status.system_name = "Last Good".into();
        let before = status.clone();

        let err = decode_status(
            &mut status,
            "GSI,<XML>,<?xml version=\"1.0\"?><ScannerInfo Mode=\"Scan\" \
             V_Screen=\"conventional_scan\"><System Name=\"FDNY\"/>",
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::Incomplete);
        assert_eq!(status, before);
    }

    #[test]
    fn malformed_document_is_rejected() {
        let mut status = ScannerStatus::new();
        let before = status.clone();
        let err = decode_status(
            &mut status,
            "<ScannerInfo Mode=\"Scan\"><System Name=\"X\"></ScannerInfo>",
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert_eq!(status, before);
    }

    #[test]
    fn wrong_root_is_rejected() {
        let mut status = ScannerStatus::new();
        let err = decode_status(
            &mut status,
            "<MSI_INFO Name=\"x\"/><!-- </ScannerInfo> -->",
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedRoot("MSI_INFO".into()));
        assert_eq!(status, ScannerStatus::new());
    }

    #[test]
    fn update_status_reports_bool() {
        let mut status = ScannerStatus::new();
        assert!(!update_status(&mut status, ""));
        assert!(!update_status(&mut status, "TIMEOUT"));
        assert!(update_status(
            &mut status,
            &doc("conventional_scan", "<System Name=\"FDNY\"/>")
        ));
        assert_eq!(status.system_name, "FDNY");
    }

    #[test]
    fn entities_and_unicode() {
        let status = decoded(&doc(
            "conventional_scan",
            "<System Name=\"Fire &amp; EMS\"/><ConvFrequency Name=\"Zürich Düsseldorf\"/>",
        ));
        assert_eq!(status.system_name, "Fire & EMS");
        assert_eq!(status.channel_name, "Zürich Düsseldorf");
    }

    #[test]
    fn multi_line_serial_payload() {
        let payload = "GSI,<XML>,\r<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\
                       <ScannerInfo Mode=\"Scan\" V_Screen=\"trunk_scan\">\r\
                       <TGID TGID=\"777\"/>\r</ScannerInfo>";
        let status = decoded(payload);
        assert_eq!(status.talkgroup_id, "777");
    }
}
