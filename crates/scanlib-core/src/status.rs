//! The scanner status snapshot.
//!
//! [`ScannerStatus`] is the single mutable record of device state. One
//! instance is owned by the polling loop and updated in place by the status
//! decoder in `scanlib-uniden`. Every field starts at a defined placeholder,
//! so a reader never sees an uninitialised value even before the first
//! successful decode.

/// Placeholder for a text field the scanner has not reported.
pub const UNKNOWN: &str = "---";

/// Placeholder for an unnamed channel or department.
pub const ELLIPSIS: &str = "...";

/// Placeholder system name while the scanner is hunting for activity.
pub const SCANNING: &str = "SCANNING";

/// Current operating state of the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerStatus {
    // Mode discriminators
    pub mode: String,
    /// Raw screen-kind discriminator (`conventional_scan`, `trunk_scan`, ...).
    pub screen_kind: String,

    // Identity hierarchy
    pub system_name: String,
    pub department_name: String,
    pub site_name: String,
    pub channel_name: String,
    pub monitor_list_name: String,

    // Tuning
    /// Frequency in MHz.
    pub frequency_mhz: f64,
    pub modulation: String,

    // Trunking
    pub talkgroup_id: String,
    pub unit_id: String,
    pub service_type: String,
    pub p25_status: String,

    // Tone-out
    pub tone_a: String,
    pub tone_b: String,

    // Search / discovery
    pub range_lower: String,
    pub range_upper: String,
    pub hit_count: u32,

    // Property block
    /// Display label such as `"S3"`.
    pub rssi_label: String,
    /// Last RSSI reading that parsed as an integer.
    pub rssi_numeric: i32,
    pub volume: i32,
    pub squelch: i32,
    pub mute: String,
    pub attenuator: String,
    pub alert_led: String,
    pub recording: String,
    pub hold: String,
}

impl Default for ScannerStatus {
    fn default() -> Self {
        Self {
            mode: UNKNOWN.into(),
            screen_kind: UNKNOWN.into(),
            system_name: SCANNING.into(),
            department_name: ELLIPSIS.into(),
            site_name: UNKNOWN.into(),
            channel_name: ELLIPSIS.into(),
            monitor_list_name: UNKNOWN.into(),
            frequency_mhz: 0.0,
            modulation: UNKNOWN.into(),
            talkgroup_id: UNKNOWN.into(),
            unit_id: UNKNOWN.into(),
            service_type: UNKNOWN.into(),
            p25_status: UNKNOWN.into(),
            tone_a: UNKNOWN.into(),
            tone_b: UNKNOWN.into(),
            range_lower: UNKNOWN.into(),
            range_upper: UNKNOWN.into(),
            hit_count: 0,
            rssi_label: "S0".into(),
            rssi_numeric: 0,
            volume: 0,
            squelch: 0,
            mute: "Unmute".into(),
            attenuator: "Off".into(),
            alert_led: "Off".into(),
            recording: "Off".into(),
            hold: "Off".into(),
        }
    }
}

impl ScannerStatus {
    /// Create a status record with every field at its placeholder value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an immutable copy for a reader running on a different cadence
    /// than the polling loop.
    pub fn snapshot(&self) -> ScannerStatus {
        self.clone()
    }

    /// `true` when the last property block reported a signal.
    pub fn has_signal(&self) -> bool {
        self.rssi_numeric > 0
    }
}
