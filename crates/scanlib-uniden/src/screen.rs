//! The screen-kind discriminator.
//!
//! A `ScannerInfo` document names the scanner's current display in its
//! `V_Screen` attribute. Each screen kind reports its data in a different
//! set of child elements, so the decoder dispatches on [`ScreenKind`].

use std::fmt;

/// Operating screen reported by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    ConventionalScan,
    TrunkScan,
    CustomWithScan,
    CcHitsWithScan,
    CustomSearch,
    QuickSearch,
    CloseCall,
    CcSearching,
    ToneOut,
    WxAlert,
    RepeaterFind,
    ReverseFrequency,
    DirectEntry,
    DiscoveryConventional,
    DiscoveryTrunking,
    AnalyzeSystemStatus,
    Analyze,
    /// A screen this library does not know. Decoded as a conventional scan.
    Other(String),
}

impl ScreenKind {
    /// Map a `V_Screen` value to its variant.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "conventional_scan" => ScreenKind::ConventionalScan,
            "trunk_scan" => ScreenKind::TrunkScan,
            "custom_with_scan" => ScreenKind::CustomWithScan,
            "cchits_with_scan" => ScreenKind::CcHitsWithScan,
            "custom_search" => ScreenKind::CustomSearch,
            "quick_search" => ScreenKind::QuickSearch,
            "close_call" => ScreenKind::CloseCall,
            "cc_searching" => ScreenKind::CcSearching,
            "tone_out" => ScreenKind::ToneOut,
            "wx_alert" => ScreenKind::WxAlert,
            "repeater_find" => ScreenKind::RepeaterFind,
            "reverse_frequency" => ScreenKind::ReverseFrequency,
            "direct_entry" => ScreenKind::DirectEntry,
            "discovery_conventional" => ScreenKind::DiscoveryConventional,
            "discovery_trunking" => ScreenKind::DiscoveryTrunking,
            "analyze_system_status" => ScreenKind::AnalyzeSystemStatus,
            "analyze" => ScreenKind::Analyze,
            other => ScreenKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScreenKind::ConventionalScan => "conventional_scan",
            ScreenKind::TrunkScan => "trunk_scan",
            ScreenKind::CustomWithScan => "custom_with_scan",
            ScreenKind::CcHitsWithScan => "cchits_with_scan",
            ScreenKind::CustomSearch => "custom_search",
            ScreenKind::QuickSearch => "quick_search",
            ScreenKind::CloseCall => "close_call",
            ScreenKind::CcSearching => "cc_searching",
            ScreenKind::ToneOut => "tone_out",
            ScreenKind::WxAlert => "wx_alert",
            ScreenKind::RepeaterFind => "repeater_find",
            ScreenKind::ReverseFrequency => "reverse_frequency",
            ScreenKind::DirectEntry => "direct_entry",
            ScreenKind::DiscoveryConventional => "discovery_conventional",
            ScreenKind::DiscoveryTrunking => "discovery_trunking",
            ScreenKind::AnalyzeSystemStatus => "analyze_system_status",
            ScreenKind::Analyze => "analyze",
            ScreenKind::Other(raw) => raw,
        }
    }

    /// Screens that identify traffic by talkgroup rather than frequency.
    pub fn is_trunked(&self) -> bool {
        matches!(
            self,
            ScreenKind::TrunkScan | ScreenKind::DiscoveryTrunking | ScreenKind::AnalyzeSystemStatus
        )
    }

    /// Screens driven by a search range rather than programmed channels.
    pub fn is_search(&self) -> bool {
        matches!(
            self,
            ScreenKind::CustomWithScan
                | ScreenKind::CustomSearch
                | ScreenKind::QuickSearch
                | ScreenKind::CloseCall
                | ScreenKind::CcSearching
                | ScreenKind::DiscoveryConventional
        )
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
