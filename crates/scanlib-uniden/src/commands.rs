//! Uniden SDS-series command builders.
//!
//! Every builder returns the command text without the `\r` terminator. The
//! bridges normalize and terminate outbound commands themselves, so the
//! result can be passed straight to
//! [`ScannerBridge::send_and_receive`](scanlib_core::ScannerBridge::send_and_receive)
//! or [`send_command`](scanlib_core::ScannerBridge::send_command).
//!
//! All functions are pure. Builders that take caller input validate it and
//! return [`Error::InvalidParameter`] rather than emit a command the scanner
//! would reject.

use scanlib_core::{Error, Result};

pub use scanlib_core::command_base;
pub use scanlib_io::protocol::{closing_tag, is_multi_fragment_command, is_xml_command};

// ---------------------------------------------------------------
// Tuning limits
// ---------------------------------------------------------------

/// Lowest frequency accepted by direct entry, in MHz.
pub const MIN_FREQ_MHZ: f64 = 25.0;
/// Highest frequency accepted by direct entry, in MHz.
pub const MAX_FREQ_MHZ: f64 = 1300.0;

/// Direct entry takes frequencies in 100 Hz steps.
const FREQ_STEPS_PER_MHZ: f64 = 10_000.0;

// ---------------------------------------------------------------
// Key actions
// ---------------------------------------------------------------

/// How a simulated key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Short press.
    Press,
    /// Long press.
    Long,
    /// Press and hold until [`KeyAction::Release`].
    Hold,
    Release,
}

impl KeyAction {
    /// The single-letter action code used on the wire.
    pub fn code(&self) -> char {
        match self {
            KeyAction::Press => 'P',
            KeyAction::Long => 'L',
            KeyAction::Hold => 'H',
            KeyAction::Release => 'R',
        }
    }
}

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Model query (`MDL`). Also used as the UDP liveness probe.
pub fn model() -> String {
    "MDL".to_string()
}

/// Full status query (`GSI,0`). The reply is a `ScannerInfo` document.
pub fn get_status() -> String {
    "GSI,0".to_string()
}

/// Ask the scanner to push a status document every `interval_ms`
/// milliseconds (`PSI,<ms>`). An interval of zero stops the push.
pub fn push_status(interval_ms: u32) -> String {
    format!("PSI,{interval_ms}")
}

/// Simulated keypress (`KEY,<code>,<action>`).
///
/// `code` is the scanner's key identifier (`M` for menu, `H` for hold, a
/// digit, ...). It must be a single non-empty token.
pub fn key(code: &str, action: KeyAction) -> Result<String> {
    let code = code.trim();
    if code.is_empty() || code.contains(',') || code.chars().any(char::is_whitespace) {
        return Err(Error::InvalidParameter(format!("invalid key code: {code:?}")));
    }
    Ok(format!("KEY,{},{}", code.to_uppercase(), action.code()))
}

/// Mute or unmute audio (`MUT,ON` / `MUT,OFF`).
pub fn mute(on: bool) -> String {
    format!("MUT,{}", on_off(on))
}

/// Start or stop recording (`REC,ON` / `REC,OFF`).
pub fn record(on: bool) -> String {
    format!("REC,{}", on_off(on))
}

/// Direct frequency entry (`FRE,<freq>`).
///
/// The frequency is sent as 8 zero-padded digits in 100 Hz units, so
/// 154.2800 MHz becomes `FRE,01542800`.
pub fn direct_frequency(freq_mhz: f64) -> Result<String> {
    if !freq_mhz.is_finite() || !(MIN_FREQ_MHZ..=MAX_FREQ_MHZ).contains(&freq_mhz) {
        return Err(Error::InvalidParameter(format!(
            "frequency {freq_mhz} MHz outside {MIN_FREQ_MHZ}-{MAX_FREQ_MHZ} MHz"
        )));
    }
    let steps = (freq_mhz * FREQ_STEPS_PER_MHZ).round() as u64;
    Ok(format!("FRE,{steps:08}"))
}

/// List query (`GLT,<kind>`), e.g. `GLT,FL` for favorites lists.
///
/// Over UDP the reply spans several footer-sequenced datagrams.
pub fn get_list(kind: &str) -> Result<String> {
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(Error::InvalidParameter("list kind must not be empty".into()));
    }
    Ok(format!("GLT,{}", kind.to_uppercase()))
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===============================================================
    // Fixed commands
    // ===============================================================

    #[test]
    fn fixed_commands() {
        assert_eq!(model(), "MDL");
        assert_eq!(get_status(), "GSI,0");
        assert_eq!(push_status(500), "PSI,500");
        assert_eq!(push_status(0), "PSI,0");
    }

    #[test]
    fn toggles() {
        assert_eq!(mute(true), "MUT,ON");
        assert_eq!(mute(false), "MUT,OFF");
        assert_eq!(record(true), "REC,ON");
        assert_eq!(record(false), "REC,OFF");
    }

    // ===============================================================
    // Keys
    // ===============================================================

    #[test]
    fn key_actions() {
        assert_eq!(key("M", KeyAction::Press).unwrap(), "KEY,M,P");
        assert_eq!(key("h", KeyAction::Long).unwrap(), "KEY,H,L");
        assert_eq!(key("5", KeyAction::Hold).unwrap(), "KEY,5,H");
        assert_eq!(key(" 5 ", KeyAction::Release).unwrap(), "KEY,5,R");
    }

    #[test]
    fn key_rejects_bad_codes() {
        for code in ["", "   ", "M,P", "A B"] {
            assert!(matches!(
                key(code, KeyAction::Press),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    // ===============================================================
    // Direct frequency entry
    // ===============================================================

    #[test]
    fn frequency_in_hundred_hertz_steps() {
        assert_eq!(direct_frequency(154.28).unwrap(), "FRE,01542800");
        assert_eq!(direct_frequency(25.0).unwrap(), "FRE,00250000");
        assert_eq!(direct_frequency(1300.0).unwrap(), "FRE,13000000");
        assert_eq!(direct_frequency(851.0125).unwrap(), "FRE,08510125");
    }

    #[test]
    fn frequency_out_of_range() {
        for freq in [0.0, 24.9999, 1300.0001, -154.28, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                direct_frequency(freq),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    // ===============================================================
    // Lists and classification
    // ===============================================================

    #[test]
    fn list_query() {
        assert_eq!(get_list("fl").unwrap(), "GLT,FL");
        assert!(get_list(" ").is_err());
    }

    #[test]
    fn classification_of_built_commands() {
        assert!(is_xml_command(&get_status()));
        assert!(is_xml_command(&push_status(1000)));
        assert!(!is_xml_command(&model()));
        assert!(is_multi_fragment_command(&get_list("FL").unwrap()));
        assert!(!is_multi_fragment_command(&get_status()));
        assert_eq!(closing_tag(&get_status()), Some("</ScannerInfo>"));
        assert_eq!(command_base(&mute(true)), "MUT");
    }
}
