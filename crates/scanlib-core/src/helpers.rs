//! Command normalization and formatting helpers.
//!
//! Both bridges run every outbound command through [`normalize_command`]
//! before transmission and before publishing the data-sent event, so the
//! text a subscriber sees is exactly the text on the wire (minus `\r`).

/// Trim surrounding whitespace and uppercase a command.
///
/// # Example
///
/// ```
/// use scanlib_core::normalize_command;
///
/// assert_eq!(normalize_command("  gsi,0 \n"), "GSI,0");
/// ```
pub fn normalize_command(command: &str) -> String {
    command.trim().to_uppercase()
}

/// The base token of a command: everything before the first comma.
///
/// ```
/// use scanlib_core::command_base;
///
/// assert_eq!(command_base("GLT,FL"), "GLT");
/// assert_eq!(command_base("MDL"), "MDL");
/// ```
pub fn command_base(command: &str) -> &str {
    match command.find(',') {
        Some(idx) => command[..idx].trim(),
        None => command.trim(),
    }
}

/// Format a frequency in MHz with the four-decimal display precision the
/// scanner itself uses.
///
/// ```
/// use scanlib_core::format_freq_mhz;
///
/// assert_eq!(format_freq_mhz(154.28), "154.2800 MHz");
/// ```
pub fn format_freq_mhz(freq_mhz: f64) -> String {
    format!("{freq_mhz:.4} MHz")
}

/// Build the RSSI display label from a raw `Rssi` attribute.
pub fn rssi_label(raw: &str) -> String {
    if raw.is_empty() {
        "S0".to_string()
    } else {
        format!("S{raw}")
    }
}
