//! Text extraction helpers for command output.
//!
//! Kept as pure functions so the Windows-only tool formats can be tested
//! on any host.

use crate::probe::ProbeError;

/// Firmware values that mean "no serial programmed".
const SERIAL_PLACEHOLDERS: &[&str] = &["To be filled by O.E.M.", "Not Specified"];

/// Extracts the value row of a `wmic <class> get <property>` table: the
/// first non-empty line is the column header, the next one the value.
pub(crate) fn wmic_value(output: &str) -> Result<String, ProbeError> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let _header = lines.next().ok_or(ProbeError::Empty)?;
    lines.next().map(str::to_string).ok_or(ProbeError::Empty)
}

/// Extracts one `Key=Value` pair from `wmic ... /value` output.
pub(crate) fn wmic_pair(output: &str, key: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| {
            line.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

/// Rejects empty serials and firmware placeholder strings.
pub(crate) fn screen_serial(value: String) -> Result<String, ProbeError> {
    let v = value.trim();
    if v.is_empty() || SERIAL_PLACEHOLDERS.iter().any(|p| v.eq_ignore_ascii_case(p)) {
        return Err(ProbeError::Empty);
    }
    Ok(v.to_string())
}

/// Finds the total-physical-memory line in `systeminfo` output and returns
/// the text after the colon verbatim. Matches the pt-BR and English locale
/// labels, which are the ones in the fleet.
pub(crate) fn systeminfo_memory(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| {
            let lower = line.to_lowercase();
            if lower.contains("física total") || lower.contains("total physical memory") {
                line.split_once(':').map(|(_, value)| value.trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty())
}

/// First non-empty trimmed line of a command's output.
pub(crate) fn first_line(output: &str) -> Result<String, ProbeError> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .ok_or(ProbeError::Empty)
}
