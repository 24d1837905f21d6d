//! Human-readable formatting shared by probe strategies.
//!
//! Output formats match what the inventory service already stores for the
//! fleet: pt-BR dot-grouped megabytes, whole-GB/TB disk labels, and
//! `"<d>d <h>h <m>m"` uptimes.

use chrono::NaiveDateTime;

pub(crate) const MIB: u64 = 1024 * 1024;
pub(crate) const GIB: u64 = 1024 * 1024 * 1024;

/// Formats an integer with dot thousands separators (`10116` -> `"10.116"`).
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Formats a megabyte total the way the Windows strategies report RAM.
pub(crate) fn memory_label_mb(mb: u64) -> String {
    format!("{} MB", group_thousands(mb))
}

/// Tiers a raw disk capacity into the label the inventory UI expects.
///
/// Drives at or above 900 GB are marketed in terabytes, so they are
/// reported as whole TB; everything below stays in whole GB.
pub(crate) fn storage_label(bytes: u64) -> String {
    let gb = (bytes as f64 / GIB as f64).round() as u64;
    if gb >= 900 {
        format!("{} TB", (gb as f64 / 1024.0).round() as u64)
    } else {
        format!("{gb} GB")
    }
}

/// Formats seconds since boot as `"<d>d <h>h <m>m"`.
pub(crate) fn uptime_label(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

/// Parses a WMI boot timestamp (`yyyymmddHHMMSS` prefix, local time) and
/// returns seconds elapsed until `now`.
pub(crate) fn seconds_since_boot_stamp(stamp: &str, now: NaiveDateTime) -> Option<u64> {
    let digits = stamp.get(..14)?;
    let boot = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()?;
    let seconds = now.signed_duration_since(boot).num_seconds();
    u64::try_from(seconds).ok()
}
