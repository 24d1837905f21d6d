//! Linux strategy chains.
//!
//! Facts come from procfs/sysfs where possible; the serial needs the DMI
//! table (`dmidecode` when the agent runs privileged, the sysfs export
//! otherwise). These chains also serve unrecognized POSIX platforms,
//! where the procfs strategies simply fail through to the fallbacks.

use std::path::Path;

use coletor_protocol::UNKNOWN;

use crate::exec;
use crate::format;
use crate::parse;
use crate::probe::{FactKind, Probe, ProbeError, Strategy};

const SYS_DMI_SERIAL: &str = "/sys/class/dmi/id/product_serial";
const SYS_BLOCK: &str = "/sys/block";

pub(crate) fn serial_probe(fallback: String) -> Probe {
    Probe::new(
        FactKind::Serial,
        vec![
            Strategy::new("dmidecode", || async {
                let out = exec::run("dmidecode", &["-s", "system-serial-number"]).await?;
                parse::screen_serial(parse::first_line(&out)?)
            }),
            Strategy::new("sysfs-dmi", || async {
                let raw = read_trimmed(Path::new(SYS_DMI_SERIAL)).ok_or(ProbeError::Empty)?;
                parse::screen_serial(raw)
            }),
        ],
        fallback,
    )
}

pub(crate) fn processor_probe() -> Probe {
    Probe::new(
        FactKind::Processor,
        vec![Strategy::new("proc-cpuinfo", || async {
            let content =
                read_trimmed(Path::new("/proc/cpuinfo")).ok_or(ProbeError::Empty)?;
            cpu_model(&content).ok_or(ProbeError::Empty)
        })],
        "",
    )
}

pub(crate) fn memory_probe() -> Probe {
    Probe::new(
        FactKind::Memory,
        vec![Strategy::new("proc-meminfo", || async {
            let content =
                read_trimmed(Path::new("/proc/meminfo")).ok_or(ProbeError::Empty)?;
            meminfo_label(&content).ok_or(ProbeError::Empty)
        })],
        "",
    )
}

pub(crate) fn storage_probe() -> Probe {
    Probe::new(
        FactKind::Storage,
        vec![Strategy::new("sys-block", || async {
            let bytes = first_disk_bytes(Path::new(SYS_BLOCK)).ok_or(ProbeError::Empty)?;
            Ok(format::storage_label(bytes))
        })],
        "",
    )
}

pub(crate) fn os_probe() -> Probe {
    Probe::new(
        FactKind::OperatingSystem,
        vec![
            Strategy::new("os-release", || async {
                let content =
                    read_trimmed(Path::new("/etc/os-release")).ok_or(ProbeError::Empty)?;
                let pretty = os_release_pretty(&content).ok_or(ProbeError::Empty)?;
                Ok(match exec::run("uname", &["-r"]).await {
                    Ok(release) => format!("{pretty} {release}"),
                    Err(_) => pretty,
                })
            }),
            Strategy::new("uname-sr", || async {
                parse::first_line(&exec::run("uname", &["-sr"]).await?)
            }),
        ],
        UNKNOWN,
    )
}

pub(crate) fn user_probe() -> Probe {
    Probe::new(
        FactKind::LastUser,
        vec![
            Strategy::new("id-un", || async {
                parse::first_line(&exec::run("id", &["-un"]).await?)
            }),
            Strategy::new("env-user", || async {
                exec::env_any(&["USER", "USERNAME"], "USER/USERNAME")
            }),
        ],
        UNKNOWN,
    )
}

pub(crate) fn uptime_probe() -> Probe {
    Probe::new(
        FactKind::Uptime,
        vec![Strategy::new("proc-uptime", || async {
            let content =
                read_trimmed(Path::new("/proc/uptime")).ok_or(ProbeError::Empty)?;
            uptime_from_proc(&content).ok_or_else(|| ProbeError::Parse(content))
        })],
        UNKNOWN,
    )
}

/// Reads a file and trims whitespace.
fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `model name` value in `/proc/cpuinfo`.
fn cpu_model(content: &str) -> Option<String> {
    content
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `MemTotal` from `/proc/meminfo`, as whole (truncated) megabytes.
fn meminfo_label(content: &str) -> Option<String> {
    let kb = content
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line["MemTotal:".len()..].split_whitespace().next())
        .and_then(|value| value.parse::<u64>().ok())?;
    Some(format!("{} MB", kb / 1024))
}

/// `PRETTY_NAME` value from `/etc/os-release`, quotes stripped.
fn os_release_pretty(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// First float of `/proc/uptime`, formatted as `"<d>d <h>h <m>m"`.
fn uptime_from_proc(content: &str) -> Option<String> {
    let seconds = content
        .split_whitespace()
        .next()
        .and_then(|value| value.parse::<f64>().ok())?;
    Some(format::uptime_label(seconds as u64))
}

/// Whole-device names under `/sys/block` that are physical disks (loop,
/// ram, zram, device-mapper and optical entries are not).
fn is_physical_disk(name: &str) -> bool {
    ["sd", "nvme", "vd", "xvd", "hd", "mmcblk"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Capacity in bytes of the first physical disk under `base`. The sysfs
/// `size` file counts 512-byte sectors regardless of the device's real
/// sector size.
fn first_disk_bytes(base: &Path) -> Option<u64> {
    let mut disks: Vec<String> = std::fs::read_dir(base)
        .ok()?
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_physical_disk(name))
        .collect();
    disks.sort();

    let first = disks.first()?;
    let sectors = read_trimmed(&base.join(first).join("size"))?
        .parse::<u64>()
        .ok()?;
    Some(sectors * 512)
}
