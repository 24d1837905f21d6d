//! Windows strategy chains.
//!
//! Primary strategies query CIM through PowerShell; fallbacks use the
//! legacy `wmic` tool (still present on most of the fleet, removed from
//! the newest builds) and finally the process environment. Strategy
//! output parsing is kept in pure functions so it can be tested on any
//! host.

use chrono::{Local, NaiveDateTime};
use coletor_protocol::UNKNOWN;

use crate::exec;
use crate::format;
use crate::parse;
use crate::probe::{FactKind, Probe, ProbeError, Strategy};

const PS_PROCESSOR: &str = "Get-CimInstance Win32_Processor | Select-Object -ExpandProperty Name";
const PS_MEMORY_MB: &str =
    "[math]::Round((Get-CimInstance Win32_ComputerSystem).TotalPhysicalMemory / 1MB)";
const PS_DISK_SIZE: &str = "Get-PhysicalDisk | Select-Object -ExpandProperty Size";
const PS_OS: &str = "((Get-CimInstance Win32_OperatingSystem).Caption + ' ' + (Get-CimInstance Win32_OperatingSystem).Version).Trim()";
const PS_USER: &str = "(Get-CimInstance Win32_ComputerSystem).UserName.Trim()";
const PS_UPTIME: &str = "$u = (Get-Date) - (Get-CimInstance Win32_OperatingSystem).LastBootUpTime; \"$($u.Days)d $($u.Hours)h $($u.Minutes)m\".Trim()";

/// `systeminfo` walks every WMI provider and routinely needs more than the
/// default budget.
const SYSTEMINFO_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

pub(crate) fn serial_probe(fallback: String) -> Probe {
    Probe::new(
        FactKind::Serial,
        vec![Strategy::new("wmic-bios", || async {
            let out = exec::run("wmic", &["bios", "get", "serialnumber"]).await?;
            parse::screen_serial(parse::wmic_value(&out)?)
        })],
        fallback,
    )
}

pub(crate) fn processor_probe() -> Probe {
    Probe::new(
        FactKind::Processor,
        vec![
            Strategy::new("cim-processor", || async {
                // Multi-socket hosts return one line per package.
                parse::first_line(&exec::powershell(PS_PROCESSOR).await?)
            }),
            Strategy::new("wmic-cpu", || async {
                parse::wmic_value(&exec::run("wmic", &["cpu", "get", "name"]).await?)
            }),
            Strategy::new("env-processor", || async {
                exec::env_any(&["PROCESSOR_IDENTIFIER"], "PROCESSOR_IDENTIFIER")
            }),
        ],
        "",
    )
}

pub(crate) fn memory_probe() -> Probe {
    Probe::new(
        FactKind::Memory,
        vec![
            Strategy::new("cim-memory", || async {
                cim_memory_label(&parse::first_line(&exec::powershell(PS_MEMORY_MB).await?)?)
            }),
            Strategy::new("wmic-memory", || async {
                let out = exec::run("wmic", &["computersystem", "get", "totalphysicalmemory"])
                    .await?;
                wmic_memory_label(&parse::wmic_value(&out)?)
            }),
            Strategy::with_timeout("systeminfo", SYSTEMINFO_TIMEOUT, || async {
                let out = exec::run("systeminfo", &[]).await?;
                parse::systeminfo_memory(&out).ok_or(ProbeError::Empty)
            }),
        ],
        "",
    )
}

pub(crate) fn storage_probe() -> Probe {
    Probe::new(
        FactKind::Storage,
        vec![
            Strategy::new("cim-disk", || async {
                disk_label(&parse::first_line(&exec::powershell(PS_DISK_SIZE).await?)?)
            }),
            Strategy::new("wmic-disk", || async {
                let out = exec::run("wmic", &["diskdrive", "get", "size"]).await?;
                disk_label(&parse::wmic_value(&out)?)
            }),
        ],
        "",
    )
}

pub(crate) fn os_probe() -> Probe {
    Probe::new(
        FactKind::OperatingSystem,
        vec![
            Strategy::new("cim-os", || async {
                parse::first_line(&exec::powershell(PS_OS).await?)
            }),
            Strategy::new("wmic-os", || async {
                let out = exec::run("wmic", &["os", "get", "caption,version", "/value"]).await?;
                os_from_value_output(&out)
            }),
            // Generic banner, e.g. "Microsoft Windows [Version 10.0.19045]".
            Strategy::new("cmd-ver", || async {
                parse::first_line(&exec::run("cmd", &["/C", "ver"]).await?)
            }),
        ],
        UNKNOWN,
    )
}

pub(crate) fn user_probe() -> Probe {
    Probe::new(
        FactKind::LastUser,
        vec![
            Strategy::new("cim-user", || async {
                let out = parse::first_line(&exec::powershell(PS_USER).await?)?;
                Ok(strip_domain(&out))
            }),
            Strategy::new("whoami", || async {
                let out = parse::first_line(&exec::run("whoami", &[]).await?)?;
                Ok(strip_domain(&out))
            }),
            Strategy::new("env-user", || async {
                exec::env_any(&["USERNAME", "USER"], "USERNAME/USER")
            }),
        ],
        UNKNOWN,
    )
}

pub(crate) fn uptime_probe() -> Probe {
    Probe::new(
        FactKind::Uptime,
        vec![
            Strategy::new("cim-uptime", || async {
                parse::first_line(&exec::powershell(PS_UPTIME).await?)
            }),
            Strategy::new("wmic-lastboot", || async {
                let out = exec::run("wmic", &["os", "get", "lastbootuptime"]).await?;
                let stamp = parse::wmic_value(&out)?;
                boot_stamp_uptime(&stamp, Local::now().naive_local())
                    .ok_or_else(|| ProbeError::Parse(stamp))
            }),
        ],
        UNKNOWN,
    )
}

/// `DOMAIN\user` -> `user`.
fn strip_domain(user: &str) -> String {
    user.rsplit('\\').next().unwrap_or(user).trim().to_string()
}

/// CIM reports whole megabytes already rounded by PowerShell.
fn cim_memory_label(raw: &str) -> Result<String, ProbeError> {
    let mb: u64 = raw.parse().map_err(|_| ProbeError::Parse(raw.to_string()))?;
    Ok(format::memory_label_mb(mb))
}

/// wmic reports raw bytes; megabytes are truncated like the legacy
/// collector did.
fn wmic_memory_label(raw: &str) -> Result<String, ProbeError> {
    let bytes: u64 = raw.parse().map_err(|_| ProbeError::Parse(raw.to_string()))?;
    Ok(format::memory_label_mb(bytes / format::MIB))
}

fn disk_label(raw: &str) -> Result<String, ProbeError> {
    let bytes: u64 = raw.parse().map_err(|_| ProbeError::Parse(raw.to_string()))?;
    Ok(format::storage_label(bytes))
}

fn os_from_value_output(output: &str) -> Result<String, ProbeError> {
    let caption = parse::wmic_pair(output, "Caption").ok_or(ProbeError::Empty)?;
    Ok(match parse::wmic_pair(output, "Version") {
        Some(version) => format!("{caption} {version}"),
        None => caption,
    })
}

fn boot_stamp_uptime(stamp: &str, now: NaiveDateTime) -> Option<String> {
    format::seconds_since_boot_stamp(stamp, now).map(format::uptime_label)
}
