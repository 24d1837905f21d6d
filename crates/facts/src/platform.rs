//! Host platform detection.

/// Platform the agent is running on, detected once at startup and used to
/// select the strategy chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Linux,
    /// Anything else. POSIX strategy chains are used and degrade to the
    /// per-fact fallbacks where the host lacks procfs/sysfs.
    Other,
}

impl HostPlatform {
    /// Detects the current platform.
    pub fn detect() -> Self {
        detect_inner()
    }

    /// Identifier used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostPlatform::Windows => "windows",
            HostPlatform::Linux => "linux",
            HostPlatform::Other => "other",
        }
    }
}

#[cfg(target_os = "windows")]
fn detect_inner() -> HostPlatform {
    HostPlatform::Windows
}

#[cfg(target_os = "linux")]
fn detect_inner() -> HostPlatform {
    HostPlatform::Linux
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn detect_inner() -> HostPlatform {
    HostPlatform::Other
}
