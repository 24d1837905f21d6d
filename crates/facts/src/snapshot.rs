//! Snapshot assembly.

use coletor_protocol::{ASSET_TYPE_COMPUTER, AUTO_SERIAL_PREFIX, STATUS_IN_USE, SystemSnapshot};

use crate::linux;
use crate::platform::HostPlatform;
use crate::probe::Probe;
use crate::windows;

/// The full set of fact probes for one platform.
///
/// Built once at startup; [`ProbeSet::snapshot`] runs every probe exactly
/// once, sequentially, and always yields a complete snapshot.
pub struct ProbeSet {
    host: String,
    serial: Probe,
    processor: Probe,
    memory: Probe,
    storage: Probe,
    operating_system: Probe,
    last_user: Probe,
    uptime: Probe,
}

impl ProbeSet {
    /// Builds the strategy chains for the detected platform.
    pub fn new(platform: HostPlatform) -> Self {
        let host = host_name();
        let auto_serial = format!("{AUTO_SERIAL_PREFIX}{host}");

        match platform {
            HostPlatform::Windows => Self {
                serial: windows::serial_probe(auto_serial),
                processor: windows::processor_probe(),
                memory: windows::memory_probe(),
                storage: windows::storage_probe(),
                operating_system: windows::os_probe(),
                last_user: windows::user_probe(),
                uptime: windows::uptime_probe(),
                host,
            },
            HostPlatform::Linux | HostPlatform::Other => Self {
                serial: linux::serial_probe(auto_serial),
                processor: linux::processor_probe(),
                memory: linux::memory_probe(),
                storage: linux::storage_probe(),
                operating_system: linux::os_probe(),
                last_user: linux::user_probe(),
                uptime: linux::uptime_probe(),
                host,
            },
        }
    }

    /// Resolves every fact and assembles the snapshot.
    pub async fn snapshot(&self) -> SystemSnapshot {
        let snapshot = SystemSnapshot {
            name: self.host.clone(),
            asset_type: ASSET_TYPE_COMPUTER.into(),
            serial: self.serial.resolve().await,
            status: STATUS_IN_USE.into(),
            processor: self.processor.resolve().await,
            memory: self.memory.resolve().await,
            storage: self.storage.resolve().await,
            remote_access: None,
            operating_system: self.operating_system.resolve().await,
            last_user: self.last_user.resolve().await,
            uptime: self.uptime.resolve().await,
        };

        tracing::info!(
            host = %snapshot.name,
            serial = %snapshot.serial,
            processor = %snapshot.processor,
            memory = %snapshot.memory,
            storage = %snapshot.storage,
            os = %snapshot.operating_system,
            user = %snapshot.last_user,
            uptime = %snapshot.uptime,
            "facts collected"
        );
        snapshot
    }

    #[cfg(test)]
    pub(crate) fn with_probes(
        host: &str,
        serial: Probe,
        processor: Probe,
        memory: Probe,
        storage: Probe,
        operating_system: Probe,
        last_user: Probe,
        uptime: Probe,
    ) -> Self {
        Self {
            host: host.to_string(),
            serial,
            processor,
            memory,
            storage,
            operating_system,
            last_user,
            uptime,
        }
    }
}

/// Local host name, used for the asset display name and synthesized
/// serials.
fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| coletor_protocol::UNKNOWN.into())
}
