use serde::{Deserialize, Serialize};

/// Asset category reported for every collected endpoint.
pub const ASSET_TYPE_COMPUTER: &str = "Computador";

/// Lifecycle status reported for every collected endpoint.
pub const STATUS_IN_USE: &str = "Em uso";

/// Sentinel for facts no probe could resolve.
pub const UNKNOWN: &str = "Desconhecido";

/// Prefix for serials synthesized from the hostname when the firmware
/// reports none.
pub const AUTO_SERIAL_PREFIX: &str = "AUTO-";

/// One inventory record, built once per run and submitted as-is.
///
/// JSON field names are the service's column names (matching the legacy
/// collector's payload); they are the wire contract and must not drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Host name, shown as the asset's display name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Always [`ASSET_TYPE_COMPUTER`].
    #[serde(rename = "tipo")]
    pub asset_type: String,
    /// Unique key on the service side. Synthesized `AUTO-<hostname>` when
    /// the firmware has no usable serial.
    pub serial: String,
    /// Always [`STATUS_IN_USE`].
    pub status: String,
    /// CPU model string, empty when unresolved.
    #[serde(rename = "processador")]
    pub processor: String,
    /// Human-formatted RAM total, empty when unresolved.
    #[serde(rename = "memoria_ram")]
    pub memory: String,
    /// Tiered capacity of the first physical disk, empty when unresolved.
    #[serde(rename = "armazenamento")]
    pub storage: String,
    /// Reserved column. The service's merge logic inspects it, so it is
    /// serialized as an explicit `null` rather than omitted.
    #[serde(rename = "acesso_remoto")]
    pub remote_access: Option<String>,
    /// OS product name and version.
    #[serde(rename = "sistema_operacional")]
    pub operating_system: String,
    /// Most recent interactive account, [`UNKNOWN`] when unresolved.
    #[serde(rename = "ultimo_usuario")]
    pub last_user: String,
    /// Time since boot as `"<d>d <h>h <m>m"`, [`UNKNOWN`] when unresolved.
    #[serde(rename = "tempo_ligado")]
    pub uptime: String,
}
