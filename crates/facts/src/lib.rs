//! System fact probes for the coletor inventory agent.
//!
//! Every hardware/software fact (serial, CPU, RAM, storage, OS, last user,
//! uptime) is resolved through an ordered chain of strategies: CIM queries
//! and legacy wmic on Windows, procfs/sysfs reads and DMI tools on Linux.
//! Each strategy failure is recovered and the chain moves on; exhausting a
//! chain yields that fact's documented fallback, so collection always
//! produces a complete snapshot.

mod exec;
mod format;
mod linux;
mod parse;
mod platform;
mod probe;
mod snapshot;
mod windows;

pub use platform::HostPlatform;
pub use probe::{FactKind, Probe, ProbeError, Strategy};
pub use snapshot::ProbeSet;
