//! One-shot collection run.

use coletor_delivery::{Client, Credentials, Outcome};
use coletor_facts::{HostPlatform, ProbeSet};

/// Collects a snapshot and submits it to the inventory service.
pub async fn run(credentials: Credentials) -> anyhow::Result<()> {
    let platform = HostPlatform::detect();
    tracing::info!(
        platform = platform.as_str(),
        scheme = ?credentials.scheme,
        endpoint = %credentials.endpoint,
        "collecting system facts"
    );

    let probes = ProbeSet::new(platform);
    let snapshot = probes.snapshot().await;

    let client = Client::new(&credentials)?;
    match client.send(&snapshot).await {
        Ok(Outcome::Inserted) => {
            tracing::info!(serial = %snapshot.serial, "inventory record created");
        }
        Ok(Outcome::Updated) => {
            tracing::info!(serial = %snapshot.serial, "inventory record updated");
        }
        Err(e) => {
            tracing::error!(serial = %snapshot.serial, error = %e, "snapshot delivery failed");
            return Err(e.into());
        }
    }

    Ok(())
}
