//! Inventory collector entry point.

mod app;
mod config;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting inventory collector"
    );

    // Resolve credentials before touching the host; a misconfigured agent
    // should fail fast.
    let credentials = config::resolve()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(credentials))?;

    Ok(())
}
