use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tracked_query::{workflow, Store, StoreConfig};

fn main() -> Result<()> {
    // Diagnostics on stderr; stdout carries only the listing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let store = Store::open(StoreConfig::from_env()).context("Failed to open store")?;
    tracing::info!(
        path = %store.config().path.display(),
        version = tracked_query::VERSION,
        "store ready"
    );

    let people = workflow::run(&store).context("Seed/update run failed")?;

    for person in &people {
        println!("{}", person);
    }

    Ok(())
}
