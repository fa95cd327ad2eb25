use anyhow::Result;
use store_results::{initialize_storage, StoreConfig};
use tracing::info;

pub fn run(config: &StoreConfig) -> Result<()> {
    let target = config.storage_target();
    info!("initializing results database at {}", target);

    initialize_storage(&target)?;

    println!("Database and tables created at {}", target);
    Ok(())
}
