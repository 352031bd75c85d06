//! Main entry point for the Quince server.
//!
//! Connects to the database, brings the schema up to date, initializes
//! capacity rows and keeps usage counters corrected until shutdown.

use quince_config::{CapacityService, ConfigPersistService};
use quince_migration::{Migrator, MigratorTrait};
use quince_server::{model::Configuration, startup};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::new()?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let database_connection = configuration.database_connection().await?;
    Migrator::up(&database_connection, None).await?;
    info!("Database schema is up to date");

    let config_service = ConfigPersistService::new(database_connection.clone());
    let config_count = config_service.config_info_count().await?;
    info!(config_count = config_count, "Config persistence service ready");

    let capacity_service =
        CapacityService::new(database_connection.clone(), configuration.capacity_settings());
    let shutdown = startup::wait_for_shutdown_signal();
    let mut shutdown_rx = shutdown.subscribe();

    let correction_handle = if capacity_service.settings().manage_capacity {
        let correction_rx = shutdown.subscribe();
        if let Err(e) = capacity_service.init_all_capacity().await {
            error!("Failed to initialize capacity rows: {}", e);
        }
        Some(capacity_service.spawn_usage_correction(correction_rx))
    } else {
        info!("Capacity management disabled");
        None
    };

    let _ = shutdown_rx.recv().await;

    if let Some(handle) = correction_handle
        && let Err(e) = handle.await
    {
        warn!("Usage correction task ended abnormally: {}", e);
    }

    database_connection.close().await?;
    info!("Shutdown complete");

    Ok(())
}
