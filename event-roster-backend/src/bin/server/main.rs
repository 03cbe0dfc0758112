#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    reason = "not yet ready for that"
)]

mod telemetry;

use event_roster_assignment::MemoryStore;
use event_roster_backend::error::AppError;
use event_roster_backend::run_server;
use event_roster_config::get_config;
use event_roster_database::PgStore;
use telemetry::setup_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_tracing();

    let config = get_config()?;

    if let Some(database_url) = config.database_url.clone() {
        let store = PgStore::connect(&database_url)?;
        store.migrate().await?;
        info!("using postgres store");
        run_server(config, store).await?.await
    } else {
        warn!("no database_url configured, events and profiles are kept in memory only");
        run_server(config, MemoryStore::default()).await?.await
    }
}
