//! Appointment scheduler server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appointment_scheduler::{
    api,
    config::AppConfig,
    repository::{memory::InMemoryStore, state_file::JsonStateStore, Repository},
    services::{tracking::spawn_change_tracker, Services},
    system_clock, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("appointment_scheduler={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting appointment scheduler v{}", env!("CARGO_PKG_VERSION"));

    // Calendar data and service catalog come from configuration
    let store = Arc::new(InMemoryStore::new(config.store_seed()?));
    let state_store = Arc::new(JsonStateStore::new(&config.scheduling.state_file));
    tracing::info!("Appointments snapshot at {}", state_store.path().display());

    let repository = Repository::in_memory(store).with_state_store(state_store);
    let records = repository.actual_records.clone();
    let services = Services::new(repository, config.scheduling_settings()?);

    let tracker = spawn_change_tracker(
        services.tracking.clone(),
        records.clone(),
        Duration::from_secs(config.scheduling.reconcile_interval_secs.max(1)),
        |events| {
            for event in events {
                tracing::info!(
                    "Appointment {} {:?}: {} at {}",
                    event.record.id,
                    event.change_type,
                    event.record.title,
                    event.record.period
                );
            }
        },
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        records,
        clock: system_clock(),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    tracker.abort();
    Ok(())
}
