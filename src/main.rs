//! ChekwasMed API
//!
//! Main application entry point

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use chekwasmed::{
    config::Settings,
    create_router,
    database::{create_pool, run_migrations, seed::seed_catalog, MedicationRepository},
    services::CacheService,
    utils::logging,
    AppState,
};

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes file output on exit
    let _log_guard = logging::init_logging(&settings.logging)?;
    settings.warn_insecure_defaults();

    info!("Starting {}...", chekwasmed::info());

    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;

    if settings.database.run_migrations {
        run_migrations(&pool).await?;
    }

    if settings.catalog.seed_on_startup {
        seed_catalog(&MedicationRepository::new(pool.clone())).await?;
    }

    let cache = if settings.features.search_cache {
        info!("Connecting to Redis...");
        match CacheService::connect(&settings.redis).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, search cache disabled");
                None
            }
        }
    } else {
        None
    };

    let address = settings.bind_address();
    let state = AppState::new(settings, pool, cache);

    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = limiter.cleanup_old_entries() {
                warn!(error = %e, "Rate limit cleanup failed");
            }
        }
    });

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!("ChekwasMed API listening on {}", address);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ChekwasMed API has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
