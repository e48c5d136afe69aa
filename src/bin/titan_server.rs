//! # Titan Server
//!
//! HTTP server for booking status changes, with the shipment simulation running alongside
//! when enabled.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use titan_logistics::logging::init_structured_logging;
use titan_logistics::orchestration::{AutoProgressScheduler, AutoProgressWorker};
use titan_logistics::persistence::PgBookingRepository;
use titan_logistics::services::StatusTransitionService;
use titan_logistics::web::{self, AppState, IdentitySource};
use titan_logistics::TitanConfig;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TitanConfig::from_env().context("loading configuration")?;
    init_structured_logging(&config.environment, config.log_format);

    info!(
        environment = %config.environment,
        bind_address = %config.bind_address,
        simulation_enabled = config.simulation_enabled,
        "Starting titan-server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running database migrations")?;

    let service = Arc::new(StatusTransitionService::from_repository(
        PgBookingRepository::new(pool.clone()),
    ));

    let scheduler = if config.simulation_enabled {
        let worker = AutoProgressWorker::new(service.clone());
        Some(
            AutoProgressScheduler::new(
                worker,
                config.simulation_interval(),
                config.auto_progress_limit,
            )
            .spawn(),
        )
    } else {
        info!("Shipment simulation disabled");
        None
    };

    let identity = if config.trust_gateway_headers {
        warn!("Trusting gateway identity headers; bearer tokens are not verified");
        IdentitySource::GatewayHeaders
    } else {
        IdentitySource::bearer_token(&config.jwt_secret)
    };

    let app = web::router(AppState::new(service), identity);
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!(address = %config.bind_address, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    pool.close().await;

    if let Err(e) = &served {
        error!(error = %e, "Server terminated with error");
    }
    served.context("serving HTTP")?;

    info!("titan-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
