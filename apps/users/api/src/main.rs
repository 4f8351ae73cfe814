use axum::Router;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{
    InMemoryUserRepository, PgUserRepository, UserRepository, UserService, handlers,
};
use eyre::WrapErr;
use std::fs::OpenOptions;
use tracing::info;

mod config;
mod openapi;
mod ready;

use config::{Config, StorageBackend};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    let request_log = config
        .request_log_file
        .as_ref()
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open request log {}", path.display()))
        })
        .transpose()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment, request_log);

    match (config.storage, config.database.clone()) {
        (StorageBackend::Postgres, Some(database)) => {
            info!("Using PostgreSQL user storage");
            let db = database::postgres::connect_from_config(database)
                .await
                .wrap_err("PostgreSQL connection failed")?;
            let repository = PgUserRepository::connect(db.clone())
                .await
                .wrap_err("Failed to prepare users schema")?;

            serve(&config, repository, ready::postgres_ready_router(db)).await
        }
        (StorageBackend::Postgres, None) => {
            Err(eyre::eyre!("Postgres storage selected without DATABASE_URL"))
        }
        (StorageBackend::Memory, _) => {
            info!("Using in-memory user storage");
            serve(
                &config,
                InMemoryUserRepository::new(),
                ready::memory_ready_router(),
            )
            .await
        }
    }
}

/// Serves the users API over `repository` until shutdown, then closes it once.
async fn serve<R>(config: &Config, repository: R, ready: Router) -> eyre::Result<()>
where
    R: UserRepository + Clone + 'static,
{
    let service = UserService::new(repository.clone());
    let api_routes = Router::new().nest(handlers::USERS_PATH, handlers::router(service));

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes);

    // - /health: liveness check with app name/version
    // - /ready: readiness check against the storage backend
    let app = router.merge(health_router(config.app)).merge(ready);

    let shutdown_timeout = config.server.shutdown_timeout;
    info!(
        "Starting users API with graceful shutdown ({:?} cleanup timeout)",
        shutdown_timeout
    );

    create_production_app(app, &config.server, shutdown_timeout, async move {
        info!("Shutting down: closing user storage");
        match repository.close().await {
            Ok(()) => info!("User storage closed successfully"),
            Err(e) => tracing::error!("Error closing user storage: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
