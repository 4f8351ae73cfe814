use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::{DatabaseConnection, check_health};

/// `/ready` for the in-memory backend: nothing to check.
pub fn memory_ready_router() -> Router {
    Router::new().route("/ready", get(|| async { run_health_checks(Vec::new()).await }))
}

/// `/ready` for the postgres backend: pings the pool.
pub fn postgres_ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(postgres_ready))
        .with_state(db)
}

async fn postgres_ready(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "database",
        Box::pin(async { check_health(&db).await.map_err(|e| e.to_string()) }),
    )];

    run_health_checks(checks).await
}
