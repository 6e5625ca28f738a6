use axum::{extract::State, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;

use crate::state::AppState;

pub mod auth;
pub mod candidates;
pub mod clients;
pub mod employers;
pub mod interviews;
pub mod jobs;
pub mod location;
pub mod notifications;
pub mod uploads;

/// Assembles the full REST surface. Middleware layers (trace, cors,
/// compression, request-id) are applied by the server binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/auth", auth::router())
        .nest("/api/employer", employers::router())
        .nest("/api/jobs", jobs::router())
        .nest("/api/candidates", candidates::router())
        .nest("/api/sales/clients", clients::router())
        .nest("/api/notifications", notifications::router())
        .nest("/api/interviews", interviews::router())
        .nest("/api/location", location::router())
        .nest("/api/upload", uploads::router())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.db.get_database_backend();
    let db_ok = state
        .db
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}
