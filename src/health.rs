use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,

    /// None when the service runs without a database backend.
    pub database_connection: Option<bool>,

    pub version: String,
}

/// Check the health of the service and its database.
pub async fn check_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database_connection = match &state.db_pool {
        Some(pool) => Some(
            sqlx::query("SELECT 1")
                .execute(pool.as_ref())
                .await
                .is_ok(),
        ),
        None => None,
    };

    let status = if database_connection == Some(false) {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database_connection,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
