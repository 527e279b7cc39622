// src/api/handlers/system_handler.rs
use crate::api::AppState;
use crate::db;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub environment: String,
    pub version: String,
}

/// ヘルスチェック（DB に接続できなければ 503）
pub async fn health_check_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match db::ping(&app_state.db).await {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "Database health check failed");
            false
        }
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database_ok { "ok" } else { "degraded" }.to_string(),
            database: if database_ok { "connected" } else { "unavailable" }.to_string(),
            environment: app_state.config.environment.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .with_state(app_state)
}
