// src/api/handlers/stats_handler.rs
use crate::api::dto::action_dto::MonthQuery;
use crate::api::dto::stats_dto::{MonthlyStatsResponse, StatsOverviewResponse};
use crate::api::AppState;
use crate::error::AppResult;
use crate::middleware::auth::{jwt_auth_middleware, AuthenticatedUser};
use crate::types::ApiResponse;
use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Router,
};
use tracing::info;

/// 月間グラフのデータ
pub async fn monthly_stats_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<ApiResponse<MonthlyStatsResponse>> {
    let month = app_state.habit_service.resolve_month(query)?;

    info!(user_id = %user.user_id(), month = %month, "Fetching monthly stats");

    let stats = app_state
        .habit_service
        .monthly_stats(user.user_id(), month)
        .await?;

    Ok(ApiResponse::success(stats))
}

/// 達成率・連続日数などの概要（未来月は 400）
pub async fn stats_overview_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<ApiResponse<StatsOverviewResponse>> {
    let month = app_state.habit_service.resolve_month(query)?;

    info!(user_id = %user.user_id(), month = %month, "Fetching stats overview");

    let overview = app_state
        .habit_service
        .user_stats(user.user_id(), month)
        .await?;

    Ok(ApiResponse::success(overview))
}

pub fn stats_router(app_state: AppState) -> Router {
    Router::new()
        .route("/stats/monthly", get(monthly_stats_handler))
        .route("/stats/overview", get(stats_overview_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_manager.clone(),
            jwt_auth_middleware,
        ))
        .with_state(app_state)
}
