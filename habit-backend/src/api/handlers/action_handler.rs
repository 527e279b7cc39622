// src/api/handlers/action_handler.rs
use crate::api::dto::action_dto::{
    ActionDto, ActionListResponse, CompletionDto, CreateActionRequest, DayRequest, MonthQuery,
    ToggleCompletionResponse, UpdateNotesRequest,
};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{jwt_auth_middleware, AuthenticatedUser};
use crate::types::ApiResponse;
use axum::{
    extract::{FromRequestParts, Json, Path, Query, State},
    http::{request::Parts, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

/// パスの `{id}` を UUID として取り出す。形式が不正なら 400。
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid path parameter: {}", e)))?;

        Ok(UuidPath(Uuid::parse_str(&raw)?))
    }
}

/// 月内の達成日つきアクション一覧
pub async fn list_actions_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<ApiResponse<ActionListResponse>> {
    let month = app_state.habit_service.resolve_month(query)?;

    info!(user_id = %user.user_id(), month = %month, "Listing actions");

    let list = app_state
        .habit_service
        .list_actions_with_completions(user.user_id(), month)
        .await?;

    Ok(ApiResponse::success(list))
}

pub async fn create_action_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateActionRequest>,
) -> AppResult<impl IntoResponse> {
    info!(user_id = %user.user_id(), "Creating new action");

    let action: ActionDto = app_state
        .habit_service
        .create_action(user.user_id(), payload)
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::success(action)))
}

pub async fn delete_action_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    UuidPath(action_id): UuidPath,
) -> AppResult<StatusCode> {
    info!(user_id = %user.user_id(), action_id = %action_id, "Deleting action");

    app_state
        .habit_service
        .delete_action(user.user_id(), action_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 指定日の達成状態を切り替える
pub async fn toggle_completion_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    UuidPath(action_id): UuidPath,
    Json(payload): Json<DayRequest>,
) -> AppResult<ApiResponse<ToggleCompletionResponse>> {
    let result = app_state
        .habit_service
        .toggle_day_completion(user.user_id(), action_id, payload)
        .await?;

    Ok(ApiResponse::success(result))
}

pub async fn update_notes_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    UuidPath(action_id): UuidPath,
    Json(payload): Json<UpdateNotesRequest>,
) -> AppResult<ApiResponse<CompletionDto>> {
    let record = app_state
        .habit_service
        .set_day_notes(user.user_id(), action_id, payload)
        .await?;

    Ok(ApiResponse::success(record))
}

// --- Router Setup ---

pub fn action_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/actions",
            get(list_actions_handler).post(create_action_handler),
        )
        .route("/actions/{id}", delete(delete_action_handler))
        .route("/actions/{id}/toggle", post(toggle_completion_handler))
        .route("/actions/{id}/notes", patch(update_notes_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_manager.clone(),
            jwt_auth_middleware,
        ))
        .with_state(app_state)
}
