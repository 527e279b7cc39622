// src/api/handlers/profile_handler.rs
use crate::api::dto::profile_dto::{ProfileResponse, UpdateProfileRequest};
use crate::api::AppState;
use crate::error::AppResult;
use crate::middleware::auth::{jwt_auth_middleware, AuthenticatedUser};
use crate::types::ApiResponse;
use axum::{
    extract::{Json, State},
    middleware,
    routing::get,
    Router,
};
use tracing::info;

pub async fn get_profile_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = app_state.profile_service.get_profile(user.user_id()).await?;
    Ok(ApiResponse::success(profile))
}

/// オンボーディング情報を保存する
pub async fn update_profile_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    info!(user_id = %user.user_id(), role = %payload.role, "Saving profile");

    let profile = app_state
        .profile_service
        .save_profile(user.user_id(), payload)
        .await?;

    Ok(ApiResponse::success_with_message(
        profile,
        "Onboarding completed",
    ))
}

pub fn profile_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_manager.clone(),
            jwt_auth_middleware,
        ))
        .with_state(app_state)
}
