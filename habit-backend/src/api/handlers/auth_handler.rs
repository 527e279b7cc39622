// src/api/handlers/auth_handler.rs
use crate::api::dto::auth_dto::{
    Credentials, CurrentUserResponse, RefreshTokenRequest, SessionResponse, SignoutRequest,
};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{jwt_auth_middleware, AuthenticatedUser};
use crate::types::ApiResponse;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use futures::Stream;
use tracing::info;

/// セッション開始系のレスポンス。トークンを Cookie にも載せる。
fn session_reply(
    app_state: &AppState,
    jar: CookieJar,
    status: StatusCode,
    session: SessionResponse,
) -> impl IntoResponse {
    let jar = app_state.cookie_config.session_jar(jar, &session.tokens);
    (status, jar, ApiResponse::success(session))
}

pub async fn signup_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    info!(email = %payload.email, "Signup requested");
    let session = app_state.auth_service.signup(payload).await?;
    Ok(session_reply(&app_state, jar, StatusCode::CREATED, session))
}

pub async fn signin_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    info!(email = %payload.email, "Signin requested");
    let session = app_state.auth_service.signin(payload).await?;
    Ok(session_reply(&app_state, jar, StatusCode::OK, session))
}

pub async fn refresh_token_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<impl IntoResponse> {
    let session = app_state
        .auth_service
        .refresh(&payload.refresh_token)
        .await?;
    Ok(session_reply(&app_state, jar, StatusCode::OK, session))
}

/// ログアウト
///
/// ボディは省略可。`refresh_token` が無ければ Cookie の値を使う。
pub async fn signout_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SignoutRequest::default()
    } else {
        serde_json::from_slice::<SignoutRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let refresh_token = request.refresh_token.or_else(|| {
        jar.get(&app_state.cookie_config.refresh_token_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    });

    let result = app_state
        .auth_service
        .signout(user.user_id(), refresh_token.as_deref())
        .await?;

    let jar = app_state.cookie_config.cleared_jar(jar);
    Ok((jar, ApiResponse::success(result)))
}

pub async fn me_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<CurrentUserResponse>> {
    Ok(ApiResponse::success(
        app_state.auth_service.me(user.user_id()).await?,
    ))
}

/// 自分のセッション変化を SSE で配信する
///
/// クライアントが切断するとストリームごと購読が破棄される。
pub async fn session_events_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let user_id = user.user_id();
    let subscription = app_state
        .session_bus
        .subscribe(Some(user_id), Some(user_id));

    info!(
        user_id = %user_id,
        subscribers = app_state.session_bus.subscription_count(),
        "Session event stream opened"
    );

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        let sse_event = Event::default().event(event.name()).json_data(&event);
        Some((sse_event, subscription))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn auth_router(app_state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/auth/signout", post(signout_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/events", get(session_events_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.jwt_manager.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/signin", post(signin_handler))
        .route("/auth/refresh", post(refresh_token_handler))
        .merge(authenticated)
        .with_state(app_state)
}
