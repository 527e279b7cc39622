// src/middleware/auth.rs

use crate::config::AppConfig;
use crate::domain::user_model::UserClaims;
use crate::error::AppError;
use crate::utils::jwt::JwtManager;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};
use uuid::Uuid;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// 認証済みユーザー情報を格納するエクステンション
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: UserClaims,
    pub access_token: String,
}

impl AuthenticatedUser {
    pub fn new(claims: UserClaims, access_token: String) -> Self {
        Self {
            claims,
            access_token,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.claims.user_id
    }
}

/// JWT認証ミドルウェア
///
/// 保護されたルートに `route_layer` で付ける。検証済みのユーザーを
/// リクエストのエクステンションに入れる。
pub async fn jwt_auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    headers: HeaderMap,
    cookie_jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = extract_token(&headers, &cookie_jar, ACCESS_TOKEN_COOKIE).ok_or_else(|| {
        warn!(path = %path, "Missing authentication token");
        AppError::Unauthorized("Authentication required".to_string())
    })?;

    let access_claims = jwt_manager.verify_access_token(&token).map_err(|e| {
        warn!(path = %path, error = %e, "Invalid access token");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user_claims = access_claims.user;
    if !user_claims.is_active {
        warn!(user_id = %user_claims.user_id, path = %path, "Access attempt with inactive account");
        return Err(AppError::Forbidden("Account is inactive".to_string()));
    }

    debug!(user_id = %user_claims.user_id, path = %path, "Authenticated request");

    request
        .extensions_mut()
        .insert(AuthenticatedUser::new(user_claims, token));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// CORS ミドルウェア設定
///
/// 許可オリジンは `CORS_ALLOWED_ORIGINS`（カンマ区切り）。解釈できない値は無視する。
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true) // Cookie送信を許可
        .max_age(Duration::from_secs(3600))
}

/// セキュリティヘッダーミドルウェア
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    let security_headers: [(&'static str, &'static str); 4] = [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
    ];
    for (name, value) in security_headers {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

// --- ヘルパー関数 ---

/// Authorization ヘッダー、無ければ Cookie からトークンを取り出す
pub fn extract_token(
    headers: &HeaderMap,
    cookie_jar: &CookieJar,
    cookie_name: &str,
) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let cookie_token = || {
        cookie_jar
            .get(cookie_name)
            .map(|cookie| cookie.value().to_string())
    };

    auth_header.or_else(cookie_token)
}
