// src/api/mod.rs

//! HTTP 層。ルーターごとのハンドラーと入出力 DTO を持つ。

use crate::config::AppConfig;
use crate::service::{
    auth_service::AuthService, habit_service::HabitService, profile_service::ProfileService,
    session_events::SessionEventBus,
};
use crate::utils::jwt::{JwtManager, TokenPair};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod dto;
pub mod handlers;

/// 各ルーターが共有する状態。クローンは Arc の複製だけで済む。
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub habit_service: Arc<HabitService>,
    pub profile_service: Arc<ProfileService>,
    pub session_bus: Arc<SessionEventBus>,
    pub jwt_manager: Arc<JwtManager>,
    pub db: DatabaseConnection,
    pub cookie_config: CookieConfig,
    pub config: Arc<AppConfig>,
}

/// 認証 Cookie の名前と属性
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub access_token_name: String,
    pub refresh_token_name: String,
    pub secure: bool,
    pub path: String,
}

impl CookieConfig {
    pub fn from_app_config(app_config: &AppConfig) -> Self {
        Self {
            access_token_name: crate::middleware::auth::ACCESS_TOKEN_COOKIE.to_string(),
            refresh_token_name: REFRESH_TOKEN_COOKIE.to_string(),
            secure: app_config.security.cookie_secure,
            path: "/".to_string(),
        }
    }

    /// 発行したトークンを両方 Cookie に載せる
    pub fn session_jar(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.cookie(
            &self.access_token_name,
            tokens.access_token.clone(),
            tokens.access_token_expires_in,
        ))
        .add(self.cookie(
            &self.refresh_token_name,
            tokens.refresh_token.clone(),
            tokens.refresh_token_expires_in,
        ))
    }

    /// 両方の認証 Cookie を即時失効させる
    pub fn cleared_jar(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.cookie(&self.access_token_name, String::new(), 0))
            .add(self.cookie(&self.refresh_token_name, String::new(), 0))
    }

    fn cookie(&self, name: &str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }
}

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
