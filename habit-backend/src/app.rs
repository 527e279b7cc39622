// src/app.rs

//! アプリケーションコンテキスト
//!
//! DB接続・各リポジトリ・サービスを起動時に一度だけ組み立て、
//! 終了時に `shutdown` で明示的に破棄する。

use crate::api::handlers::{
    action_handler::action_router, auth_handler::auth_router, profile_handler::profile_router,
    stats_handler::stats_router, system_handler::system_router,
};
use crate::api::{AppState, CookieConfig};
use crate::config::{AppConfig, ConfigError};
use crate::db::{self, DbPool};
use crate::domain::calendar::{Clock, SystemClock};
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{cors_layer, security_headers_middleware};
use crate::repository::{
    action_repository::ActionRepository, refresh_token_repository::RefreshTokenRepository,
    user_profile_repository::UserProfileRepository, user_repository::UserRepository, HabitStore,
};
use crate::service::{
    auth_service::AuthService, habit_service::HabitService, profile_service::ProfileService,
    session_events::SessionEventBus,
};
use crate::utils::jwt::{JwtError, JwtManager};
use crate::utils::password::{PasswordError, PasswordManager};
use axum::{middleware as axum_middleware, Router};
use migration::{Migrator, MigratorTrait};
use sea_orm::DbErr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JWT configuration error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Password configuration error: {0}")]
    Password(#[from] PasswordError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppContext {
    config: Arc<AppConfig>,
    db: DbPool,
    state: AppState,
}

impl AppContext {
    /// 設定に従ってDBへ接続し、必要ならマイグレーションを流してから組み立てる
    pub async fn connect(config: AppConfig) -> Result<Self, StartupError> {
        let db = db::create_db_pool(&config).await?;
        info!("Database pool created successfully");

        if config.run_migrations {
            info!("Running database migrations");
            Migrator::up(&db, None).await?;
        }

        Self::build(config, db, Arc::new(SystemClock))
    }

    /// 接続済みのDBと時計から組み立てる（テストでは固定の時計を渡す）
    pub fn build(
        config: AppConfig,
        db: DbPool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StartupError> {
        let config = Arc::new(config);

        let jwt_manager = Arc::new(JwtManager::new(config.jwt.clone())?);
        let password_manager = Arc::new(PasswordManager::new(
            config.password.argon2.clone(),
            config.password.policy.clone(),
        )?);
        let session_bus = Arc::new(SessionEventBus::default());

        let user_repo = Arc::new(UserRepository::new(db.clone()));
        let refresh_token_repo = Arc::new(RefreshTokenRepository::new(db.clone()));
        let profile_repo = Arc::new(UserProfileRepository::new(db.clone()));
        let habit_store: Arc<dyn HabitStore> = Arc::new(ActionRepository::new(db.clone()));

        let auth_service = Arc::new(AuthService::new(
            user_repo,
            refresh_token_repo,
            profile_repo.clone(),
            password_manager,
            jwt_manager.clone(),
            session_bus.clone(),
        ));
        let habit_service = Arc::new(HabitService::new(habit_store, clock));
        let profile_service = Arc::new(ProfileService::new(profile_repo));

        let state = AppState {
            auth_service,
            habit_service,
            profile_service,
            session_bus,
            jwt_manager,
            db: db.clone(),
            cookie_config: CookieConfig::from_app_config(&config),
            config: config.clone(),
        };

        Ok(Self { config, db, state })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 停止シグナル受信時に `close` してSSE接続を終わらせるために使う
    pub fn session_bus(&self) -> Arc<SessionEventBus> {
        self.state.session_bus.clone()
    }

    /// 全ルーターとミドルウェアを組み立てる
    pub fn router(&self) -> Router {
        Router::new()
            .merge(system_router(self.state.clone()))
            .merge(auth_router(self.state.clone()))
            .merge(action_router(self.state.clone()))
            .merge(stats_router(self.state.clone()))
            .merge(profile_router(self.state.clone()))
            .layer(axum_middleware::from_fn(security_headers_middleware))
            .layer(axum_middleware::from_fn(logging_middleware))
            .layer(axum_middleware::from_fn(inject_request_context))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.config))
    }

    /// セッション配信を止めてDB接続を閉じる。ルーターが保持する状態のクローンは以後使えない。
    pub async fn shutdown(self) -> Result<(), DbErr> {
        self.state.session_bus.close();
        info!(
            open_subscriptions = self.state.session_bus.subscription_count(),
            "Shutting down application context"
        );
        drop(self.state);
        self.db.close().await
    }
}
