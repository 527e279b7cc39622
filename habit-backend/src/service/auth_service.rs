// src/service/auth_service.rs
use crate::api::dto::auth_dto::{
    Credentials, CurrentUserResponse, SessionResponse, SignoutResponse,
};
use crate::domain::user_model::{self, UserClaims};
use crate::error::{AppError, AppResult};
use crate::repository::refresh_token_repository::RefreshTokenRepository;
use crate::repository::user_profile_repository::UserProfileRepository;
use crate::repository::user_repository::{UserRepository, EMAIL_TAKEN};
use crate::service::session_events::{SessionEvent, SessionEventBus};
use crate::utils::jwt::{JwtManager, TokenPair};
use crate::utils::password::PasswordManager;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// 認証サービス
///
/// サインイン・サインアウト・トークン更新のたびに `SessionEventBus` へ通知する。
pub struct AuthService {
    users: Arc<UserRepository>,
    refresh_tokens: Arc<RefreshTokenRepository>,
    profiles: Arc<UserProfileRepository>,
    passwords: Arc<PasswordManager>,
    jwt: Arc<JwtManager>,
    sessions: Arc<SessionEventBus>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserRepository>,
        refresh_tokens: Arc<RefreshTokenRepository>,
        profiles: Arc<UserProfileRepository>,
        passwords: Arc<PasswordManager>,
        jwt: Arc<JwtManager>,
        sessions: Arc<SessionEventBus>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            profiles,
            passwords,
            jwt,
            sessions,
        }
    }

    /// 登録してそのままサインイン状態にする
    pub async fn signup(&self, credentials: Credentials) -> AppResult<SessionResponse> {
        credentials.validate()?;
        self.passwords
            .validate_password_strength(&credentials.password)?;

        let email = credentials.normalized_email();
        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "Signup with an already registered email");
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = self
            .passwords
            .hash_password(&credentials.password)
            .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))?;

        let user = self.users.register(email, password_hash).await?;
        info!(user_id = %user.id, "User registered");

        self.open_session(user, "Registration successful").await
    }

    /// ログイン。メール未登録とパスワード不一致は同じエラーにする
    pub async fn signin(&self, credentials: Credentials) -> AppResult<SessionResponse> {
        credentials.validate()?;

        let Some(user) = self
            .users
            .find_by_email(&credentials.normalized_email())
            .await?
        else {
            warn!("Signin with unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password_ok = self
            .passwords
            .verify_password(&credentials.password, &user.password_hash)
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                AppError::InternalServerError("Authentication failed".to_string())
            })?;
        if !password_ok {
            warn!(user_id = %user.id, "Signin with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.can_authenticate() {
            warn!(user_id = %user.id, "Signin to inactive account");
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        let user = self.users.touch_last_login(user.id).await?;
        info!(user_id = %user.id, "User signed in");

        self.open_session(user, "Login successful").await
    }

    /// ログアウト
    ///
    /// リフレッシュトークンが渡されればそれだけを、無ければ全トークンを失効させる。
    pub async fn signout(
        &self,
        user_id: Uuid,
        refresh_token: Option<&str>,
    ) -> AppResult<SignoutResponse> {
        let revoked = match refresh_token {
            None => self.refresh_tokens.revoke_all_for_user(user_id).await?,
            Some(token) => {
                let token_hash = hash_token(token);
                match self.refresh_tokens.find_active(&token_hash).await? {
                    None => 0,
                    Some(stored) if stored.user_id != user_id => {
                        warn!(user_id = %user_id, "Signout with another user's refresh token");
                        return Err(AppError::Forbidden(
                            "Refresh token does not belong to the current user".to_string(),
                        ));
                    }
                    Some(_) => u64::from(self.refresh_tokens.revoke(&token_hash).await?),
                }
            }
        };

        self.sessions.publish(SessionEvent::SignedOut { user_id });
        info!(user_id = %user_id, revoked, "User signed out");

        let message = if revoked > 0 {
            "Logout successful"
        } else {
            "Already logged out"
        };
        Ok(SignoutResponse {
            message: message.to_string(),
        })
    }

    /// リフレッシュトークンを使い捨てで交換する
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<SessionResponse> {
        let claims = self.jwt.verify_refresh_token(refresh_token).map_err(|e| {
            warn!(error = %e, "Refresh token rejected");
            AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
        })?;
        let user_id = claims.registered.sub;

        let token_hash = hash_token(refresh_token);
        let stored = self.refresh_tokens.find_active(&token_hash).await?;
        if !matches!(stored, Some(ref t) if t.user_id == user_id) {
            warn!(user_id = %user_id, "Refresh token is revoked or unknown");
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(user_model::Model::can_authenticate)
            .ok_or_else(|| AppError::Unauthorized("Account is inactive".to_string()))?;

        // 同時に交換された場合は先に失効させた側だけが成功する
        if !self.refresh_tokens.revoke(&token_hash).await? {
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
        }

        let tokens = self.issue_tokens(&user).await?;
        self.sessions.publish(SessionEvent::TokenRefreshed { user_id });
        info!(user_id = %user_id, "Refresh token rotated");

        Ok(SessionResponse {
            user: user.into(),
            tokens,
            message: "Token refreshed".to_string(),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<CurrentUserResponse> {
        let (user, profile) = tokio::try_join!(
            self.users.find_by_id(user_id),
            self.profiles.find_by_user_id(user_id),
        )?;
        let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(CurrentUserResponse {
            user: user.into(),
            onboarding_completed: profile.is_some_and(|p| p.onboarding_completed),
        })
    }

    async fn open_session(
        &self,
        user: user_model::Model,
        message: &str,
    ) -> AppResult<SessionResponse> {
        let tokens = self.issue_tokens(&user).await?;
        self.sessions.publish(SessionEvent::SignedIn {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(SessionResponse {
            user: user.into(),
            tokens,
            message: message.to_string(),
        })
    }

    async fn issue_tokens(&self, user: &user_model::Model) -> AppResult<TokenPair> {
        let signing_failed =
            |e: crate::utils::jwt::JwtError| AppError::InternalServerError(e.to_string());

        let access = self
            .jwt
            .issue_access_token(UserClaims::from(user))
            .map_err(signing_failed)?;
        let refresh = self
            .jwt
            .issue_refresh_token(user.id)
            .map_err(signing_failed)?;

        self.refresh_tokens
            .store(user.id, hash_token(&refresh.token), self.jwt.refresh_ttl())
            .await?;

        Ok(TokenPair::new(
            access,
            refresh,
            self.jwt.access_ttl(),
            self.jwt.refresh_ttl(),
        ))
    }
}

/// 保存用のリフレッシュトークンのハッシュ（SHA-256 の16進表現）
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
