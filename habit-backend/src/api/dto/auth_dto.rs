// src/api/dto/auth_dto.rs

use crate::domain::user_model::UserSummary;
use crate::utils::jwt::TokenPair;
use crate::utils::validation::password;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 登録・ログイン共通の資格情報
///
/// 登録時の長さや文字種の要件は `PasswordManager` のポリシーで別途検査する。
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 1,
        max = password::MAX_LENGTH,
        message = "Password is required"
    ))]
    pub password: String,
}

impl Credentials {
    /// 保存・検索に使う形（前後の空白を除いて小文字化）
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// ボディを省略した場合は Cookie のリフレッシュトークンを使う
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// 登録・ログイン・トークン更新の共通レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserSummary,
    pub tokens: TokenPair,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: UserSummary,
    pub onboarding_completed: bool,
}
