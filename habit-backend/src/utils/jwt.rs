// src/utils/jwt.rs

//! アクセストークン・リフレッシュトークンの発行と検証
//!
//! どちらも HS256 で署名し、`typ` クレームで種別を区別する。
//! リフレッシュトークンはユーザー情報を持たず、DB 側のハッシュと突き合わせて使う。

use crate::domain::user_model::UserClaims;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use uuid::Uuid;

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT_SECRET_KEY is not set")]
    MissingSecret,

    #[error("JWT secret must be at least 32 characters")]
    WeakSecret,

    #[error("Invalid JWT setting: {0}")]
    InvalidSetting(&'static str),

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token has expired")]
    Expired,

    #[error("Expected a {expected} token")]
    WrongKind { expected: TokenKind },

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        })
    }
}

/// 両方のトークンに共通する登録済みクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,
    pub typ: TokenKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    pub user: UserClaims,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

trait TypedClaims: DeserializeOwned {
    fn registered(&self) -> &RegisteredClaims;
}

impl TypedClaims for AccessClaims {
    fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }
}

impl TypedClaims for RefreshClaims {
    fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// `JWT_SECRET_KEY` は必須。有効期限は `JWT_ACCESS_TTL_MINUTES`（既定 15）と
    /// `JWT_REFRESH_TTL_DAYS`（既定 7）。
    pub fn from_env() -> Result<Self, JwtError> {
        let secret_key = env::var("JWT_SECRET_KEY").map_err(|_| JwtError::MissingSecret)?;

        let access_minutes = env_i64("JWT_ACCESS_TTL_MINUTES", 15)?;
        let refresh_days = env_i64("JWT_REFRESH_TTL_DAYS", 7)?;

        let config = Self {
            secret_key,
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "habit-backend".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "habit-tracker".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn for_testing() -> Self {
        Self {
            secret_key: "habit-backend-test-secret-0123456789abcdef".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            issuer: "habit-backend".to_string(),
            audience: "habit-tracker".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), JwtError> {
        if self.secret_key.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::WeakSecret);
        }
        if self.access_ttl <= Duration::zero() {
            return Err(JwtError::InvalidSetting("access token TTL must be positive"));
        }
        if self.refresh_ttl <= self.access_ttl {
            return Err(JwtError::InvalidSetting(
                "refresh token TTL must be longer than access token TTL",
            ));
        }
        Ok(())
    }
}

fn env_i64(key: &'static str, default: i64) -> Result<i64, JwtError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| JwtError::InvalidSetting(key)),
        Err(_) => Ok(default),
    }
}

/// 署名したトークンとその失効時刻
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Result<Self, JwtError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_nbf = true;
        validation.leeway = 5;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            config,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.config.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.config.refresh_ttl
    }

    pub fn issue_access_token(&self, user: UserClaims) -> Result<IssuedToken, JwtError> {
        let (registered, expires_at) =
            self.registered(user.user_id, TokenKind::Access, self.config.access_ttl);
        let token = self.sign(&AccessClaims { registered, user })?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        let (registered, expires_at) =
            self.registered(user_id, TokenKind::Refresh, self.config.refresh_ttl);
        let token = self.sign(&RefreshClaims { registered })?;
        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn registered(
        &self,
        sub: Uuid,
        typ: TokenKind,
        ttl: Duration,
    ) -> (RegisteredClaims, DateTime<Utc>) {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = RegisteredClaims {
            sub,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            // 同一秒内に発行しても別トークンになるように
            jti: Uuid::new_v4(),
            typ,
        };
        (claims, expires_at)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(JwtError::Signing)
    }

    fn verify<T: TypedClaims>(&self, token: &str, expected: TokenKind) -> Result<T, JwtError> {
        let claims = decode::<T>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.registered().typ != expected {
            return Err(JwtError::WrongKind { expected });
        }
        Ok(claims)
    }
}

/// クライアントに返すトークンの組
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 秒
    pub access_token_expires_in: i64,
    /// 秒
    pub refresh_token_expires_in: i64,
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access: IssuedToken, refresh: IssuedToken, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            access_token: access.token,
            refresh_token: refresh.token,
            access_token_expires_in: access_ttl.num_seconds(),
            refresh_token_expires_in: refresh_ttl.num_seconds(),
            token_type: "Bearer".to_string(),
        }
    }
}
