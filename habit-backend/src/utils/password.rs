// src/utils/password.rs

//! Argon2id によるパスワードのハッシュ化と強度チェック

use crate::utils::validation::password as limits;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingError(#[from] argon2::password_hash::Error),

    #[error("Argon2 parameter error: {0}")]
    Argon2Error(#[from] argon2::Error),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Password configuration error: {0}")]
    ConfigurationError(String),
}

/// 強度要件。既定は長さだけを見る（6〜128文字）。
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: limits::MIN_LENGTH as usize,
            max_length: limits::MAX_LENGTH as usize,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
        }
    }
}

impl PasswordPolicy {
    /// `PASSWORD_*` 環境変数で既定値を上書きする
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            min_length: env_or("PASSWORD_MIN_LENGTH", base.min_length),
            max_length: env_or("PASSWORD_MAX_LENGTH", base.max_length),
            require_uppercase: env_or("PASSWORD_REQUIRE_UPPERCASE", base.require_uppercase),
            require_lowercase: env_or("PASSWORD_REQUIRE_LOWERCASE", base.require_lowercase),
            require_digit: env_or("PASSWORD_REQUIRE_DIGIT", base.require_digit),
        }
    }

    fn check_consistency(&self) -> Result<(), PasswordError> {
        if self.min_length < 4 {
            return Err(PasswordError::ConfigurationError(
                "Minimum password length must be at least 4".to_string(),
            ));
        }
        if self.max_length < self.min_length {
            return Err(PasswordError::ConfigurationError(
                "Maximum password length must be greater than minimum".to_string(),
            ));
        }
        Ok(())
    }

    /// 満たしていない要件のメッセージ一覧（空なら合格）
    pub fn violations(&self, password: &str) -> Vec<String> {
        let length = password.chars().count();
        let mut found = Vec::new();

        if length < self.min_length {
            found.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        } else if length > self.max_length {
            found.push(format!(
                "Password must be no more than {} characters long",
                self.max_length
            ));
        }

        let character_rules: [(bool, fn(char) -> bool, &str); 3] = [
            (self.require_uppercase, char::is_uppercase, "an uppercase letter"),
            (self.require_lowercase, char::is_lowercase, "a lowercase letter"),
            (self.require_digit, |c| c.is_ascii_digit(), "a digit"),
        ];
        for (enabled, matches, label) in character_rules {
            if enabled && !password.chars().any(matches) {
                found.push(format!("Password must contain {}", label));
            }
        }

        found
    }
}

/// Argon2 のコストパラメータ
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            memory_cost: env_or("ARGON2_MEMORY_COST", base.memory_cost),
            time_cost: env_or("ARGON2_TIME_COST", base.time_cost),
            parallelism: env_or("ARGON2_PARALLELISM", base.parallelism),
            output_length: env_or("ARGON2_OUTPUT_LENGTH", base.output_length),
        }
    }

    /// テストでハッシュ化が遅くならない最小限のコスト
    pub fn for_testing() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            ..Self::default()
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_length),
        )?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key).map(|raw| raw.parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}

pub struct PasswordManager {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordManager {
    pub fn new(argon2_config: Argon2Config, policy: PasswordPolicy) -> Result<Self, PasswordError> {
        policy.check_consistency()?;
        Ok(Self {
            argon2: argon2_config.hasher()?,
            policy,
        })
    }

    /// 強度チェックを通ったパスワードだけを PHC 文字列にする
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.validate_password_strength(password)?;

        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    /// 不一致は `Ok(false)`。保存済みハッシュが壊れている場合だけエラー。
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let stored = PasswordHash::new(hash)?;
        match self.argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate_password_strength(&self, password: &str) -> Result<(), PasswordError> {
        let violations = self.policy.violations(password);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PasswordError::WeakPassword(violations.join("; ")))
        }
    }
}
