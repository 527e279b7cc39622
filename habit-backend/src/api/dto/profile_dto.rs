// src/api/dto/profile_dto.rs
use crate::domain::user_profile_model::{self, Activity, CodingPlatforms, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// オンボーディング情報の登録・更新
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub role: UserRole,

    #[validate(length(min = 1, message = "Select at least one activity"))]
    pub activities: Vec<Activity>,

    #[serde(default)]
    pub platforms: Option<CodingPlatforms>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub role: Option<UserRole>,
    pub activities: Vec<Activity>,
    pub platforms: Option<CodingPlatforms>,
    pub onboarding_completed: bool,
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    /// 未登録ユーザー向けの空プロフィール
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: None,
            activities: Vec::new(),
            platforms: None,
            onboarding_completed: false,
            onboarding_completed_at: None,
            updated_at: Utc::now(),
        }
    }
}

impl From<user_profile_model::Model> for ProfileResponse {
    fn from(model: user_profile_model::Model) -> Self {
        // 保存済みの JSON が壊れていても読み出しは失敗させない
        let activities = serde_json::from_value(model.activities).unwrap_or_default();
        let platforms = model
            .platforms
            .and_then(|p| serde_json::from_value::<CodingPlatforms>(p).ok());

        Self {
            user_id: model.user_id,
            role: model.role.as_deref().and_then(UserRole::from_str),
            activities,
            platforms,
            onboarding_completed: model.onboarding_completed,
            onboarding_completed_at: model.onboarding_completed_at,
            updated_at: model.updated_at,
        }
    }
}
