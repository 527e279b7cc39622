// src/service/profile_service.rs
use crate::api::dto::profile_dto::{ProfileResponse, UpdateProfileRequest};
use crate::domain::user_profile_model::{self, Activity, CodingPlatforms};
use crate::error::{AppError, AppResult};
use crate::repository::user_profile_repository::UserProfileRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// オンボーディング情報（ユーザープロフィール）のサービス
pub struct ProfileService {
    profile_repo: Arc<UserProfileRepository>,
}

impl ProfileService {
    pub fn new(profile_repo: Arc<UserProfileRepository>) -> Self {
        Self { profile_repo }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileResponse> {
        let profile = self.profile_repo.find_by_user_id(user_id).await?;
        Ok(profile.map_or_else(|| ProfileResponse::empty(user_id), ProfileResponse::from))
    }

    /// プロフィールを保存し、オンボーディング完了として記録する
    pub async fn save_profile(
        &self,
        user_id: Uuid,
        payload: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        payload.validate()?;

        let now = Utc::now();
        let model = build_profile(user_id, payload, now)?;
        let saved = self.profile_repo.upsert(model).await?;

        info!(user_id = %user_id, role = ?saved.role, "Profile saved");
        Ok(saved.into())
    }
}

/// リクエストから保存用のモデルを組み立てる
///
/// 活動は重複を除いて選択順を保つ。プラットフォームは coding を選んだときだけ残す。
fn build_profile(
    user_id: Uuid,
    payload: UpdateProfileRequest,
    now: chrono::DateTime<Utc>,
) -> AppResult<user_profile_model::Model> {
    let mut activities: Vec<Activity> = Vec::with_capacity(payload.activities.len());
    for activity in payload.activities {
        if !activities.contains(&activity) {
            activities.push(activity);
        }
    }

    let platforms = payload
        .platforms
        .filter(|_| activities.contains(&Activity::Coding))
        .map(CodingPlatforms::normalized)
        .filter(|p| !p.is_empty());

    let to_json = |value: serde_json::Result<serde_json::Value>| {
        value.map_err(|e| AppError::InternalServerError(format!("Failed to encode profile: {}", e)))
    };

    Ok(user_profile_model::Model {
        user_id,
        role: Some(payload.role.as_str().to_string()),
        activities: to_json(serde_json::to_value(&activities))?,
        platforms: platforms
            .map(|p| to_json(serde_json::to_value(p)))
            .transpose()?,
        onboarding_completed: true,
        onboarding_completed_at: Some(now),
        updated_at: now,
    })
}
