// src/repository/user_profile_repository.rs

use crate::domain::user_profile_model::{self, Entity as UserProfileEntity};
use sea_orm::entity::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DbConn, DbErr};
use uuid::Uuid;

pub struct UserProfileRepository {
    db: DbConn,
}

impl UserProfileRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<user_profile_model::Model>, DbErr> {
        UserProfileEntity::find_by_id(user_id).one(&self.db).await
    }

    /// プロフィールを丸ごと保存（無ければ作成）
    pub async fn upsert(
        &self,
        profile: user_profile_model::Model,
    ) -> Result<user_profile_model::Model, DbErr> {
        let user_id = profile.user_id;
        let active: user_profile_model::ActiveModel = profile.into_active_model().reset_all();

        UserProfileEntity::insert(active)
            .on_conflict(
                OnConflict::column(user_profile_model::Column::UserId)
                    .update_columns([
                        user_profile_model::Column::Role,
                        user_profile_model::Column::Activities,
                        user_profile_model::Column::Platforms,
                        user_profile_model::Column::OnboardingCompleted,
                        user_profile_model::Column::OnboardingCompletedAt,
                        user_profile_model::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        UserProfileEntity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Profile for user {}", user_id)))
    }
}
