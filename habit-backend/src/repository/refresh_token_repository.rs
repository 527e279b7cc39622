// src/repository/refresh_token_repository.rs

use crate::domain::refresh_token_model::{self, ActiveModel as RefreshTokenActiveModel, Entity as RefreshTokenEntity};
use chrono::{Duration, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DbConn, DbErr, QueryFilter};
use uuid::Uuid;

/// 発行済みリフレッシュトークンの台帳（SHA-256 ハッシュで管理）
pub struct RefreshTokenRepository {
    db: DbConn,
}

impl RefreshTokenRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn store(
        &self,
        user_id: Uuid,
        token_hash: String,
        ttl: Duration,
    ) -> Result<refresh_token_model::Model, DbErr> {
        RefreshTokenActiveModel::issue(user_id, token_hash, ttl)
            .insert(&self.db)
            .await
    }

    /// 未失効かつ期限内のトークンだけを返す
    pub async fn find_active(
        &self,
        token_hash: &str,
    ) -> Result<Option<refresh_token_model::Model>, DbErr> {
        RefreshTokenEntity::find()
            .filter(refresh_token_model::Column::TokenHash.eq(token_hash))
            .filter(refresh_token_model::Column::RevokedAt.is_null())
            .filter(refresh_token_model::Column::ExpiresAt.gt(Utc::now()))
            .one(&self.db)
            .await
    }

    /// 1件失効させる。既に失効済みなら false（同時ローテーションの片方はここで負ける）
    pub async fn revoke(&self, token_hash: &str) -> Result<bool, DbErr> {
        let result = RefreshTokenEntity::update_many()
            .col_expr(refresh_token_model::Column::RevokedAt, Expr::value(Utc::now()))
            .filter(refresh_token_model::Column::TokenHash.eq(token_hash))
            .filter(refresh_token_model::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// ユーザーの未失効トークンをすべて失効させ、件数を返す
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let result = RefreshTokenEntity::update_many()
            .col_expr(refresh_token_model::Column::RevokedAt, Expr::value(Utc::now()))
            .filter(refresh_token_model::Column::UserId.eq(user_id))
            .filter(refresh_token_model::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
