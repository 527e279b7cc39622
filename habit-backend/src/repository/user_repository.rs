// src/repository/user_repository.rs

use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DbConn, DbErr, QueryFilter, SqlErr};
use tracing::warn;
use uuid::Uuid;

pub const EMAIL_TAKEN: &str = "email address is already registered";

pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    /// 保存時に小文字化しているので、検索側も小文字化して比較する
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// 新規登録。メールの一意制約違反は `Conflict` にする
    /// （事前の重複確認をすり抜けた同時登録もここで弾かれる）。
    pub async fn register(
        &self,
        email: String,
        password_hash: String,
    ) -> AppResult<user_model::Model> {
        UserActiveModel::register(email, password_hash)
            .insert(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    warn!("Signup lost a race on the email unique index");
                    AppError::Conflict(EMAIL_TAKEN.to_string())
                } else {
                    e.into()
                }
            })
    }

    /// 最終ログイン日時を現在時刻にして更新後の行を返す
    pub async fn touch_last_login(&self, id: Uuid) -> Result<user_model::Model, DbErr> {
        let now = Utc::now();
        let result = UserEntity::update_many()
            .col_expr(user_model::Column::LastLoginAt, Expr::value(now))
            .col_expr(user_model::Column::UpdatedAt, Expr::value(now))
            .filter(user_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DbErr::RecordNotFound(format!("user {}", id)));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", id)))
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
