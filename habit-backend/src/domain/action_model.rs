// src/domain/action_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// ユーザーが毎日記録する習慣（アクション）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub action_id: Uuid,

    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub action_title: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user_model::Entity",
        from = "Column::UserId",
        to = "crate::domain::user_model::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "crate::domain::action_completion_model::Entity")]
    Completions,
}

impl Related<crate::domain::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::domain::action_completion_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            action_id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

/// アクション作成用構造体（タイトルは検証済み）
#[derive(Debug, Clone)]
pub struct CreateAction {
    pub user_id: Uuid,
    pub action_title: String,
}

impl From<CreateAction> for ActiveModel {
    fn from(create: CreateAction) -> Self {
        Self {
            user_id: Set(create.user_id),
            action_title: Set(create.action_title),
            ..Self::new()
        }
    }
}
