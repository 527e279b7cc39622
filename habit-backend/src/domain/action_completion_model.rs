// src/domain/action_completion_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// アクションの1日分の達成記録
///
/// `(action_id, year, month, day)` の組につき最大1行。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "action_completions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub completion_id: Uuid,

    pub action_id: Uuid,

    pub user_id: Uuid,

    pub year: i32,

    pub month: i32,

    pub day: i32,

    pub completed: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::action_model::Entity",
        from = "Column::ActionId",
        to = "crate::domain::action_model::Column::ActionId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Action,
}

impl Related<crate::domain::action_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Action.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            completion_id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            completed: Set(false),
            ..ActiveModelTrait::default()
        }
    }
}
