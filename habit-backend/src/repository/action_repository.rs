// src/repository/action_repository.rs

use crate::domain::action_completion_model::{self, Entity as CompletionEntity};
use crate::domain::action_model::{self, ActiveModel as ActionActiveModel, CreateAction, Entity as ActionEntity};
use crate::domain::calendar::MonthRef;
use crate::repository::habit_store::{
    CompletionKey, CompletionScope, HabitStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use sea_orm::entity::*;
use sea_orm::{
    query::*, Condition, ConnectionTrait, DatabaseBackend, DbConn, FromQueryResult, Order,
    QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;

// 一意インデックス (action_id, year, month, day) を衝突先にした反転付き upsert
const TOGGLE_COMPLETION_SQL: &str = r#"
INSERT INTO action_completions
    (completion_id, action_id, user_id, year, month, day, completed, created_at)
VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW())
ON CONFLICT (action_id, year, month, day)
DO UPDATE SET completed = NOT action_completions.completed
RETURNING completed
"#;

const SET_NOTES_SQL: &str = r#"
INSERT INTO action_completions
    (completion_id, action_id, user_id, year, month, day, completed, notes, created_at)
VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, NOW())
ON CONFLICT (action_id, year, month, day)
DO UPDATE SET notes = EXCLUDED.notes
RETURNING *
"#;

/// PostgreSQL 上の習慣ストア
pub struct ActionRepository {
    db: DbConn,
}

impl ActionRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn key_values(key: &CompletionKey) -> Vec<sea_orm::Value> {
        vec![
            Uuid::new_v4().into(),
            key.action_id.into(),
            key.user_id.into(),
            key.year.into(),
            (key.month as i32).into(),
            (key.day as i32).into(),
        ]
    }
}

#[async_trait]
impl HabitStore for ActionRepository {
    async fn list_actions(&self, user_id: Uuid) -> StoreResult<Vec<action_model::Model>> {
        let actions = ActionEntity::find()
            .filter(action_model::Column::UserId.eq(user_id))
            .order_by(action_model::Column::CreatedAt, Order::Asc)
            .order_by(action_model::Column::ActionId, Order::Asc)
            .all(&self.db)
            .await?;
        Ok(actions)
    }

    async fn find_action(&self, action_id: Uuid) -> StoreResult<Option<action_model::Model>> {
        Ok(ActionEntity::find_by_id(action_id).one(&self.db).await?)
    }

    async fn create_action(&self, create: CreateAction) -> StoreResult<action_model::Model> {
        let active: ActionActiveModel = create.into();
        Ok(active.insert(&self.db).await?)
    }

    async fn delete_action(&self, action_id: Uuid) -> StoreResult<bool> {
        let result = ActionEntity::delete_by_id(action_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_completions(
        &self,
        scope: &CompletionScope,
        month: MonthRef,
        completed: Option<bool>,
    ) -> StoreResult<Vec<action_completion_model::Model>> {
        let scope_condition = match scope {
            CompletionScope::User(user_id) => action_completion_model::Column::UserId.eq(*user_id),
            CompletionScope::Actions(action_ids) if action_ids.is_empty() => return Ok(Vec::new()),
            CompletionScope::Actions(action_ids) => {
                action_completion_model::Column::ActionId.is_in(action_ids.iter().copied())
            }
        };

        let mut condition = Condition::all()
            .add(scope_condition)
            .add(action_completion_model::Column::Year.eq(month.year))
            .add(action_completion_model::Column::Month.eq(month.month as i32));
        if let Some(completed) = completed {
            condition = condition.add(action_completion_model::Column::Completed.eq(completed));
        }

        let records = CompletionEntity::find()
            .filter(condition)
            .order_by(action_completion_model::Column::Day, Order::Asc)
            .all(&self.db)
            .await?;
        Ok(records)
    }

    async fn toggle_completion(&self, key: CompletionKey) -> StoreResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            TOGGLE_COMPLETION_SQL,
            Self::key_values(&key),
        );

        let row = self.db.query_one(stmt).await?.ok_or_else(|| {
            StoreError::OperationFailed("toggle returned no row".to_string())
        })?;
        Ok(row.try_get::<bool>("", "completed")?)
    }

    async fn set_notes(
        &self,
        key: CompletionKey,
        notes: Option<String>,
    ) -> StoreResult<action_completion_model::Model> {
        let mut values = Self::key_values(&key);
        values.push(notes.into());
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Postgres, SET_NOTES_SQL, values);

        let row = self.db.query_one(stmt).await?.ok_or_else(|| {
            StoreError::OperationFailed("notes upsert returned no row".to_string())
        })?;
        Ok(action_completion_model::Model::from_query_result(&row, "")?)
    }
}
