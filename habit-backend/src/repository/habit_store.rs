// src/repository/habit_store.rs

use crate::domain::action_completion_model;
use crate::domain::action_model::{self, CreateAction};
use crate::domain::calendar::MonthRef;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// レコードストアの失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    OperationFailed(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(what) => StoreError::NotFound(what),
            other => StoreError::OperationFailed(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 1日分の完了記録を特定するキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionKey {
    pub action_id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// 完了記録の絞り込み対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionScope {
    /// ユーザーの全習慣
    User(Uuid),
    /// 指定した習慣のみ
    Actions(Vec<Uuid>),
}

/// 習慣と完了記録の永続化
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// ユーザーの習慣を作成日時の昇順で返す
    async fn list_actions(&self, user_id: Uuid) -> StoreResult<Vec<action_model::Model>>;

    async fn find_action(&self, action_id: Uuid) -> StoreResult<Option<action_model::Model>>;

    async fn create_action(&self, create: CreateAction) -> StoreResult<action_model::Model>;

    /// 習慣を削除する（完了記録も連鎖削除）。存在しなければ false。
    async fn delete_action(&self, action_id: Uuid) -> StoreResult<bool>;

    /// ある月の完了記録を日付順に返す
    ///
    /// `completed` を指定するとその値の記録だけに絞り込む。
    async fn list_completions(
        &self,
        scope: &CompletionScope,
        month: MonthRef,
        completed: Option<bool>,
    ) -> StoreResult<Vec<action_completion_model::Model>>;

    /// 記録があれば `completed` を反転、無ければ `completed = true` で作成。
    /// 反転後の値を返す。
    async fn toggle_completion(&self, key: CompletionKey) -> StoreResult<bool>;

    /// メモを設定する。記録が無ければ未完了の記録を作成する。
    async fn set_notes(
        &self,
        key: CompletionKey,
        notes: Option<String>,
    ) -> StoreResult<action_completion_model::Model>;
}
