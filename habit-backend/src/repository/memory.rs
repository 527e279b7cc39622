// src/repository/memory.rs

//! プロセス内で完結する習慣ストア。サービス層のテストで使う。

use crate::domain::action_completion_model;
use crate::domain::action_model::{self, CreateAction};
use crate::domain::calendar::MonthRef;
use crate::repository::habit_store::{
    CompletionKey, CompletionScope, HabitStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

type DayKey = (Uuid, i32, u32, u32);

#[derive(Default)]
struct State {
    actions: Vec<action_model::Model>,
    completions: HashMap<DayKey, action_completion_model::Model>,
    /// (失敗させるまでの残り呼び出し回数, メッセージ)
    failure: Option<(usize, String)>,
}

impl State {
    fn check_failure(&mut self) -> StoreResult<()> {
        match self.failure.take() {
            Some((1, message)) => Err(StoreError::OperationFailed(message)),
            Some((remaining, message)) => {
                self.failure = Some((remaining - 1, message));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryHabitStore {
    state: Mutex<State>,
}

impl InMemoryHabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の1回の操作を指定メッセージで失敗させる
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.fail_on_nth(1, message).await;
    }

    /// n 回目（1始まり）の操作だけを失敗させる
    pub async fn fail_on_nth(&self, n: usize, message: impl Into<String>) {
        self.state.lock().await.failure = Some((n.max(1), message.into()));
    }

    pub async fn completion_count(&self) -> usize {
        self.state.lock().await.completions.len()
    }

    fn key_of(key: &CompletionKey) -> DayKey {
        (key.action_id, key.year, key.month, key.day)
    }

    fn new_record(key: &CompletionKey, completed: bool) -> action_completion_model::Model {
        action_completion_model::Model {
            completion_id: Uuid::new_v4(),
            action_id: key.action_id,
            user_id: key.user_id,
            year: key.year,
            month: key.month as i32,
            day: key.day as i32,
            completed,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl HabitStore for InMemoryHabitStore {
    async fn list_actions(&self, user_id: Uuid) -> StoreResult<Vec<action_model::Model>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let mut actions: Vec<_> = state
            .actions
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        actions.sort_by_key(|a| (a.created_at, a.action_id));
        Ok(actions)
    }

    async fn find_action(&self, action_id: Uuid) -> StoreResult<Option<action_model::Model>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        Ok(state
            .actions
            .iter()
            .find(|a| a.action_id == action_id)
            .cloned())
    }

    async fn create_action(&self, create: CreateAction) -> StoreResult<action_model::Model> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        // 同一時刻の連続作成でも作成順が保たれるようにずらす
        let mut created_at = Utc::now();
        if let Some(last) = state.actions.iter().map(|a| a.created_at).max() {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }

        let action = action_model::Model {
            action_id: Uuid::new_v4(),
            user_id: create.user_id,
            action_title: create.action_title,
            created_at,
        };
        state.actions.push(action.clone());
        Ok(action)
    }

    async fn delete_action(&self, action_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let before = state.actions.len();
        state.actions.retain(|a| a.action_id != action_id);
        let removed = state.actions.len() != before;
        if removed {
            state.completions.retain(|(id, _, _, _), _| *id != action_id);
        }
        Ok(removed)
    }

    async fn list_completions(
        &self,
        scope: &CompletionScope,
        month: MonthRef,
        completed: Option<bool>,
    ) -> StoreResult<Vec<action_completion_model::Model>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let mut records: Vec<_> = state
            .completions
            .values()
            .filter(|c| {
                let in_scope = match scope {
                    CompletionScope::User(user_id) => c.user_id == *user_id,
                    CompletionScope::Actions(action_ids) => action_ids.contains(&c.action_id),
                };
                in_scope
                    && c.year == month.year
                    && c.month == month.month as i32
                    && completed.is_none_or(|flag| c.completed == flag)
            })
            .cloned()
            .collect();
        records.sort_by_key(|c| (c.day, c.action_id));
        Ok(records)
    }

    async fn toggle_completion(&self, key: CompletionKey) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let record = state
            .completions
            .entry(Self::key_of(&key))
            .and_modify(|c| c.completed = !c.completed)
            .or_insert_with(|| Self::new_record(&key, true));
        Ok(record.completed)
    }

    async fn set_notes(
        &self,
        key: CompletionKey,
        notes: Option<String>,
    ) -> StoreResult<action_completion_model::Model> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let record = state
            .completions
            .entry(Self::key_of(&key))
            .or_insert_with(|| Self::new_record(&key, false));
        record.notes = notes;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(action_id: Uuid, user_id: Uuid, day: u32) -> CompletionKey {
        CompletionKey {
            action_id,
            user_id,
            year: 2024,
            month: 5,
            day,
        }
    }

    async fn seeded() -> (InMemoryHabitStore, Uuid, action_model::Model) {
        let store = InMemoryHabitStore::new();
        let user_id = Uuid::new_v4();
        let action = store
            .create_action(CreateAction {
                user_id,
                action_title: "Read".to_string(),
            })
            .await
            .unwrap();
        (store, user_id, action)
    }

    #[tokio::test]
    async fn test_toggle_alternates() {
        let (store, user_id, action) = seeded().await;
        let k = key(action.action_id, user_id, 3);

        assert!(store.toggle_completion(k).await.unwrap());
        assert!(!store.toggle_completion(k).await.unwrap());
        assert!(store.toggle_completion(k).await.unwrap());
        assert_eq!(store.completion_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_completions_filters() {
        let (store, user_id, action) = seeded().await;
        store.toggle_completion(key(action.action_id, user_id, 1)).await.unwrap();
        store.toggle_completion(key(action.action_id, user_id, 2)).await.unwrap();
        store.toggle_completion(key(action.action_id, user_id, 2)).await.unwrap();

        let may = MonthRef::new(2024, 5).unwrap();
        let completed = store
            .list_completions(&CompletionScope::Actions(vec![action.action_id]), may, Some(true))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].day, 1);

        let all = store
            .list_completions(&CompletionScope::User(user_id), may, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let june = MonthRef::new(2024, 6).unwrap();
        assert!(store
            .list_completions(&CompletionScope::Actions(vec![action.action_id]), june, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_completions() {
        let (store, user_id, action) = seeded().await;
        store.toggle_completion(key(action.action_id, user_id, 1)).await.unwrap();

        assert!(store.delete_action(action.action_id).await.unwrap());
        assert_eq!(store.completion_count().await, 0);
        assert!(!store.delete_action(action.action_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_actions_in_creation_order() {
        let (store, user_id, first) = seeded().await;
        let second = store
            .create_action(CreateAction {
                user_id,
                action_title: "Run".to_string(),
            })
            .await
            .unwrap();
        store
            .create_action(CreateAction {
                user_id: Uuid::new_v4(),
                action_title: "Other user".to_string(),
            })
            .await
            .unwrap();

        let actions = store.list_actions(user_id).await.unwrap();
        let ids: Vec<_> = actions.iter().map(|a| a.action_id).collect();
        assert_eq!(ids, vec![first.action_id, second.action_id]);
    }

    #[tokio::test]
    async fn test_set_notes_creates_uncompleted_record() {
        let (store, user_id, action) = seeded().await;
        let k = key(action.action_id, user_id, 4);

        let record = store.set_notes(k, Some("tired".to_string())).await.unwrap();
        assert!(!record.completed);
        assert_eq!(record.notes.as_deref(), Some("tired"));

        assert!(store.toggle_completion(k).await.unwrap());
        let cleared = store.set_notes(k, None).await.unwrap();
        assert!(cleared.completed);
        assert!(cleared.notes.is_none());
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let (store, user_id, _) = seeded().await;
        store.fail_next("boom").await;

        assert_eq!(
            store.list_actions(user_id).await,
            Err(StoreError::OperationFailed("boom".to_string()))
        );
        assert!(store.list_actions(user_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_on_nth_skips_earlier_calls() {
        let (store, user_id, action) = seeded().await;
        store.fail_on_nth(2, "second call").await;

        assert!(store.find_action(action.action_id).await.unwrap().is_some());
        assert_eq!(
            store.toggle_completion(key(action.action_id, user_id, 1)).await,
            Err(StoreError::OperationFailed("second call".to_string()))
        );
        assert_eq!(store.completion_count().await, 0);
        assert!(store.list_actions(user_id).await.is_ok());
    }
}
