// src/service/habit_service.rs

//! アクション（習慣）と日ごとの達成記録を扱うサービス
//!
//! 集計は `domain::habit_stats` の純粋関数に任せ、ここでは月の解決・所有者確認・
//! 未来日のロックを行う。

use crate::api::dto::action_dto::{
    ActionDto, ActionListResponse, ActionWithCompletionsDto, CompletionDto, CreateActionRequest,
    DayRequest, MonthQuery, ToggleCompletionResponse, UpdateNotesRequest,
};
use crate::api::dto::stats_dto::{MonthlyStatsResponse, StatsOverviewResponse};
use crate::domain::action_model::{self, CreateAction};
use crate::domain::calendar::{is_future_day, Clock, MonthPosition, MonthRef};
use crate::domain::habit_stats::{
    compute_daily_stats, compute_overall_stats, habit_completion_rate, summarize_chart,
};
use crate::error::{AppError, AppResult};
use crate::repository::{CompletionKey, CompletionScope, HabitStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct HabitService {
    store: Arc<dyn HabitStore>,
    clock: Arc<dyn Clock>,
}

impl HabitService {
    pub fn new(store: Arc<dyn HabitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// クエリの年月を解決する（省略時は今月）
    pub fn resolve_month(&self, query: MonthQuery) -> AppResult<MonthRef> {
        let current = MonthRef::of(self.clock.today());
        match (query.year, query.month) {
            (None, None) => Ok(current),
            (Some(year), Some(month)) => Ok(MonthRef::new(year, month)?),
            (Some(year), None) => Ok(MonthRef::new(year, current.month)?),
            (None, Some(month)) => Ok(MonthRef::new(current.year, month)?),
        }
    }

    // --- アクション ---

    /// 月内の達成日つきでアクション一覧を返す（作成日時の昇順）
    pub async fn list_actions_with_completions(
        &self,
        user_id: Uuid,
        month: MonthRef,
    ) -> AppResult<ActionListResponse> {
        let actions = self.store.list_actions(user_id).await?;
        let action_ids: Vec<Uuid> = actions.iter().map(|a| a.action_id).collect();
        let records = self
            .store
            .list_completions(&CompletionScope::Actions(action_ids), month, None)
            .await?;

        let days_in_month = month.days_in_month();
        let mut completed_days: BTreeMap<Uuid, Vec<u32>> = BTreeMap::new();
        let mut notes: BTreeMap<Uuid, BTreeMap<u32, String>> = BTreeMap::new();
        for record in records {
            let day = record.day as u32;
            if record.completed {
                completed_days.entry(record.action_id).or_default().push(day);
            }
            if let Some(note) = record.notes {
                notes.entry(record.action_id).or_default().insert(day, note);
            }
        }

        let actions = actions
            .into_iter()
            .map(|action| {
                let mut days = completed_days.remove(&action.action_id).unwrap_or_default();
                days.sort_unstable();
                days.dedup();
                let completion_rate = habit_completion_rate(days.len(), days_in_month);
                ActionWithCompletionsDto {
                    action_id: action.action_id,
                    action_title: action.action_title,
                    created_at: action.created_at,
                    completed_days: days,
                    notes: notes.remove(&action.action_id).unwrap_or_default(),
                    completion_rate,
                    is_perfect: completion_rate == 100,
                }
            })
            .collect();

        Ok(ActionListResponse {
            year: month.year,
            month: month.month,
            days_in_month,
            is_future_month: month.position(self.clock.today()) == MonthPosition::Future,
            actions,
        })
    }

    pub async fn create_action(
        &self,
        user_id: Uuid,
        mut payload: CreateActionRequest,
    ) -> AppResult<ActionDto> {
        payload.action_title = payload.action_title.trim().to_string();
        payload.validate()?;

        if payload.year.is_some() || payload.month.is_some() {
            let month = self.resolve_month(MonthQuery {
                year: payload.year,
                month: payload.month,
            })?;
            self.ensure_not_future_month(month)?;
        }

        let action = self
            .store
            .create_action(CreateAction {
                user_id,
                action_title: payload.action_title,
            })
            .await?;

        info!(user_id = %user_id, action_id = %action.action_id, "Action created");
        Ok(action.into())
    }

    /// アクションを削除する（達成記録も連鎖削除）
    pub async fn delete_action(&self, user_id: Uuid, action_id: Uuid) -> AppResult<()> {
        self.find_owned_action(user_id, action_id).await?;

        if !self.store.delete_action(action_id).await? {
            return Err(AppError::NotFound("Action not found".to_string()));
        }

        info!(user_id = %user_id, action_id = %action_id, "Action deleted");
        Ok(())
    }

    // --- 達成記録 ---

    /// 指定日の達成状態を反転し、反転後の値を返す
    ///
    /// 未来日は記録を作らずに拒否する。
    pub async fn toggle_day_completion(
        &self,
        user_id: Uuid,
        action_id: Uuid,
        day: DayRequest,
    ) -> AppResult<ToggleCompletionResponse> {
        let key = self.writable_day(user_id, action_id, day).await?;

        let completed = self.store.toggle_completion(key).await?;

        info!(
            user_id = %user_id,
            action_id = %action_id,
            year = day.year,
            month = day.month,
            day = day.day,
            completed,
            "Completion toggled"
        );

        Ok(ToggleCompletionResponse {
            action_id,
            year: day.year,
            month: day.month,
            day: day.day,
            completed,
        })
    }

    /// 指定日のメモを設定する（記録が無ければ未達成で作成）
    pub async fn set_day_notes(
        &self,
        user_id: Uuid,
        action_id: Uuid,
        payload: UpdateNotesRequest,
    ) -> AppResult<CompletionDto> {
        payload.validate()?;

        let key = self.writable_day(user_id, action_id, payload.day()).await?;
        let record = self
            .store
            .set_notes(key, payload.normalized_notes())
            .await?;

        info!(user_id = %user_id, action_id = %action_id, day = payload.day, "Completion notes updated");
        Ok(record.into())
    }

    // --- 集計 ---

    /// 月間グラフ（日ごとの達成数と表示範囲の要約）
    pub async fn monthly_stats(
        &self,
        user_id: Uuid,
        month: MonthRef,
    ) -> AppResult<MonthlyStatsResponse> {
        let (habits, completions) = self.month_snapshot(user_id, month).await?;
        let today = self.clock.today();
        let days_in_month = month.days_in_month();
        let visible_through_day = month.visible_through_day(today);

        let days = compute_daily_stats(&habits, &completions, days_in_month);
        let summary = summarize_chart(&days, visible_through_day);
        let position = month.position(today);

        Ok(MonthlyStatsResponse {
            year: month.year,
            month: month.month,
            days_in_month,
            is_current_month: position == MonthPosition::Current,
            is_future_month: position == MonthPosition::Future,
            visible_through_day,
            total_actions: habits.len() as u32,
            days,
            summary,
            previous_month: month.prev(),
            next_month: month.next(),
        })
    }

    /// 達成率・連続日数・パーフェクト日数
    ///
    /// 未来月は集計できないため 400。
    pub async fn user_stats(
        &self,
        user_id: Uuid,
        month: MonthRef,
    ) -> AppResult<StatsOverviewResponse> {
        let reference_day = month.reference_day(self.clock.today()).ok_or_else(|| {
            AppError::BadRequest(format!("Statistics are not available for {}", month))
        })?;

        let (habits, completions) = self.month_snapshot(user_id, month).await?;
        let stats = compute_overall_stats(&habits, &completions, reference_day);

        Ok(StatsOverviewResponse {
            year: month.year,
            month: month.month,
            stats,
        })
    }

    /// ユーザーの習慣と月内の達成記録を並行して取得する
    async fn month_snapshot(
        &self,
        user_id: Uuid,
        month: MonthRef,
    ) -> AppResult<(Vec<Uuid>, Vec<(Uuid, u32)>)> {
        let completion_scope = CompletionScope::User(user_id);
        let (actions, records) = tokio::try_join!(
            self.store.list_actions(user_id),
            self.store
                .list_completions(&completion_scope, month, Some(true)),
        )?;

        let habits = actions.into_iter().map(|a| a.action_id).collect();
        let completions = records
            .into_iter()
            .map(|r| (r.action_id, r.day as u32))
            .collect();
        Ok((habits, completions))
    }

    // --- ヘルパー ---

    async fn find_owned_action(
        &self,
        user_id: Uuid,
        action_id: Uuid,
    ) -> AppResult<action_model::Model> {
        match self.store.find_action(action_id).await? {
            Some(action) if action.user_id == user_id => Ok(action),
            Some(_) => {
                warn!(user_id = %user_id, action_id = %action_id, "Access to another user's action");
                Err(AppError::NotFound("Action not found".to_string()))
            }
            None => Err(AppError::NotFound("Action not found".to_string())),
        }
    }

    /// 書き込み可能な日か検証し、記録のキーを返す
    async fn writable_day(
        &self,
        user_id: Uuid,
        action_id: Uuid,
        day: DayRequest,
    ) -> AppResult<CompletionKey> {
        let month = MonthRef::new(day.year, day.month)?;
        let date = month.date(day.day)?;
        self.ensure_not_future_month(month)?;

        if is_future_day(date, self.clock.today()) {
            return Err(AppError::BadRequest(format!(
                "Cannot record completion for a future date ({})",
                date
            )));
        }

        self.find_owned_action(user_id, action_id).await?;

        Ok(CompletionKey {
            action_id,
            user_id,
            year: day.year,
            month: day.month,
            day: day.day,
        })
    }

    fn ensure_not_future_month(&self, month: MonthRef) -> AppResult<()> {
        if month.position(self.clock.today()) == MonthPosition::Future {
            return Err(AppError::BadRequest(format!(
                "{} is in the future and cannot be edited",
                month
            )));
        }
        Ok(())
    }
}
