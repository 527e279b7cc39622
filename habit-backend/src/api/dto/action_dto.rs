// src/api/dto/action_dto.rs
use crate::domain::action_completion_model;
use crate::domain::action_model;
use crate::utils::validation::{self, action};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateActionRequest {
    // 長さの検証は前後の空白を除いた後
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(
        length(
            min = action::TITLE_MIN_LENGTH,
            max = action::TITLE_MAX_LENGTH,
            message = "Action title must be between 1 and 200 characters"
        ),
        custom(function = validation::validate_action_title)
    )]
    pub action_title: String,

    /// 作成時に表示している年月（未来月なら作成不可）
    pub year: Option<i32>,
    pub month: Option<u32>,
}

fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// 対象日の指定
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct DayRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct UpdateNotesRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,

    #[validate(length(
        max = action::NOTES_MAX_LENGTH,
        message = "Notes must not exceed 1000 characters"
    ))]
    pub notes: Option<String>,
}

impl UpdateNotesRequest {
    pub fn day(&self) -> DayRequest {
        DayRequest {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    /// 空白のみのメモは削除扱い
    pub fn normalized_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// `?year=&month=` クエリ（省略時は今月）
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

// --- Response DTOs ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionDto {
    pub action_id: Uuid,
    pub user_id: Uuid,
    pub action_title: String,
    pub created_at: DateTime<Utc>,
}

impl From<action_model::Model> for ActionDto {
    fn from(model: action_model::Model) -> Self {
        Self {
            action_id: model.action_id,
            user_id: model.user_id,
            action_title: model.action_title,
            created_at: model.created_at,
        }
    }
}

/// 月内の達成日つきのアクション
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionWithCompletionsDto {
    pub action_id: Uuid,
    pub action_title: String,
    pub created_at: DateTime<Utc>,
    /// 昇順
    pub completed_days: Vec<u32>,
    /// 日 → メモ
    pub notes: BTreeMap<u32, String>,
    pub completion_rate: u32,
    pub is_perfect: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActionListResponse {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub is_future_month: bool,
    pub actions: Vec<ActionWithCompletionsDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleCompletionResponse {
    pub action_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionDto {
    pub completion_id: Uuid,
    pub action_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<action_completion_model::Model> for CompletionDto {
    fn from(model: action_completion_model::Model) -> Self {
        Self {
            completion_id: model.completion_id,
            action_id: model.action_id,
            year: model.year,
            month: model.month as u32,
            day: model.day as u32,
            completed: model.completed,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}
