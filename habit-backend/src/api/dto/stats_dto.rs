// src/api/dto/stats_dto.rs
use crate::domain::calendar::MonthRef;
use crate::domain::habit_stats::{ChartSummary, DailyStat, UserStats};
use serde::{Deserialize, Serialize};

/// 月間グラフ用のレスポンス
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MonthlyStatsResponse {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub is_current_month: bool,
    pub is_future_month: bool,
    /// グラフに描画する最終日（未来月は 0）
    pub visible_through_day: u32,
    pub total_actions: u32,
    pub days: Vec<DailyStat>,
    pub summary: ChartSummary,
    pub previous_month: MonthRef,
    pub next_month: MonthRef,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatsOverviewResponse {
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub stats: UserStats,
}
