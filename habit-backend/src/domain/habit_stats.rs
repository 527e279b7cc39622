// src/domain/habit_stats.rs

//! 習慣の達成状況の集計
//!
//! 状態を持たない純粋関数のみ。入力はある1か月分のスナップショットで、
//! 完了記録は `completed = true` のものに絞り込まれている前提。

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 1日分の達成数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub day: u32,
    pub completed: u32,
    pub total: u32,
}

impl DailyStat {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// 月全体の集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_days_tracked: u32,
    pub overall_completion: u32,
    pub current_streak: u32,
    pub perfect_days: u32,
}

/// グラフ表示範囲の要約
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartSummary {
    pub overall_percentage: u32,
    pub perfect_days: u32,
}

/// 四捨五入（0.5 は切り上げ）のパーセンテージ。分母 0 なら 0。
pub fn percentage(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((200 * numerator + denominator) / (2 * denominator)) as u32
}

/// 日ごとの達成習慣数（重複除去、未知の習慣と範囲外の日は無視）
fn completed_per_day(
    habits: &HashSet<Uuid>,
    completions: &[(Uuid, u32)],
    last_day: u32,
) -> HashMap<u32, u32> {
    let distinct: HashSet<(Uuid, u32)> = completions
        .iter()
        .copied()
        .filter(|(habit_id, day)| habits.contains(habit_id) && (1..=last_day).contains(day))
        .collect();

    let mut per_day = HashMap::new();
    for (_, day) in distinct {
        *per_day.entry(day).or_insert(0) += 1;
    }
    per_day
}

/// 月の各日について達成数と習慣数を返す
///
/// 結果は `days_in_month` 件で日付の昇順。習慣が 0 件なら全日 `total = 0`。
pub fn compute_daily_stats(
    habits: &[Uuid],
    completions: &[(Uuid, u32)],
    days_in_month: u32,
) -> Vec<DailyStat> {
    let habit_set: HashSet<Uuid> = habits.iter().copied().collect();
    let total = habit_set.len() as u32;
    let per_day = completed_per_day(&habit_set, completions, days_in_month);

    (1..=days_in_month)
        .map(|day| DailyStat {
            day,
            completed: per_day.get(&day).copied().unwrap_or(0),
            total,
        })
        .collect()
}

/// 基準日までの達成率・連続日数・パーフェクト日数を計算する
///
/// `reference_day` は当月なら今日の日、過去月なら月末日。未来月では呼ばない。
pub fn compute_overall_stats(
    habits: &[Uuid],
    completions: &[(Uuid, u32)],
    reference_day: u32,
) -> UserStats {
    let habit_set: HashSet<Uuid> = habits.iter().copied().collect();
    let habit_count = habit_set.len() as u32;
    let per_day = completed_per_day(&habit_set, completions, reference_day);
    let count_on = |day: u32| per_day.get(&day).copied().unwrap_or(0);

    let completed_records: u64 = per_day.values().map(|&c| u64::from(c)).sum();
    let overall_completion = percentage(
        completed_records,
        u64::from(reference_day) * u64::from(habit_count),
    );

    let perfect_days = if habit_count == 0 {
        0
    } else {
        (1..=reference_day)
            .filter(|&day| count_on(day) == habit_count)
            .count() as u32
    };

    // 基準日から遡り、達成 0 の日で打ち切る
    let current_streak = (1..=reference_day)
        .rev()
        .take_while(|&day| count_on(day) > 0)
        .count() as u32;

    UserStats {
        total_days_tracked: reference_day,
        overall_completion,
        current_streak,
        perfect_days,
    }
}

/// 表示対象日（`day <= visible_through_day`）だけでグラフの要約を計算する
pub fn summarize_chart(days: &[DailyStat], visible_through_day: u32) -> ChartSummary {
    let visible = days.iter().filter(|d| d.day <= visible_through_day);

    let (completed, total, perfect_days) =
        visible.fold((0u64, 0u64, 0u32), |(completed, total, perfect), d| {
            (
                completed + u64::from(d.completed),
                total + u64::from(d.total),
                perfect + u32::from(d.is_perfect()),
            )
        });

    ChartSummary {
        overall_percentage: percentage(completed, total),
        perfect_days,
    }
}

/// 1つの習慣の月間達成率
pub fn habit_completion_rate(completed_days: usize, days_in_month: u32) -> u32 {
    percentage(completed_days as u64, u64::from(days_in_month))
}
