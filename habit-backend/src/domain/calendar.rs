// src/domain/calendar.rs

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Year must be between {MIN_YEAR} and {MAX_YEAR}, got {0}")]
    InvalidYear(i32),

    #[error("Day must be between 1 and {days_in_month}, got {day}")]
    InvalidDay { day: u32, days_in_month: u32 },
}

/// 現在日付の取得元
///
/// 「今日」はサーバーのローカル日付。テストでは `FixedClock` を差し込む。
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// 不正な日付の場合は None
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// 今日から見た月の位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthPosition {
    Past,
    Current,
    Future,
}

/// 年月の組（月は 1-12）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(&self) -> NaiveDate {
        // 年月は new() で検証済み
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 月の日数（28-31）
    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map_or(31, |last| last.day())
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// 月内の日付を検証して返す
    pub fn date(&self, day: u32) -> Result<NaiveDate, CalendarError> {
        let days_in_month = self.days_in_month();
        if day == 0 || day > days_in_month {
            return Err(CalendarError::InvalidDay { day, days_in_month });
        }
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .ok_or(CalendarError::InvalidDay { day, days_in_month })
    }

    pub fn position(&self, today: NaiveDate) -> MonthPosition {
        match (*self).cmp(&Self::of(today)) {
            std::cmp::Ordering::Less => MonthPosition::Past,
            std::cmp::Ordering::Equal => MonthPosition::Current,
            std::cmp::Ordering::Greater => MonthPosition::Future,
        }
    }

    /// 集計の基準日。当月は今日、過去月は月末日、未来月は None。
    pub fn reference_day(&self, today: NaiveDate) -> Option<u32> {
        match self.position(today) {
            MonthPosition::Past => Some(self.days_in_month()),
            MonthPosition::Current => Some(today.day()),
            MonthPosition::Future => None,
        }
    }

    /// グラフに表示する最終日（未来月は 0）
    pub fn visible_through_day(&self, today: NaiveDate) -> u32 {
        self.reference_day(today).unwrap_or(0)
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// 指定日が今日より後か
pub fn is_future_day(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}
