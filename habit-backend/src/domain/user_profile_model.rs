// src/domain/user_profile_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// オンボーディングで登録するユーザー情報
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    #[sea_orm(nullable)]
    pub role: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub activities: Json,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub platforms: Option<Json>,

    pub onboarding_completed: bool,

    pub onboarding_completed_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,
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
}

impl Related<crate::domain::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// ユーザーの立場
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Professional,
    Freelancer,
}

impl UserRole {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "professional" => Some(Self::Professional),
            "freelancer" => Some(Self::Freelancer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professional => "professional",
            Self::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 取り組んでいる活動の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Coding,
    Designing,
    Content,
    Learning,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Designing => "designing",
            Self::Content => "content",
            Self::Learning => "learning",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 競技プログラミングサイトのユーザー名
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingPlatforms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leetcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gfg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codechef: Option<String>,
}

impl CodingPlatforms {
    /// 空白を除去し、空文字のハンドルを取り除く
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            leetcode: clean(self.leetcode),
            gfg: clean(self.gfg),
            codechef: clean(self.codechef),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.leetcode.is_none() && self.gfg.is_none() && self.codechef.is_none()
    }
}
