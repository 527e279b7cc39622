// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 認証関連マイグレーション
mod m20250801_000001_create_users_table;
mod m20250801_000002_create_refresh_tokens_table;

// 習慣トラッキング関連マイグレーション
mod m20250801_000003_create_actions_table;
mod m20250801_000004_create_action_completions_table;

// オンボーディング情報
mod m20250801_000005_create_user_profiles_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users_table::Migration),
            // 以降はすべて users に依存
            Box::new(m20250801_000002_create_refresh_tokens_table::Migration),
            Box::new(m20250801_000003_create_actions_table::Migration),
            // actions に依存
            Box::new(m20250801_000004_create_action_completions_table::Migration),
            Box::new(m20250801_000005_create_user_profiles_table::Migration),
        ]
    }
}
