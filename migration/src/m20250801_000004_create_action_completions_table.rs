use sea_orm_migration::{prelude::*, schema::*};

/// トグルの upsert が衝突判定に使う
const ACTION_DAY_UNIQUE: &str = "uq_action_completions_action_day";
const USER_MONTH_INDEX: &str = "idx_action_completions_user_month";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActionCompletions::Table)
                    .if_not_exists()
                    .col(pk_uuid(ActionCompletions::CompletionId))
                    .col(uuid(ActionCompletions::ActionId))
                    .col(uuid(ActionCompletions::UserId))
                    .col(integer(ActionCompletions::Year))
                    .col(integer(ActionCompletions::Month))
                    .col(integer(ActionCompletions::Day))
                    .col(boolean(ActionCompletions::Completed).default(false))
                    .col(text_null(ActionCompletions::Notes))
                    .col(
                        timestamp_with_time_zone(ActionCompletions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_action_completions_action_id")
                            .from(ActionCompletions::Table, ActionCompletions::ActionId)
                            .to(Actions::Table, Actions::ActionId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_action_completions_user_id")
                            .from(ActionCompletions::Table, ActionCompletions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let indexes = [
            Index::create()
                .if_not_exists()
                .unique()
                .name(ACTION_DAY_UNIQUE)
                .table(ActionCompletions::Table)
                .col(ActionCompletions::ActionId)
                .col(ActionCompletions::Year)
                .col(ActionCompletions::Month)
                .col(ActionCompletions::Day)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name(USER_MONTH_INDEX)
                .table(ActionCompletions::Table)
                .col(ActionCompletions::UserId)
                .col(ActionCompletions::Year)
                .col(ActionCompletions::Month)
                .to_owned(),
        ];
        for index in indexes {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ActionCompletions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ActionCompletions {
    Table,
    CompletionId,
    ActionId,
    UserId,
    Year,
    Month,
    Day,
    Completed,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Actions {
    Table,
    ActionId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
