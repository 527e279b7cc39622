use sea_orm_migration::{prelude::*, schema::*};

const USER_CREATED_INDEX: &str = "idx_actions_user_created_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Actions::Table)
                    .if_not_exists()
                    .col(pk_uuid(Actions::ActionId))
                    .col(uuid(Actions::UserId))
                    .col(text(Actions::ActionTitle))
                    .col(timestamp_with_time_zone(Actions::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actions_user_id")
                            .from(Actions::Table, Actions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 一覧は作成順
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(USER_CREATED_INDEX)
                    .table(Actions::Table)
                    .col(Actions::UserId)
                    .col(Actions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // インデックスはテーブルと一緒に消える
        manager
            .drop_table(Table::drop().table(Actions::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Actions {
    Table,
    ActionId,
    UserId,
    ActionTitle,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
