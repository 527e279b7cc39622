use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    // ユーザーごとに1行
                    .col(pk_uuid(UserProfiles::UserId))
                    .col(string_len_null(UserProfiles::Role, 32))
                    .col(json_binary(UserProfiles::Activities).default(Expr::cust("'[]'::jsonb")))
                    .col(json_binary_null(UserProfiles::Platforms))
                    .col(boolean(UserProfiles::OnboardingCompleted).default(false))
                    .col(timestamp_with_time_zone_null(UserProfiles::OnboardingCompletedAt))
                    .col(
                        timestamp_with_time_zone(UserProfiles::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profiles_user_id")
                            .from(UserProfiles::Table, UserProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserProfiles {
    Table,
    UserId,
    Role,
    Activities,
    Platforms,
    OnboardingCompleted,
    OnboardingCompletedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
