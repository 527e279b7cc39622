// migration/src/main.rs
use migration::Migrator;
use sea_orm_migration::prelude::*;

// DATABASE_URL を読んで up / down / fresh / status を実行する
#[async_std::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
