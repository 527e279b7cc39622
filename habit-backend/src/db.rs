// src/db.rs
use crate::config::AppConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_db_pool(config: &AppConfig) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(8 * 60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(config.database.sqlx_logging);

    Database::connect(opt).await
}

/// ヘルスチェック用に `SELECT 1` を投げる
pub async fn ping(conn: &DbPool) -> Result<bool, DbErr> {
    let result = conn
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1 AS ok;".to_string(),
        ))
        .await?;

    match result {
        Some(row) => Ok(row.try_get::<i32>("", "ok")? == 1),
        None => Ok(false),
    }
}
