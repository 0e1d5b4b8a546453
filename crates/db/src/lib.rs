//! Postgres storage for webhook registrations and the change trigger.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Install the `record_changes` notify trigger on `table`.
///
/// Re-running replaces the existing trigger.
pub async fn watch_collection(pool: &DbPool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT watch_collection($1::regclass)")
        .bind(table)
        .execute(pool)
        .await?;
    tracing::info!(table, "Change trigger installed");
    Ok(())
}
