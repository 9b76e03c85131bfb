//! Persistence layer for the movie catalog.
//!
//! - [`models`]: `FromRow` entity rows and the wire DTOs built from them.
//! - [`mapping`]: conversions between entities and DTOs.
//! - [`repositories`]: zero-sized repository structs taking `&PgPool`.

use sqlx::postgres::PgPoolOptions;

pub mod mapping;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
