use crate::error::DbResult;
use sqlx::{Any, Pool, any::AnyPoolOptions};

/// Create a database pool from a connection string.
///
/// SQLite connections get `PRAGMA foreign_keys = ON` as they are opened, so
/// every pooled connection enforces references.
pub async fn create_pool(database_url: &str, max_connections: u32) -> DbResult<Pool<Any>> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                if conn.backend_name().eq_ignore_ascii_case("sqlite") {
                    sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
                }
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Create the schema if it does not exist yet
pub async fn run_migrations(pool: &Pool<Any>) -> DbResult<()> {
    sqlx::raw_sql(include_str!("../migrations/001_initial.sql"))
        .execute(pool)
        .await?;

    Ok(())
}
