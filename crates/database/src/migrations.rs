//! Database migrations

use sqlx::SqlitePool;
use tracing::info;

use crate::types::{DatabaseError, DatabaseResult};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &SqlitePool) -> DatabaseResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|error| DatabaseError::MigrationError(error.to_string()))?;
    info!("database migrations applied");
    Ok(())
}
