use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Schema steps in application order. Versions are never reused.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS practice_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
)];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    for &(version, ddl) in MIGRATIONS {
        if applied.contains(&version) {
            continue;
        }
        apply(pool, version, ddl)
            .await
            .map_err(|source| SqliteInitError::Migration { version, source })?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(())
}

async fn apply(pool: &SqlitePool, version: i64, ddl: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(ddl).execute(&mut *tx).await?;
    sqlx::query(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)
         ON CONFLICT(version) DO NOTHING",
    )
    .bind(version)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;
    tx.commit().await
}
