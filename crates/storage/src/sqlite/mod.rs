use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{PracticeStateRepository, Storage};

mod migrate;
mod practice_state_repo;

/// Private in-memory databases live per connection.
const PRIVATE_MEMORY_URL: &str = "sqlite::memory:";

/// Key/value practice state in a single `SQLite` file.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("schema migration {version} failed: {source}")]
    Migration {
        version: i64,
        #[source]
        source: sqlx::Error,
    },
}

impl SqliteRepository {
    /// Open the practice database at `database_url`.
    ///
    /// `sqlite::memory:` gets a single pooled connection so every query sees
    /// the same database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection or its PRAGMA setup fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let private_memory = database_url == PRIVATE_MEMORY_URL;
        let pool = SqlitePoolOptions::new()
            .max_connections(if private_memory { 1 } else { 4 })
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if !private_memory {
                        sqlx::query("PRAGMA journal_mode = WAL;")
                            .execute(&mut *conn)
                            .await?;
                    }
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        tracing::debug!(url = database_url, "opened practice database");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the schema up to the latest version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::Migration` naming the step that failed.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Open and migrate a `SQLite` practice database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let practice: Arc<dyn PracticeStateRepository> = Arc::new(repo);
        Ok(Self { practice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PracticeState;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[tokio::test]
    async fn private_memory_database_keeps_state_between_queries() {
        let storage = Storage::sqlite(PRIVATE_MEMORY_URL).await.unwrap();
        let state = PracticeState {
            current_index: 3,
            ..PracticeState::default()
        };
        storage.practice.save_state(&state).await.unwrap();
        assert_eq!(storage.practice.load_state().await.unwrap().current_index, 3);
    }
}
