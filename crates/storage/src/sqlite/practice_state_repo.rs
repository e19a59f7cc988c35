use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::collections::BTreeMap;

use crate::layout::PracticeState;
use crate::repository::{PracticeStateRepository, StorageError};

use super::SqliteRepository;

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl PracticeStateRepository for SqliteRepository {
    async fn load_state(&self) -> Result<PracticeState, StorageError> {
        let rows = sqlx::query("SELECT key, value FROM practice_state")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut entries = BTreeMap::new();
        for row in rows {
            let key: String = row
                .try_get("key")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            let value: String = row
                .try_get("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            entries.insert(key, value);
        }

        Ok(PracticeState::from_entries(&entries))
    }

    async fn save_state(&self, state: &PracticeState) -> Result<(), StorageError> {
        let encoded = state.to_entries()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in encoded {
            sqlx::query(
                r"
                INSERT INTO practice_state (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
