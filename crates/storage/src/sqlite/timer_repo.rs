use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use workout_core::model::TimerSnapshot;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64};
use crate::repository::{StorageError, TimerSnapshotRepository};

#[async_trait]
impl TimerSnapshotRepository for SqliteRepository {
    async fn load_timer(&self) -> Result<Option<TimerSnapshot>, StorageError> {
        let row = sqlx::query("SELECT active, remaining_seconds FROM timer_snapshot WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let active: i64 = row.try_get("active").map_err(ser)?;
        let remaining: i64 = row.try_get("remaining_seconds").map_err(ser)?;
        Ok(Some(TimerSnapshot {
            active: active != 0,
            remaining_seconds: u32_from_i64("remaining_seconds", remaining)?,
        }))
    }

    async fn save_timer(&self, snapshot: &TimerSnapshot) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO timer_snapshot (id, active, remaining_seconds, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                active = excluded.active,
                remaining_seconds = excluded.remaining_seconds,
                updated_at = excluded.updated_at
            ",
        )
        .bind(i64::from(snapshot.active))
        .bind(i64::from(snapshot.remaining_seconds))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_timer(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM timer_snapshot WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
