use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use workout_core::model::{UserId, WeekProgress};

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeekProgress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT data
            FROM workout_progress
            WHERE user_id = ?1 AND week = ?2
            ",
        )
        .bind(user.to_string())
        .bind(i64::from(week))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row.try_get("data").map_err(ser)?;
        serde_json::from_str(&data).map(Some).map_err(ser)
    }

    async fn save_progress(
        &self,
        user: UserId,
        progress: &WeekProgress,
    ) -> Result<(), StorageError> {
        let data = serde_json::to_string(progress).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO workout_progress (user_id, week, data, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, week) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user.to_string())
        .bind(i64::from(progress.week()))
        .bind(data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
