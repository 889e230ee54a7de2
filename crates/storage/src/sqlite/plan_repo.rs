use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use workout_core::model::{UserId, WorkoutWeek};

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{PlanRepository, StorageError};

#[async_trait]
impl PlanRepository for SqliteRepository {
    async fn load_active_plan(&self, user: UserId) -> Result<Option<WorkoutWeek>, StorageError> {
        let row = sqlx::query("SELECT data FROM active_plans WHERE user_id = ?1")
            .bind(user.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            let data: String = row.try_get("data").map_err(ser)?;
            serde_json::from_str(&data).map_err(ser)
        })
        .transpose()
    }

    async fn save_active_plan(&self, user: UserId, plan: &WorkoutWeek) -> Result<(), StorageError> {
        let data = serde_json::to_string(plan).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO active_plans (user_id, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user.to_string())
        .bind(data)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
