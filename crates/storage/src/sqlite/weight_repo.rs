use async_trait::async_trait;
use chrono::{DateTime, Utc};
use workout_core::model::{UserId, WeightEntry, WeightRecord, WeightRecordId};

use super::SqliteRepository;
use super::mapping::{conn, map_weight_row, record_id_from_i64, record_id_to_i64};
use crate::repository::{StorageError, WeightRepository};

#[async_trait]
impl WeightRepository for SqliteRepository {
    async fn insert_record(
        &self,
        user: UserId,
        entry: &WeightEntry,
        created_at: DateTime<Utc>,
    ) -> Result<WeightRecord, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO weight_records (
                user_id, exercise_name, weight, reps, sets, date, notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(user.to_string())
        .bind(entry.exercise_name())
        .bind(entry.weight())
        .bind(i64::from(entry.reps()))
        .bind(i64::from(entry.sets()))
        .bind(entry.date())
        .bind(entry.notes())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(WeightRecord {
            id: record_id_from_i64(res.last_insert_rowid())?,
            user_id: user,
            entry: entry.clone(),
            created_at,
        })
    }

    async fn update_record(
        &self,
        user: UserId,
        id: WeightRecordId,
        entry: &WeightEntry,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE weight_records SET
                exercise_name = ?1,
                weight = ?2,
                reps = ?3,
                sets = ?4,
                date = ?5,
                notes = ?6
            WHERE id = ?7 AND user_id = ?8
            ",
        )
        .bind(entry.exercise_name())
        .bind(entry.weight())
        .bind(i64::from(entry.reps()))
        .bind(i64::from(entry.sets()))
        .bind(entry.date())
        .bind(entry.notes())
        .bind(record_id_to_i64(id)?)
        .bind(user.to_string())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_record(&self, user: UserId, id: WeightRecordId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM weight_records WHERE id = ?1 AND user_id = ?2")
            .bind(record_id_to_i64(id)?)
            .bind(user.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_records(&self, user: UserId) -> Result<Vec<WeightRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, exercise_name, weight, reps, sets, date, notes, created_at
            FROM weight_records
            WHERE user_id = ?1
            ORDER BY date DESC, id DESC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_weight_row).collect()
    }
}
