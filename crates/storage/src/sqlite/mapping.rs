use sqlx::Row;
use workout_core::model::{UserId, WeightRecord, WeightRecordDraft, WeightRecordId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn record_id_to_i64(id: WeightRecordId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("id overflow".into()))
}

pub(crate) fn record_id_from_i64(v: i64) -> Result<WeightRecordId, StorageError> {
    u64::try_from(v)
        .map(WeightRecordId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid record id: {v}")))
}

pub(crate) fn map_weight_row(row: &sqlx::sqlite::SqliteRow) -> Result<WeightRecord, StorageError> {
    let id = record_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let user_id: UserId = row
        .try_get::<String, _>("user_id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    // Rows are re-validated on read.
    let entry = WeightRecordDraft {
        exercise_name: row.try_get("exercise_name").map_err(ser)?,
        weight: row.try_get("weight").map_err(ser)?,
        reps: u32_from_i64("reps", row.try_get::<i64, _>("reps").map_err(ser)?)?,
        sets: u32_from_i64("sets", row.try_get::<i64, _>("sets").map_err(ser)?)?,
        date: row.try_get("date").map_err(ser)?,
        notes: row.try_get("notes").map_err(ser)?,
    }
    .validate()
    .map_err(ser)?;

    Ok(WeightRecord {
        id,
        user_id,
        entry,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
