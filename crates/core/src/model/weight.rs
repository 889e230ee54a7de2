use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::model::ids::{UserId, WeightRecordId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum WeightRecordError {
    #[error("exercise name cannot be empty")]
    EmptyExerciseName,

    #[error("weight must be a positive number, got {0}")]
    InvalidWeight(f64),

    #[error("reps must be > 0")]
    InvalidReps,

    #[error("sets must be > 0")]
    InvalidSets,
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a logged lift.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecordDraft {
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl WeightRecordDraft {
    /// Validate the draft into a `WeightEntry`.
    ///
    /// Trims the exercise name and drops blank notes.
    ///
    /// # Errors
    ///
    /// Returns `WeightRecordError` if the name is blank, the weight is not a
    /// positive finite number, or reps/sets are zero.
    pub fn validate(self) -> Result<WeightEntry, WeightRecordError> {
        let exercise_name = self.exercise_name.trim().to_owned();
        if exercise_name.is_empty() {
            return Err(WeightRecordError::EmptyExerciseName);
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(WeightRecordError::InvalidWeight(self.weight));
        }
        if self.reps == 0 {
            return Err(WeightRecordError::InvalidReps);
        }
        if self.sets == 0 {
            return Err(WeightRecordError::InvalidSets);
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        Ok(WeightEntry {
            exercise_name,
            weight: self.weight,
            reps: self.reps,
            sets: self.sets,
            date: self.date,
            notes,
        })
    }
}

/// Validated content of a weight record.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    exercise_name: String,
    weight: f64,
    reps: u32,
    sets: u32,
    date: NaiveDate,
    notes: Option<String>,
}

impl WeightEntry {
    #[must_use]
    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn reps(&self) -> u32 {
        self.reps
    }

    #[must_use]
    pub fn sets(&self) -> u32 {
        self.sets
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// A persisted weight record owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecord {
    pub id: WeightRecordId,
    pub user_id: UserId,
    pub entry: WeightEntry,
    pub created_at: DateTime<Utc>,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Per-exercise rollup of weight records.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightProgress {
    pub exercise_name: String,
    pub current_weight: f64,
    pub max_weight: f64,
    pub total_workouts: u32,
    pub last_updated: NaiveDate,
    /// Current weight as a share of the best weight, rounded.
    pub progress_percentage: u32,
}

/// Rolls records up per exercise, ordered by exercise name.
///
/// The current weight comes from the most recent date; records sharing that
/// date resolve toward the one listed last.
#[must_use]
pub fn summarize_weights(records: &[WeightRecord]) -> Vec<WeightProgress> {
    let mut by_exercise: BTreeMap<&str, WeightProgress> = BTreeMap::new();

    for record in records {
        let entry = &record.entry;
        by_exercise
            .entry(entry.exercise_name())
            .and_modify(|progress| {
                progress.total_workouts = progress.total_workouts.saturating_add(1);
                if entry.weight() > progress.max_weight {
                    progress.max_weight = entry.weight();
                }
                if entry.date() >= progress.last_updated {
                    progress.current_weight = entry.weight();
                    progress.last_updated = entry.date();
                }
            })
            .or_insert_with(|| WeightProgress {
                exercise_name: entry.exercise_name().to_owned(),
                current_weight: entry.weight(),
                max_weight: entry.weight(),
                total_workouts: 1,
                last_updated: entry.date(),
                progress_percentage: 100,
            });
    }

    by_exercise
        .into_values()
        .map(|mut progress| {
            progress.progress_percentage = percentage_of(progress.current_weight, progress.max_weight);
            progress
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage_of(current: f64, max: f64) -> u32 {
    if max <= 0.0 {
        return 0;
    }
    (current / max * 100.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Most recent records for one exercise, newest first.
#[must_use]
pub fn recent_records<'a>(
    records: &'a [WeightRecord],
    exercise_name: &str,
    limit: usize,
) -> Vec<&'a WeightRecord> {
    let mut matching: Vec<&WeightRecord> = records
        .iter()
        .filter(|r| r.entry.exercise_name() == exercise_name)
        .collect();
    matching.sort_by(|a, b| b.entry.date().cmp(&a.entry.date()));
    matching.truncate(limit);
    matching
}
