//! Plan import/export document.
//!
//! The document is JSON shaped like the plan template:
//! `{ "week": 1, "days": [ { "day": 1, "group": "...", "exercises": [ ... ] } ] }`.
//! Imports are checked field by field before anything is built so the caller
//! can show exactly what is wrong with an uploaded file.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{DayPlan, ExercisePlan, WorkoutWeek};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlanDocumentError {
    #[error("plan file is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("plan document must be a JSON object with \"week\" and \"days\"")]
    NotAnObject,

    #[error("missing required field `{path}`")]
    MissingField { path: String },

    #[error("field `{path}` must be {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("field `{path}` must be at least 1")]
    ZeroSets { path: String },

    #[error("could not encode plan document: {0}")]
    Encode(String),
}

/// Parses and validates an uploaded plan document.
///
/// # Errors
///
/// Returns `PlanDocumentError` naming the first offending field.
pub fn parse_plan_document(text: &str) -> Result<WorkoutWeek, PlanDocumentError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PlanDocumentError::InvalidJson(e.to_string()))?;
    plan_from_value(&value)
}

/// Validates an already-parsed JSON value as a plan document.
///
/// # Errors
///
/// Returns `PlanDocumentError` naming the first offending field.
pub fn plan_from_value(value: &Value) -> Result<WorkoutWeek, PlanDocumentError> {
    let root = value.as_object().ok_or(PlanDocumentError::NotAnObject)?;

    let week = require_u32(root, "", "week")?;
    let days = require_array(root, "", "days")?;

    let days = days
        .iter()
        .enumerate()
        .map(|(i, day)| parse_day(day, &format!("days[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WorkoutWeek::new(week, days))
}

fn parse_day(value: &Value, path: &str) -> Result<DayPlan, PlanDocumentError> {
    let object = value.as_object().ok_or_else(|| PlanDocumentError::WrongType {
        path: path.to_owned(),
        expected: "an object",
    })?;

    let day = require_u32(object, path, "day")?;
    let group = require_string(object, path, "group")?;
    let exercises = require_array(object, path, "exercises")?
        .iter()
        .enumerate()
        .map(|(i, exercise)| parse_exercise(exercise, &format!("{path}.exercises[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DayPlan::new(day, group, exercises))
}

fn parse_exercise(value: &Value, path: &str) -> Result<ExercisePlan, PlanDocumentError> {
    let object = value.as_object().ok_or_else(|| PlanDocumentError::WrongType {
        path: path.to_owned(),
        expected: "an object",
    })?;

    let name = require_string(object, path, "name")?;
    let sets = require_u32(object, path, "sets")?;
    if sets == 0 {
        return Err(PlanDocumentError::ZeroSets {
            path: join(path, "sets"),
        });
    }
    let reps = require_string(object, path, "reps")?;
    let technique = require_string(object, path, "technique")?;
    let notes = require_string(object, path, "notes")?;

    let alternatives_path = join(path, "alternatives");
    let alternatives = require_array(object, path, "alternatives")?
        .iter()
        .enumerate()
        .map(|(i, alt)| {
            alt.as_str()
                .map(str::to_owned)
                .ok_or_else(|| PlanDocumentError::WrongType {
                    path: format!("{alternatives_path}[{i}]"),
                    expected: "a string",
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExercisePlan {
        name,
        sets,
        reps,
        technique,
        notes,
        alternatives,
    })
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_owned()
    } else {
        format!("{path}.{field}")
    }
}

fn require<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<&'a Value, PlanDocumentError> {
    match object.get(field) {
        Some(Value::Null) | None => Err(PlanDocumentError::MissingField {
            path: join(path, field),
        }),
        Some(value) => Ok(value),
    }
}

fn require_u32(
    object: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<u32, PlanDocumentError> {
    require(object, path, field)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| PlanDocumentError::WrongType {
            path: join(path, field),
            expected: "a non-negative integer",
        })
}

fn require_string(
    object: &Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<String, PlanDocumentError> {
    require(object, path, field)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| PlanDocumentError::WrongType {
            path: join(path, field),
            expected: "a string",
        })
}

fn require_array<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<&'a Vec<Value>, PlanDocumentError> {
    require(object, path, field)?
        .as_array()
        .ok_or_else(|| PlanDocumentError::WrongType {
            path: join(path, field),
            expected: "a list",
        })
}

/// Encodes a plan template as a pretty-printed document.
///
/// # Errors
///
/// Returns `PlanDocumentError::Encode` if serialization fails.
pub fn export_plan_document(plan: &WorkoutWeek) -> Result<String, PlanDocumentError> {
    serde_json::to_string_pretty(plan).map_err(|e| PlanDocumentError::Encode(e.to_string()))
}

/// Suggested file name for an exported week.
#[must_use]
pub fn plan_file_name(week: u32) -> String {
    format!("workout-week-{week}.json")
}
