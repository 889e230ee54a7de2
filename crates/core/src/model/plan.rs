use serde::{Deserialize, Serialize};

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single exercise slot in a day's plan.
///
/// `reps` is free text because plans use ranges and cues ("8-12", "AMRAP").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub technique: String,
    pub notes: String,
    pub alternatives: Vec<String>,
}

impl ExercisePlan {
    #[must_use]
    pub fn new(name: impl Into<String>, sets: u32, reps: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sets,
            reps: reps.into(),
            technique: String::new(),
            notes: String::new(),
            alternatives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_technique(mut self, technique: impl Into<String>) -> Self {
        self.technique = technique.into();
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }
}

//
// ─── DAY ───────────────────────────────────────────────────────────────────────
//

/// One training day: an ordinal, the muscle group it targets, and its exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub group: String,
    pub exercises: Vec<ExercisePlan>,
}

impl DayPlan {
    #[must_use]
    pub fn new(day: u32, group: impl Into<String>, exercises: Vec<ExercisePlan>) -> Self {
        Self {
            day,
            group: group.into(),
            exercises,
        }
    }
}

//
// ─── WEEK ──────────────────────────────────────────────────────────────────────
//

/// Immutable weekly template, free of any completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutWeek {
    pub week: u32,
    pub days: Vec<DayPlan>,
}

impl WorkoutWeek {
    #[must_use]
    pub fn new(week: u32, days: Vec<DayPlan>) -> Self {
        Self { week, days }
    }

    /// Total number of exercise slots across all days.
    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|day| day.exercises.len()).sum()
    }
}
