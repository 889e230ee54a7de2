use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::plan::{DayPlan, ExercisePlan, WorkoutWeek};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Addressing errors for progress mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("day index {day} is out of range (plan has {days} days)")]
    DayOutOfRange { day: usize, days: usize },

    #[error("exercise index {exercise} is out of range for day index {day} ({exercises} exercises)")]
    ExerciseOutOfRange {
        day: usize,
        exercise: usize,
        exercises: usize,
    },
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Aggregate completion counts across the whole week.
///
/// Only fully completed exercises count; partial sets do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

impl ProgressSummary {
    /// Builds a summary, rounding the percentage half-up. Zero when `total` is zero.
    #[must_use]
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        let percentage = if total == 0 {
            0
        } else {
            let rounded = (200 * completed + total) / (2 * total);
            u8::try_from(rounded).unwrap_or(100)
        };
        Self {
            completed,
            total,
            percentage,
        }
    }
}

/// Result of completing one set on an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetAdvance {
    /// `current_set` moved forward by one.
    Advanced {
        current_set: u32,
        sets: u32,
        exercise_completed: bool,
        day_completed: bool,
    },
    /// Every set was already done; nothing changed.
    AlreadyComplete,
}

impl SetAdvance {
    /// True when the set just completed was not the exercise's last one.
    #[must_use]
    pub fn has_sets_remaining(&self) -> bool {
        matches!(self, SetAdvance::Advanced { current_set, sets, .. } if current_set < sets)
    }
}

//
// ─── EXERCISE PROGRESS ─────────────────────────────────────────────────────────
//

/// An exercise template plus its completion overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
    #[serde(flatten)]
    plan: ExercisePlan,
    completed: bool,
    current_set: u32,
}

impl ExerciseProgress {
    #[must_use]
    pub fn zeroed(plan: ExercisePlan) -> Self {
        Self {
            plan,
            completed: false,
            current_set: 0,
        }
    }

    #[must_use]
    pub fn plan(&self) -> &ExercisePlan {
        &self.plan
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.plan.name
    }

    #[must_use]
    pub fn sets(&self) -> u32 {
        self.plan.sets
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    fn complete_set(&mut self) -> Option<u32> {
        if self.current_set >= self.plan.sets {
            return None;
        }
        self.current_set += 1;
        if self.current_set == self.plan.sets {
            self.completed = true;
        }
        Some(self.current_set)
    }

    fn reset(&mut self) {
        self.completed = false;
        self.current_set = 0;
    }
}

//
// ─── DAY PROGRESS ──────────────────────────────────────────────────────────────
//

/// A day of the plan with per-exercise progress.
///
/// `completed` is kept equal to the AND of every exercise's `completed` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    day: u32,
    group: String,
    exercises: Vec<ExerciseProgress>,
    completed: bool,
}

impl DayProgress {
    #[must_use]
    pub fn zeroed(plan: &DayPlan) -> Self {
        Self {
            day: plan.day,
            group: plan.group.clone(),
            exercises: plan
                .exercises
                .iter()
                .cloned()
                .map(ExerciseProgress::zeroed)
                .collect(),
            completed: false,
        }
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseProgress] {
        &self.exercises
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    fn refresh_completed(&mut self) {
        self.completed = self.exercises.iter().all(ExerciseProgress::completed);
    }

    fn to_plan(&self) -> DayPlan {
        DayPlan {
            day: self.day,
            group: self.group.clone(),
            exercises: self.exercises.iter().map(|e| e.plan.clone()).collect(),
        }
    }
}

//
// ─── WEEK PROGRESS ─────────────────────────────────────────────────────────────
//

/// The active week: plan content plus completion state. Root aggregate of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekProgress {
    week: u32,
    days: Vec<DayProgress>,
}

impl WeekProgress {
    /// Materializes a plan with every exercise and day marked not completed.
    #[must_use]
    pub fn zeroed(plan: &WorkoutWeek) -> Self {
        Self {
            week: plan.week,
            days: plan.days.iter().map(DayProgress::zeroed).collect(),
        }
    }

    /// Applies previously saved progress onto a template.
    ///
    /// Days are matched by their `day` ordinal and exercises by name within a
    /// day, so re-ordering a plan keeps per-exercise progress. A repeated
    /// ordinal or name pairs up by occurrence: the second "Plank" in a day
    /// matches the second saved "Plank". Saved entries missing from the
    /// template are dropped; new template entries start zeroed. `current_set`
    /// is clamped to the template's set count.
    #[must_use]
    pub fn reconcile(template: &WorkoutWeek, saved: Option<&WeekProgress>) -> Self {
        let Some(saved) = saved else {
            return Self::zeroed(template);
        };

        let mut saved_ordinals = HashMap::new();
        let saved_days: HashMap<(u32, usize), HashMap<(&str, usize), &ExerciseProgress>> = saved
            .days
            .iter()
            .map(|day| {
                let mut names = HashMap::new();
                let by_name = day
                    .exercises
                    .iter()
                    .map(|exercise| (occurrence(&mut names, exercise.name()), exercise))
                    .collect();
                (occurrence(&mut saved_ordinals, day.day), by_name)
            })
            .collect();

        let mut template_ordinals = HashMap::new();
        let days = template
            .days
            .iter()
            .map(|day_plan| {
                let previous = saved_days.get(&occurrence(&mut template_ordinals, day_plan.day));
                let mut names = HashMap::new();
                let exercises = day_plan
                    .exercises
                    .iter()
                    .map(|exercise_plan| {
                        let key = occurrence(&mut names, exercise_plan.name.as_str());
                        let mut progress = ExerciseProgress::zeroed(exercise_plan.clone());
                        if let Some(old) = previous.and_then(|m| m.get(&key)) {
                            progress.completed = old.completed;
                            progress.current_set = old.current_set.min(exercise_plan.sets);
                        }
                        progress
                    })
                    .collect();
                let mut day = DayProgress {
                    day: day_plan.day,
                    group: day_plan.group.clone(),
                    exercises,
                    completed: false,
                };
                day.refresh_completed();
                day
            })
            .collect();

        Self {
            week: template.week,
            days,
        }
    }

    #[must_use]
    pub fn week(&self) -> u32 {
        self.week
    }

    #[must_use]
    pub fn days(&self) -> &[DayProgress] {
        &self.days
    }

    /// Looks up an exercise by index.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when either index is out of range.
    pub fn exercise(&self, day: usize, exercise: usize) -> Result<&ExerciseProgress, ProgressError> {
        let day_progress = self.days.get(day).ok_or(ProgressError::DayOutOfRange {
            day,
            days: self.days.len(),
        })?;
        day_progress
            .exercises
            .get(exercise)
            .ok_or(ProgressError::ExerciseOutOfRange {
                day,
                exercise,
                exercises: day_progress.exercises.len(),
            })
    }

    fn day_mut(&mut self, day: usize, exercise: usize) -> Result<&mut DayProgress, ProgressError> {
        let days = self.days.len();
        let day_progress = self
            .days
            .get_mut(day)
            .ok_or(ProgressError::DayOutOfRange { day, days })?;
        if exercise >= day_progress.exercises.len() {
            return Err(ProgressError::ExerciseOutOfRange {
                day,
                exercise,
                exercises: day_progress.exercises.len(),
            });
        }
        Ok(day_progress)
    }

    /// Flips an exercise's `completed` flag without touching `current_set`.
    ///
    /// Returns the new flag.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when either index is out of range; nothing changes.
    pub fn toggle_exercise(&mut self, day: usize, exercise: usize) -> Result<bool, ProgressError> {
        let day_progress = self.day_mut(day, exercise)?;
        let target = &mut day_progress.exercises[exercise];
        target.completed = !target.completed;
        let completed = target.completed;
        day_progress.refresh_completed();
        Ok(completed)
    }

    /// Completes exactly one set of an exercise.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when either index is out of range; nothing changes.
    pub fn complete_set(&mut self, day: usize, exercise: usize) -> Result<SetAdvance, ProgressError> {
        let day_progress = self.day_mut(day, exercise)?;
        let target = &mut day_progress.exercises[exercise];
        let sets = target.sets();
        let Some(current_set) = target.complete_set() else {
            return Ok(SetAdvance::AlreadyComplete);
        };
        let exercise_completed = target.completed;
        if exercise_completed {
            day_progress.refresh_completed();
        }
        Ok(SetAdvance::Advanced {
            current_set,
            sets,
            exercise_completed,
            day_completed: day_progress.completed,
        })
    }

    /// Zeroes all progress while keeping plan content and week number.
    pub fn reset(&mut self) {
        for day in &mut self.days {
            day.exercises.iter_mut().for_each(ExerciseProgress::reset);
            day.completed = false;
        }
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        let total = self.days.iter().map(|d| d.exercises.len()).sum();
        let completed = self
            .days
            .iter()
            .flat_map(|d| d.exercises.iter())
            .filter(|e| e.completed)
            .count();
        ProgressSummary::from_counts(completed, total)
    }

    /// Strips progress, returning the plan template.
    #[must_use]
    pub fn to_plan(&self) -> WorkoutWeek {
        WorkoutWeek {
            week: self.week,
            days: self.days.iter().map(DayProgress::to_plan).collect(),
        }
    }
}

/// Pairs `key` with how many times it was seen before.
fn occurrence<K: Copy + Eq + Hash>(seen: &mut HashMap<K, usize>, key: K) -> (K, usize) {
    let count = seen.entry(key).or_insert(0);
    let nth = *count;
    *count += 1;
    (key, nth)
}
