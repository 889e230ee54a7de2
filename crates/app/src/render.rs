//! Plain-text views printed by the CLI.

use std::fmt::Write as _;

use workout_core::model::{ProgressSummary, WeekProgress, WeightProgress, WeightRecord};

pub fn summary_line(summary: &ProgressSummary) -> String {
    format!(
        "{}/{} exercises complete ({}%)",
        summary.completed, summary.total, summary.percentage
    )
}

pub fn week(progress: &WeekProgress) -> String {
    let mut out = format!("Week {}\n", progress.week());
    for (d, day) in progress.days().iter().enumerate() {
        let marker = if day.completed() { " (done)" } else { "" };
        let _ = writeln!(out, "\nDay {} - {}{marker}", d + 1, day.group());
        for (e, exercise) in day.exercises().iter().enumerate() {
            let check = if exercise.completed() { 'x' } else { ' ' };
            let plan = exercise.plan();
            let _ = writeln!(
                out,
                "  {}. [{check}] {}  {}/{} sets x {}",
                e + 1,
                plan.name,
                exercise.current_set(),
                plan.sets,
                plan.reps
            );
            if !plan.technique.is_empty() {
                let _ = writeln!(out, "       technique: {}", plan.technique);
            }
            if !plan.alternatives.is_empty() {
                let _ = writeln!(out, "       alternatives: {}", plan.alternatives.join(", "));
            }
        }
    }
    let _ = write!(out, "\n{}", summary_line(&progress.summary()));
    out
}

pub fn weight_record(record: &WeightRecord) -> String {
    let entry = &record.entry;
    let mut line = format!(
        "#{} {} {}: {} x {} reps x {} sets",
        record.id,
        entry.date(),
        entry.exercise_name(),
        entry.weight(),
        entry.reps(),
        entry.sets()
    );
    if let Some(notes) = entry.notes() {
        let _ = write!(line, " ({notes})");
    }
    line
}

pub fn weight_progress(progress: &WeightProgress) -> String {
    format!(
        "{}: current {} / best {} ({}%), {} workouts, last {}",
        progress.exercise_name,
        progress.current_weight,
        progress.max_weight,
        progress.progress_percentage,
        progress.total_workouts,
        progress.last_updated
    )
}
