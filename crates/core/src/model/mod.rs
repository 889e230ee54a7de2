mod ids;
mod plan;
mod progress;
mod timer;
mod weight;

pub use ids::{ParseIdError, UserId, WeightRecordId};

pub use plan::{DayPlan, ExercisePlan, WorkoutWeek};
pub use progress::{
    DayProgress, ExerciseProgress, ProgressError, ProgressSummary, SetAdvance, WeekProgress,
};
pub use timer::{DEFAULT_REST_SECONDS, RestTimer, TimerSnapshot, TimerTick, format_countdown};
pub use weight::{
    WeightEntry, WeightProgress, WeightRecord, WeightRecordDraft, WeightRecordError,
    recent_records, summarize_weights,
};
