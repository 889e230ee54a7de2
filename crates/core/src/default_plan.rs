use crate::model::{DayPlan, ExercisePlan, WorkoutWeek};

/// The plan every account starts with until it uploads its own.
#[must_use]
pub fn default_plan() -> WorkoutWeek {
    WorkoutWeek::new(
        1,
        vec![
            DayPlan::new(
                1,
                "Chest & Triceps",
                vec![
                    ExercisePlan::new("Bench Press", 4, "6-8")
                        .with_technique("Straight sets")
                        .with_notes("Last set to technical failure")
                        .with_alternatives(["Dumbbell Bench Press", "Machine Chest Press"]),
                    ExercisePlan::new("Incline Dumbbell Press", 3, "8-10")
                        .with_technique("Straight sets")
                        .with_alternatives(["Incline Smith Press"]),
                    ExercisePlan::new("Cable Fly", 3, "12-15")
                        .with_technique("Drop set on last set")
                        .with_notes("Squeeze at full contraction")
                        .with_alternatives(["Pec Deck"]),
                    ExercisePlan::new("Triceps Pushdown", 3, "10-12")
                        .with_technique("Rest-pause")
                        .with_alternatives(["Overhead Cable Extension"]),
                ],
            ),
            DayPlan::new(
                2,
                "Back & Biceps",
                vec![
                    ExercisePlan::new("Pull-up", 4, "6-10")
                        .with_technique("Straight sets")
                        .with_notes("Add load once 10 reps are clean")
                        .with_alternatives(["Lat Pulldown"]),
                    ExercisePlan::new("Barbell Row", 4, "8-10")
                        .with_technique("Straight sets")
                        .with_alternatives(["Chest-supported Row", "Seated Cable Row"]),
                    ExercisePlan::new("Straight-arm Pulldown", 3, "12-15")
                        .with_technique("Controlled eccentric"),
                    ExercisePlan::new("Barbell Curl", 3, "8-12")
                        .with_technique("Straight sets")
                        .with_alternatives(["Dumbbell Curl", "Cable Curl"]),
                ],
            ),
            DayPlan::new(
                3,
                "Legs",
                vec![
                    ExercisePlan::new("Back Squat", 4, "5-8")
                        .with_technique("Straight sets")
                        .with_notes("Belt on the two heaviest sets")
                        .with_alternatives(["Hack Squat", "Leg Press"]),
                    ExercisePlan::new("Romanian Deadlift", 3, "8-10")
                        .with_technique("Pause below the knee")
                        .with_alternatives(["Good Morning"]),
                    ExercisePlan::new("Leg Extension", 3, "12-15")
                        .with_technique("Drop set on last set"),
                    ExercisePlan::new("Standing Calf Raise", 4, "10-15")
                        .with_technique("Two-second stretch at the bottom")
                        .with_alternatives(["Seated Calf Raise"]),
                ],
            ),
            DayPlan::new(
                4,
                "Shoulders & Core",
                vec![
                    ExercisePlan::new("Overhead Press", 4, "6-8")
                        .with_technique("Straight sets")
                        .with_alternatives(["Seated Dumbbell Press"]),
                    ExercisePlan::new("Lateral Raise", 4, "12-20")
                        .with_technique("Myo-reps")
                        .with_alternatives(["Cable Lateral Raise"]),
                    ExercisePlan::new("Face Pull", 3, "15")
                        .with_technique("Straight sets"),
                    ExercisePlan::new("Hanging Leg Raise", 3, "AMRAP")
                        .with_notes("Stop two reps before form breaks")
                        .with_alternatives(["Cable Crunch"]),
                ],
            ),
        ],
    )
}
