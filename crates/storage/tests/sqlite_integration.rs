use chrono::NaiveDate;
use storage::repository::{
    PlanRepository, ProgressRepository, StorageError, TimerSnapshotRepository, WeightRepository,
};
use storage::sqlite::SqliteRepository;
use workout_core::default_plan;
use workout_core::model::{
    TimerSnapshot, UserId, WeekProgress, WeightEntry, WeightRecordDraft, WorkoutWeek,
};
use workout_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn entry(name: &str, weight: f64, day: u32, notes: Option<&str>) -> WeightEntry {
    WeightRecordDraft {
        exercise_name: name.to_owned(),
        weight,
        reps: 6,
        sets: 4,
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
        notes: notes.map(str::to_owned),
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn sqlite_progress_upsert_replaces_snapshot() {
    let repo = connect("memdb_progress").await;
    let user = UserId::for_email("lifter@example.com");
    let mut progress = WeekProgress::zeroed(&default_plan());

    assert!(repo.load_progress(user, 1).await.unwrap().is_none());

    repo.save_progress(user, &progress).await.unwrap();
    progress.complete_set(0, 0).unwrap();
    progress.toggle_exercise(1, 2).unwrap();
    repo.save_progress(user, &progress).await.unwrap();

    let loaded = repo.load_progress(user, 1).await.unwrap().expect("saved");
    assert_eq!(loaded, progress);
    assert_eq!(loaded.exercise(0, 0).unwrap().current_set(), 1);
}

#[tokio::test]
async fn sqlite_active_plan_round_trip() {
    let repo = connect("memdb_plans").await;
    let user = UserId::for_email("lifter@example.com");
    assert!(repo.load_active_plan(user).await.unwrap().is_none());

    let mut plan: WorkoutWeek = default_plan();
    plan.week = 3;
    plan.days.truncate(2);
    repo.save_active_plan(user, &plan).await.unwrap();
    repo.save_active_plan(user, &plan).await.unwrap();

    assert_eq!(repo.load_active_plan(user).await.unwrap(), Some(plan));
}

#[tokio::test]
async fn sqlite_weight_records_crud() {
    let repo = connect("memdb_weights").await;
    let owner = UserId::for_email("lifter@example.com");
    let other = UserId::for_email("someone@example.com");

    let older = repo
        .insert_record(owner, &entry("Deadlift", 140.0, 1, None), fixed_now())
        .await
        .unwrap();
    let newer = repo
        .insert_record(owner, &entry("Deadlift", 145.0, 8, Some("belt")), fixed_now())
        .await
        .unwrap();
    repo.insert_record(other, &entry("Deadlift", 90.0, 8, None), fixed_now())
        .await
        .unwrap();

    let listed = repo.list_records(owner).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[0].entry.notes(), Some("belt"));
    assert_eq!(listed[0].created_at, fixed_now());
    assert_eq!(listed[1].id, older.id);

    repo.update_record(owner, older.id, &entry("Deadlift", 142.5, 1, Some("straps")))
        .await
        .unwrap();
    assert!(matches!(
        repo.update_record(other, older.id, &entry("Deadlift", 1.0, 1, None))
            .await,
        Err(StorageError::NotFound)
    ));

    repo.delete_record(owner, newer.id).await.unwrap();
    assert!(matches!(
        repo.delete_record(owner, newer.id).await,
        Err(StorageError::NotFound)
    ));

    let listed = repo.list_records(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!((listed[0].entry.weight() - 142.5).abs() < f64::EPSILON);
    assert_eq!(listed[0].entry.notes(), Some("straps"));
}

#[tokio::test]
async fn sqlite_timer_snapshot_single_row() {
    let repo = connect("memdb_timer").await;
    assert_eq!(repo.load_timer().await.unwrap(), None);

    repo.save_timer(&TimerSnapshot {
        active: true,
        remaining_seconds: 90,
    })
    .await
    .unwrap();
    repo.save_timer(&TimerSnapshot {
        active: false,
        remaining_seconds: 40,
    })
    .await
    .unwrap();
    assert_eq!(
        repo.load_timer().await.unwrap(),
        Some(TimerSnapshot {
            active: false,
            remaining_seconds: 40
        })
    );

    repo.clear_timer().await.unwrap();
    assert_eq!(repo.load_timer().await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}
