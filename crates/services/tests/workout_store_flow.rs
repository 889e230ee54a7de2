use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use services::{
    Identity, IdentityProvider, LocalIdentityProvider, PersistEvent, SetOutcome, StoreConfig,
    StoreError, WorkoutStore,
};
use storage::repository::{
    InMemoryRepository, PlanRepository, ProgressRepository, Storage, StorageError,
    TimerSnapshotRepository,
};
use tokio::sync::broadcast;
use workout_core::default_plan;
use workout_core::model::{TimerSnapshot, UserId, WeekProgress};
use workout_core::plan_document::PlanDocumentError;

fn identity(email: &str) -> Identity {
    Identity {
        user_id: UserId::for_email(email),
        email: email.to_owned(),
        name: None,
    }
}

fn no_guard() -> StoreConfig {
    StoreConfig::default().with_duplicate_window(Duration::ZERO)
}

fn drain(rx: &mut broadcast::Receiver<PersistEvent>) -> Vec<PersistEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

const TWO_DAY_PLAN: &str = r#"{
    "week": 2,
    "days": [
        {
            "day": 1,
            "group": "Upper",
            "exercises": [
                {
                    "name": "Bench Press",
                    "sets": 2,
                    "reps": "5",
                    "technique": "Pause on chest",
                    "notes": "",
                    "alternatives": ["Floor Press"]
                }
            ]
        },
        {
            "day": 2,
            "group": "Lower",
            "exercises": [
                {
                    "name": "Back Squat",
                    "sets": 3,
                    "reps": "5",
                    "technique": "",
                    "notes": "",
                    "alternatives": []
                }
            ]
        }
    ]
}"#;

#[tokio::test]
async fn completing_every_set_finishes_exercise_and_persists() {
    let repo = InMemoryRepository::new();
    let storage = Storage::from_repository(repo.clone());
    let store = WorkoutStore::new(&storage, default_plan(), no_guard());
    let lifter = identity("lifter@example.com");
    store.switch_identity(Some(lifter.clone())).await.unwrap();

    let sets = store.snapshot().exercise(0, 0).unwrap().sets();
    for n in 1..sets {
        assert!(matches!(
            store.complete_one_set(0, 0).unwrap(),
            SetOutcome::Advanced { current_set, exercise_completed: false, .. } if current_set == n
        ));
    }
    assert_eq!(
        store.complete_one_set(0, 0).unwrap(),
        SetOutcome::Advanced {
            current_set: sets,
            sets,
            exercise_completed: true,
            day_completed: false,
        }
    );

    store.flush().await;
    let mut events = store.persist_events();
    assert_eq!(store.complete_one_set(0, 0).unwrap(), SetOutcome::AlreadyComplete);
    store.flush().await;
    assert!(drain(&mut events).is_empty(), "no-op completion must not write");

    let saved = repo
        .load_progress(lifter.user_id, 1)
        .await
        .unwrap()
        .expect("progress written through");
    assert_eq!(saved, store.snapshot());
    assert_eq!(store.progress().completed, 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_duplicate_completion_is_suppressed() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), StoreConfig::default());

    assert!(matches!(
        store.complete_one_set(1, 0).unwrap(),
        SetOutcome::Advanced { current_set: 1, .. }
    ));
    assert_eq!(store.complete_one_set(1, 0).unwrap(), SetOutcome::Suppressed);
    assert!(matches!(
        store.complete_one_set(1, 1).unwrap(),
        SetOutcome::Advanced { current_set: 1, .. }
    ));

    tokio::time::advance(Duration::from_millis(150)).await;
    assert!(matches!(
        store.complete_one_set(1, 0).unwrap(),
        SetOutcome::Advanced { current_set: 2, .. }
    ));
    assert_eq!(store.snapshot().exercise(1, 0).unwrap().current_set(), 2);
}

#[tokio::test(start_paused = true)]
async fn non_final_set_starts_rest_timer_which_expires() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        StoreConfig::default(),
    );

    store.complete_one_set(0, 0).unwrap();
    assert_eq!(
        store.timer().snapshot(),
        TimerSnapshot {
            active: true,
            remaining_seconds: 90
        }
    );

    tokio::time::sleep(Duration::from_millis(30_500)).await;
    assert_eq!(store.timer().snapshot().remaining_seconds, 60);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.timer().snapshot(), TimerSnapshot::default());

    store.flush().await;
    assert_eq!(repo.load_timer().await.unwrap(), Some(TimerSnapshot::default()));
}

#[tokio::test(start_paused = true)]
async fn final_set_does_not_start_timer() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    // Incline Dumbbell Press has three sets.
    store.complete_one_set(0, 1).unwrap();
    store.complete_one_set(0, 1).unwrap();
    store.timer().reset();

    store.complete_one_set(0, 1).unwrap();
    assert!(!store.timer().snapshot().active);
}

#[tokio::test(start_paused = true)]
async fn rest_timer_pause_keeps_remaining_time() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    let timer = store.timer();
    let mut updates = timer.subscribe();

    timer.start(90);
    tokio::time::sleep(Duration::from_millis(50_500)).await;
    timer.pause();
    assert_eq!(
        timer.snapshot(),
        TimerSnapshot {
            active: false,
            remaining_seconds: 40
        }
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(timer.snapshot().remaining_seconds, 40);
    assert_eq!(*updates.borrow_and_update(), timer.snapshot());

    timer.start(timer.snapshot().remaining_seconds);
    assert!(timer.snapshot().active);
    tokio::time::sleep(Duration::from_millis(40_500)).await;
    assert_eq!(timer.snapshot(), TimerSnapshot::default());

    timer.start(0);
    assert_eq!(timer.snapshot(), TimerSnapshot::default());
}

#[tokio::test(start_paused = true)]
async fn cached_timer_is_restored() {
    let repo = InMemoryRepository::new();
    repo.save_timer(&TimerSnapshot {
        active: true,
        remaining_seconds: 12,
    })
    .await
    .unwrap();

    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        StoreConfig::default(),
    );
    store.restore_timer().await;
    assert_eq!(store.timer().snapshot().remaining_seconds, 12);

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(
        store.timer().snapshot(),
        TimerSnapshot {
            active: true,
            remaining_seconds: 10
        }
    );
}

#[tokio::test]
async fn toggle_flips_flag_without_touching_sets() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    store.complete_one_set(2, 1).unwrap();

    assert!(store.toggle_exercise_completion(2, 1).unwrap());
    let exercise = store.snapshot().exercise(2, 1).unwrap().clone();
    assert!(exercise.completed());
    assert_eq!(exercise.current_set(), 1);

    assert!(!store.toggle_exercise_completion(2, 1).unwrap());
    assert!(!store.snapshot().exercise(2, 1).unwrap().completed());
}

#[tokio::test]
async fn completing_every_exercise_completes_the_day() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    let exercises = store.snapshot().days()[3].exercises().len();
    for exercise in 0..exercises - 1 {
        store.toggle_exercise_completion(3, exercise).unwrap();
    }
    assert!(!store.snapshot().days()[3].completed());

    store.toggle_exercise_completion(3, exercises - 1).unwrap();
    assert!(store.snapshot().days()[3].completed());
}

#[tokio::test]
async fn out_of_range_indices_are_rejected_without_change() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    let before = store.snapshot();
    let mut events = store.persist_events();

    assert!(matches!(
        store.toggle_exercise_completion(9, 0),
        Err(StoreError::Precondition(_))
    ));
    assert!(matches!(
        store.complete_one_set(0, 42),
        Err(StoreError::Precondition(_))
    ));

    assert_eq!(store.snapshot(), before);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn reset_zeroes_progress_and_clears_cached_timer() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    store
        .switch_identity(Some(identity("lifter@example.com")))
        .await
        .unwrap();
    store.complete_one_set(0, 0).unwrap();
    store.toggle_exercise_completion(1, 1).unwrap();
    assert!(store.timer().snapshot().active);

    store.reset_progress();
    store.flush().await;

    assert_eq!(store.snapshot(), WeekProgress::zeroed(&default_plan()));
    assert_eq!(store.progress().percentage, 0);
    assert_eq!(store.timer().snapshot(), TimerSnapshot::default());
    assert_eq!(repo.load_timer().await.unwrap(), None);
}

#[tokio::test]
async fn invalid_upload_leaves_plan_untouched() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    store.toggle_exercise_completion(0, 0).unwrap();
    let before = store.snapshot();

    let missing_sets = TWO_DAY_PLAN.replacen("\"sets\": 2,", "", 1);
    let err = store.import_plan(&missing_sets).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(PlanDocumentError::MissingField { ref path })
            if path == "days[0].exercises[0].sets"
    ));
    assert!(matches!(
        store.import_plan("{ not json"),
        Err(StoreError::Validation(PlanDocumentError::InvalidJson(_)))
    ));

    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn uploaded_plan_replaces_progress_and_survives_reload() {
    let repo = InMemoryRepository::new();
    let storage = Storage::from_repository(repo.clone());
    let lifter = identity("lifter@example.com");

    let store = WorkoutStore::new(&storage, default_plan(), no_guard());
    store.switch_identity(Some(lifter.clone())).await.unwrap();
    store.toggle_exercise_completion(0, 0).unwrap();

    let plan = store.import_plan(TWO_DAY_PLAN).unwrap();
    assert_eq!(store.snapshot(), WeekProgress::zeroed(&plan));
    assert_eq!(store.export_file_name(), "workout-week-2.json");
    store.complete_one_set(1, 0).unwrap();
    store.flush().await;

    assert_eq!(
        repo.load_active_plan(lifter.user_id).await.unwrap(),
        Some(plan.clone())
    );

    let reloaded = WorkoutStore::new(&storage, default_plan(), no_guard());
    reloaded.switch_identity(Some(lifter)).await.unwrap();
    let progress = reloaded.snapshot();
    assert_eq!(progress.week(), 2);
    assert_eq!(progress.exercise(1, 0).unwrap().current_set(), 1);
    assert_eq!(progress.to_plan(), plan);
}

#[tokio::test]
async fn exported_document_can_be_imported_again() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    store.complete_one_set(0, 0).unwrap();

    let document = store.export_plan().unwrap();
    assert!(!document.contains("currentSet"));

    let other = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    let plan = other.import_plan(&document).unwrap();
    assert_eq!(plan, default_plan());
}

#[tokio::test]
async fn saved_progress_is_reconciled_onto_template() {
    let repo = InMemoryRepository::new();
    let lifter = identity("lifter@example.com");

    let mut saved = WeekProgress::zeroed(&default_plan());
    saved.complete_set(2, 0).unwrap();
    saved.complete_set(2, 0).unwrap();
    saved.toggle_exercise(2, 3).unwrap();
    repo.save_progress(lifter.user_id, &saved).await.unwrap();

    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    store.switch_identity(Some(lifter)).await.unwrap();

    let progress = store.snapshot();
    assert_eq!(progress.exercise(2, 0).unwrap().current_set(), 2);
    assert!(progress.exercise(2, 3).unwrap().completed());
    assert_eq!(progress.summary().completed, 1);
}

#[tokio::test]
async fn switching_identity_swaps_progress() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    let ana = identity("ana@example.com");
    let ben = identity("ben@example.com");

    store.switch_identity(Some(ana.clone())).await.unwrap();
    store.toggle_exercise_completion(0, 2).unwrap();

    store.switch_identity(Some(ben.clone())).await.unwrap();
    assert_eq!(store.owner(), Some(ben));
    assert_eq!(store.progress().completed, 0);

    store.switch_identity(Some(ana.clone())).await.unwrap();
    assert!(store.snapshot().exercise(0, 2).unwrap().completed());

    store.switch_identity(None).await.unwrap();
    assert_eq!(store.owner(), None);
    assert_eq!(store.snapshot(), WeekProgress::zeroed(&default_plan()));

    store.flush().await;
    let stored = repo.load_progress(ana.user_id, 1).await.unwrap().unwrap();
    assert!(stored.exercise(0, 2).unwrap().completed());
}

#[tokio::test(start_paused = true)]
async fn sign_out_clears_rest_timer_and_progress() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    store
        .switch_identity(Some(identity("ana@example.com")))
        .await
        .unwrap();
    store.complete_one_set(0, 0).unwrap();
    assert!(store.timer().snapshot().active);

    store.switch_identity(None).await.unwrap();
    assert_eq!(store.timer().snapshot(), TimerSnapshot::default());
    assert_eq!(store.snapshot(), WeekProgress::zeroed(&default_plan()));

    store.flush().await;
    assert_eq!(repo.load_timer().await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn switching_to_another_user_clears_rest_timer() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    store
        .switch_identity(Some(identity("ana@example.com")))
        .await
        .unwrap();
    store.complete_one_set(0, 0).unwrap();
    assert!(store.timer().snapshot().active);

    store
        .switch_identity(Some(identity("ben@example.com")))
        .await
        .unwrap();
    assert_eq!(store.timer().snapshot(), TimerSnapshot::default());

    store.flush().await;
    assert_eq!(repo.load_timer().await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn first_sign_in_keeps_restored_timer() {
    let repo = InMemoryRepository::new();
    repo.save_timer(&TimerSnapshot {
        active: true,
        remaining_seconds: 30,
    })
    .await
    .unwrap();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    store.restore_timer().await;
    let ana = identity("ana@example.com");

    store.switch_identity(Some(ana.clone())).await.unwrap();
    assert!(store.timer().snapshot().active);

    store.switch_identity(Some(ana)).await.unwrap();
    let snapshot = store.timer().snapshot();
    assert!(snapshot.active);
    assert!(snapshot.remaining_seconds >= 29, "{snapshot:?}");
}

#[tokio::test]
async fn store_follows_identity_provider() {
    let store = WorkoutStore::new(&Storage::in_memory(), default_plan(), no_guard());
    let provider = LocalIdentityProvider::new();
    let watcher = store.watch_identity(provider.subscribe());

    let signed_in = provider.sign_in("lifter@example.com").await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.owner().as_ref() != Some(&signed_in) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("store picked up sign-in");

    provider.sign_out().await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while store.owner().is_some() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("store picked up sign-out");

    drop(provider);
    watcher.await.unwrap();
}

#[tokio::test]
async fn anonymous_changes_are_not_written() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    let mut events = store.persist_events();

    store.toggle_exercise_completion(0, 0).unwrap();
    store.flush().await;

    assert_eq!(drain(&mut events), vec![PersistEvent::Skipped { week: 1 }]);
    assert!(!store.save_now().await.unwrap());
}

#[derive(Clone)]
struct FailingProgress {
    inner: InMemoryRepository,
}

#[async_trait]
impl ProgressRepository for FailingProgress {
    async fn load_progress(
        &self,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeekProgress>, StorageError> {
        self.inner.load_progress(user, week).await
    }

    async fn save_progress(
        &self,
        _user: UserId,
        _progress: &WeekProgress,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

#[tokio::test]
async fn failed_write_keeps_in_memory_progress() {
    let repo = InMemoryRepository::new();
    let storage = Storage {
        progress: Arc::new(FailingProgress {
            inner: repo.clone(),
        }),
        plans: Arc::new(repo.clone()),
        weights: Arc::new(repo.clone()),
        timer: Arc::new(repo.clone()),
    };
    let store = WorkoutStore::new(&storage, default_plan(), no_guard());
    let lifter = identity("lifter@example.com");
    store.switch_identity(Some(lifter.clone())).await.unwrap();
    store.flush().await;

    let mut events = store.persist_events();
    store.complete_one_set(0, 0).unwrap();
    store.flush().await;

    let events = drain(&mut events);
    assert!(matches!(
        events.as_slice(),
        [PersistEvent::Failed { owner, week: 1, .. }] if *owner == lifter.user_id
    ));
    assert_eq!(store.snapshot().exercise(0, 0).unwrap().current_set(), 1);
    assert!(matches!(
        store.save_now().await,
        Err(StoreError::Persistence(StorageError::Connection(_)))
    ));
}

#[tokio::test]
async fn signed_in_save_now_writes_current_state() {
    let repo = InMemoryRepository::new();
    let store = WorkoutStore::new(
        &Storage::from_repository(repo.clone()),
        default_plan(),
        no_guard(),
    );
    let lifter = identity("lifter@example.com");
    store.switch_identity(Some(lifter.clone())).await.unwrap();
    store.toggle_exercise_completion(3, 0).unwrap();

    assert!(store.save_now().await.unwrap());
    let stored = repo.load_progress(lifter.user_id, 1).await.unwrap().unwrap();
    assert_eq!(stored, store.snapshot());
}
