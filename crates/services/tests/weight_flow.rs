use std::sync::Arc;

use chrono::NaiveDate;
use services::{
    Clock, DEFAULT_RECENT_LIMIT, IdentityProvider, LocalIdentityProvider, WeightService,
    WeightServiceError,
};
use storage::repository::{InMemoryRepository, StorageError};
use workout_core::model::{WeightRecordDraft, WeightRecordError};
use workout_core::time::fixed_now;

fn draft(name: &str, weight: f64, day: u32) -> WeightRecordDraft {
    WeightRecordDraft {
        exercise_name: name.to_owned(),
        weight,
        reps: 5,
        sets: 3,
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        notes: None,
    }
}

fn service() -> (WeightService, Arc<LocalIdentityProvider>) {
    let identity = Arc::new(LocalIdentityProvider::new());
    let provider: Arc<dyn IdentityProvider> = identity.clone();
    let service = WeightService::new(
        Clock::fixed(fixed_now()),
        Arc::new(InMemoryRepository::new()),
        provider,
    );
    (service, identity)
}

#[tokio::test]
async fn weights_require_sign_in() {
    let (service, _identity) = service();
    assert!(matches!(
        service.add_record(draft("Deadlift", 100.0, 1)).await,
        Err(WeightServiceError::NotAuthenticated)
    ));
    assert!(matches!(
        service.progress().await,
        Err(WeightServiceError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn progress_tracks_latest_and_best_weight() {
    let (service, identity) = service();
    identity.sign_in("lifter@example.com").await.unwrap();

    service.add_record(draft("Deadlift", 150.0, 1)).await.unwrap();
    service.add_record(draft("Deadlift", 140.0, 15)).await.unwrap();
    service.add_record(draft("Deadlift", 145.0, 8)).await.unwrap();
    service.add_record(draft("Bench Press", 80.0, 2)).await.unwrap();

    let deadlift = service
        .exercise_progress("Deadlift")
        .await
        .unwrap()
        .expect("deadlift tracked");
    assert!((deadlift.current_weight - 140.0).abs() < f64::EPSILON);
    assert!((deadlift.max_weight - 150.0).abs() < f64::EPSILON);
    assert_eq!(deadlift.total_workouts, 3);
    assert_eq!(
        deadlift.last_updated,
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    );
    assert_eq!(deadlift.progress_percentage, 93);

    let names: Vec<String> = service
        .progress()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.exercise_name)
        .collect();
    assert_eq!(names, ["Bench Press", "Deadlift"]);

    let recent = service
        .recent_records("Deadlift", DEFAULT_RECENT_LIMIT)
        .await
        .unwrap();
    let days: Vec<u32> = recent
        .iter()
        .map(|r| chrono::Datelike::day(&r.entry.date()))
        .collect();
    assert_eq!(days, [15, 8, 1]);
    assert!(service.exercise_progress("Squat").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_record_is_rejected() {
    let (service, identity) = service();
    identity.sign_in("lifter@example.com").await.unwrap();

    let err = service
        .add_record(draft("   ", 100.0, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WeightServiceError::Record(WeightRecordError::EmptyExerciseName)
    ));
    assert!(matches!(
        service.add_record(draft("Squat", 0.0, 1)).await,
        Err(WeightServiceError::Record(WeightRecordError::InvalidWeight(_)))
    ));
    assert!(service.records().await.unwrap().is_empty());
}

#[tokio::test]
async fn records_are_private_to_their_owner() {
    let (service, identity) = service();
    identity.sign_in("ana@example.com").await.unwrap();
    let record = service.add_record(draft("Squat", 100.0, 3)).await.unwrap();

    identity.sign_in("ben@example.com").await.unwrap();
    assert!(service.records().await.unwrap().is_empty());
    assert!(matches!(
        service.delete_record(record.id).await,
        Err(WeightServiceError::Storage(StorageError::NotFound))
    ));
    assert!(matches!(
        service
            .update_record(record.id, draft("Squat", 200.0, 3))
            .await,
        Err(WeightServiceError::Storage(StorageError::NotFound))
    ));

    identity.sign_in("ana@example.com").await.unwrap();
    service
        .update_record(record.id, draft("Squat", 105.0, 3))
        .await
        .unwrap();
    let records = service.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!((records[0].entry.weight() - 105.0).abs() < f64::EPSILON);
    assert_eq!(records[0].created_at, fixed_now());

    service.delete_record(record.id).await.unwrap();
    assert!(service.records().await.unwrap().is_empty());
}
