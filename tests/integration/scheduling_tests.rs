//! Scheduling and change tracking through the public service API

use std::sync::Arc;

use chrono::{Duration, NaiveTime};

use appointment_scheduler::{
    error::AppError,
    models::{ChangeType, Period, PeriodKind, RecordEntity, RecordStatus, TimePeriod},
    repository::{state_file::JsonStateStore, ActualRecordsLoader, CustomerCreator, Repository},
    services::tracking::TrackingService,
};

use crate::{at, date, friday_evening, monday, Harness};

fn period(sh: u32, sm: u32, eh: u32, em: u32) -> TimePeriod {
    Period::new(
        NaiveTime::from_hms_opt(sh, sm, 0).unwrap(),
        NaiveTime::from_hms_opt(eh, em, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_monday_free_slots_and_schedule() {
    let harness = Harness::new();
    let scheduling = &harness.services.scheduling;

    let free = scheduling
        .free_time_slots(friday_evening(), monday())
        .await
        .unwrap();
    assert_eq!(free, vec![period(9, 30, 12, 30), period(13, 30, 17, 0)]);

    let schedule = scheduling.schedule(friday_evening(), monday()).await.unwrap();
    assert_eq!(schedule.date, monday());
    assert_eq!(schedule.prev_date, None);
    assert_eq!(schedule.next_date, Some(date(2024, 1, 16)));

    let labelled: Vec<(TimePeriod, PeriodKind, Option<&str>)> = schedule
        .periods
        .iter()
        .map(|p| (p.period, p.kind, p.title.as_deref()))
        .collect();
    assert_eq!(
        labelled,
        vec![
            (period(9, 30, 12, 30), PeriodKind::Free, None),
            (period(12, 30, 13, 30), PeriodKind::Busy, Some("Lunch")),
            (period(13, 30, 17, 0), PeriodKind::Free, None),
        ]
    );
}

#[tokio::test]
async fn test_pre_holiday_closes_an_hour_early() {
    let harness = Harness::new();

    let free = harness
        .services
        .scheduling
        .free_time_slots(friday_evening(), date(2024, 1, 16))
        .await
        .unwrap();
    assert_eq!(free, vec![period(9, 30, 12, 30), period(13, 30, 16, 0)]);
}

#[tokio::test]
async fn test_schedule_skips_holiday() {
    let harness = Harness::new();

    let schedule = harness
        .services
        .scheduling
        .schedule(friday_evening(), date(2024, 1, 22))
        .await
        .unwrap();

    assert_eq!(schedule.date, date(2024, 1, 23));
    assert_eq!(schedule.prev_date, Some(date(2024, 1, 16)));
    assert_eq!(schedule.next_date, Some(date(2024, 1, 29)));
}

#[tokio::test]
async fn test_today_starts_at_now() {
    let harness = Harness::new();

    let free = harness
        .services
        .scheduling
        .free_time_slots(at(monday(), 14, 10), monday())
        .await
        .unwrap();
    assert_eq!(free, vec![period(14, 10, 17, 0)]);

    let sampled = harness
        .services
        .scheduling
        .sampled_free_time_slots(at(monday(), 14, 10), monday(), 2)
        .await
        .unwrap();
    assert_eq!(sampled.slots.first(), Some(&period(14, 30, 15, 0)));
}

#[tokio::test]
async fn test_booking_removes_slot() {
    let harness = Harness::new();
    let scheduling = &harness.services.scheduling;
    let customer = harness
        .store
        .create_customer("tg:100".into(), "Alice".into())
        .await
        .unwrap();

    let record = scheduling
        .make_appointment(friday_evening(), at(monday(), 10, 0), customer.id, 1)
        .await
        .unwrap();
    assert_eq!(record.period.end, at(monday(), 11, 0));

    let free = scheduling
        .free_time_slots(friday_evening(), monday())
        .await
        .unwrap();
    assert_eq!(
        free,
        vec![period(9, 30, 10, 0), period(11, 0, 12, 30), period(13, 30, 17, 0)]
    );

    let schedule = scheduling.schedule(friday_evening(), monday()).await.unwrap();
    assert!(schedule
        .periods
        .iter()
        .any(|p| p.kind == PeriodKind::Busy && p.title.as_deref() == Some("Consultation")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_bookings_of_the_same_slot() {
    let harness = Harness::new();
    let first = harness
        .store
        .create_customer("tg:1".into(), "Alice".into())
        .await
        .unwrap();
    let second = harness
        .store
        .create_customer("tg:2".into(), "Bob".into())
        .await
        .unwrap();

    let start = at(monday(), 11, 0);
    let handles: Vec<_> = [first.id, second.id]
        .into_iter()
        .map(|customer_id| {
            let services = harness.services.clone();
            tokio::spawn(async move {
                services
                    .scheduling
                    .make_appointment(friday_evening(), start, customer_id, 1)
                    .await
            })
        })
        .collect();

    let mut booked = Vec::new();
    let mut rejected = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => booked.push(record),
            Err(e) => rejected.push(e),
        }
    }

    assert_eq!(booked.len(), 1);
    assert_eq!(rejected.len(), 1);
    assert!(matches!(
        rejected[0],
        AppError::PeriodIsLocked | AppError::DateTimePeriodIsOccupied
    ));
    assert_eq!(harness.store.records().await.len(), 1);
    assert_eq!(harness.services.scheduling.locker().locked_count(), 0);
}

#[tokio::test]
async fn test_invalid_booking_requests() {
    let harness = Harness::new();
    let customer = harness
        .store
        .create_customer("tg:7".into(), "Carol".into())
        .await
        .unwrap();
    let scheduling = &harness.services.scheduling;

    // Overlaps lunch
    let err = scheduling
        .make_appointment(friday_evening(), at(monday(), 12, 0), customer.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DateTimePeriodIsOccupied));

    // Closed on Sunday
    let err = scheduling
        .make_appointment(friday_evening(), at(date(2024, 1, 14), 10, 0), customer.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DateTimePeriodIsOccupied));

    // Already in the past
    let err = scheduling
        .make_appointment(at(monday(), 12, 0), at(monday(), 10, 0), customer.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DateTimePeriodIsOccupied));

    let err = scheduling
        .make_appointment(friday_evening(), at(monday(), 10, 0), customer.id, 42)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), AppError::NotFound(_)));

    assert!(harness.store.records().await.is_empty());
}

#[tokio::test]
async fn test_external_changes_are_detected() {
    let harness = Harness::new();
    let scheduling = &harness.services.scheduling;
    let tracking = &harness.services.tracking;
    let customer = harness
        .store
        .create_customer("tg:5".into(), "Dave".into())
        .await
        .unwrap();

    let record = scheduling
        .make_appointment(friday_evening(), at(monday(), 15, 0), customer.id, 2)
        .await
        .unwrap();
    tracking.add_appointment(record.clone()).await.unwrap();

    // Local booking is already known
    let actual = harness.store.load_actual_records().await.unwrap();
    assert!(tracking.detect_changes(actual).await.unwrap().is_empty());

    // Staff marks it done and adds a walk-in elsewhere
    harness
        .store
        .set_record_status(record.id, RecordStatus::Done)
        .await
        .unwrap();
    let start = at(monday(), 16, 0);
    let walk_in = harness
        .store
        .insert_record(RecordEntity::new_placeholder(
            "Walk-in".into(),
            Period::new(start, start + Duration::minutes(30)).unwrap(),
            customer.id,
            2,
            friday_evening(),
        ))
        .await;

    let actual = harness.store.load_actual_records().await.unwrap();
    let events = tracking.detect_changes(actual).await.unwrap();
    let changes: Vec<_> = events
        .iter()
        .map(|e| (e.change_type, e.record.id))
        .collect();
    assert_eq!(
        changes,
        vec![
            (ChangeType::StatusChanged, record.id),
            (ChangeType::Created, walk_in.id),
        ]
    );

    // Archived records leave the actual set
    harness.store.archive_record(record.id).await.unwrap();
    let actual = harness.store.load_actual_records().await.unwrap();
    let events = tracking.detect_changes(actual).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change_type, ChangeType::Removed);
    assert_eq!(events[0].record.id, record.id);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let harness = Harness::new();
    let customer = harness
        .store
        .create_customer("tg:9".into(), "Erin".into())
        .await
        .unwrap();
    harness
        .services
        .scheduling
        .make_appointment(friday_evening(), at(monday(), 9, 30), customer.id, 2)
        .await
        .unwrap();

    let tracking_for = |repository: Repository| {
        TrackingService::new(
            repository
                .with_state_store(Arc::new(JsonStateStore::new(&path)))
                .state,
        )
    };

    let actual = harness.store.load_actual_records().await.unwrap();
    let events = tracking_for(harness.repository.clone())
        .detect_changes(actual)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change_type, ChangeType::Created);

    // A fresh tracker over the same file sees nothing new
    let actual = harness.store.load_actual_records().await.unwrap();
    let events = tracking_for(harness.repository.clone())
        .detect_changes(actual)
        .await
        .unwrap();
    assert!(events.is_empty());
    assert!(path.exists());
}
