use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use tempfile::TempDir;

use patient_cell::PatientId;
use schedule_cell::{AppointmentDuration, ScheduleStore, Slot, SlotStatus};
use shared_database::{CsvTableStore, InMemoryTableStore, Table, TableStore};
use shared_models::AppError;
use shared_utils::test_utils::{default_schedule, ScheduleTableBuilder, SCHEDULE_TABLE};

const THIRTY: AppointmentDuration = AppointmentDuration::ThirtyMinutes;
const SIXTY: AppointmentDuration = AppointmentDuration::SixtyMinutes;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn store_with(schedule: Table) -> (Arc<InMemoryTableStore>, ScheduleStore) {
    let tables = Arc::new(InMemoryTableStore::new().with_table(SCHEDULE_TABLE, schedule));
    let store = ScheduleStore::new(tables.clone(), SCHEDULE_TABLE);
    (tables, store)
}

fn assert_booking_invariant(slots: &[Slot]) {
    for slot in slots {
        match slot.status {
            SlotStatus::Available => assert_eq!(slot.status.booked_by(), None),
            SlotStatus::Booked { .. } => assert!(slot.status.booked_by().is_some()),
        }
    }
}

#[tokio::test]
async fn test_find_available_filters_by_duration_in_table_order() {
    let (_, store) = store_with(default_schedule());

    let thirty = store.find_available(AppointmentDuration::ThirtyMinutes).await.unwrap();
    let labels: Vec<String> = thirty.iter().map(Slot::label).collect();
    assert_eq!(labels, ["2025-09-01 at 09:00", "2025-09-01 at 09:30", "2025-09-02 at 11:00"]);

    let sixty = store.find_available(AppointmentDuration::SixtyMinutes).await.unwrap();
    assert_eq!(sixty.len(), 2);
    assert!(sixty.iter().all(|slot| slot.duration == AppointmentDuration::SixtyMinutes));
}

#[tokio::test]
async fn test_find_available_keeps_unsorted_table_order() {
    let schedule = ScheduleTableBuilder::new()
        .available("2025-09-03", "09:00", 60)
        .available("2025-09-01", "09:00", 60)
        .build();
    let (_, store) = store_with(schedule);

    let slots = store.find_available(AppointmentDuration::SixtyMinutes).await.unwrap();
    assert_eq!(slots[0].date, date(2025, 9, 3));
    assert_eq!(slots[1].date, date(2025, 9, 1));
}

#[tokio::test]
async fn test_find_available_is_idempotent_without_booking() {
    let (_, store) = store_with(default_schedule());

    let first = store.find_available(AppointmentDuration::ThirtyMinutes).await.unwrap();
    let second = store.find_available(AppointmentDuration::ThirtyMinutes).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_corrupt_rows_are_dropped() {
    let schedule = ScheduleTableBuilder::new()
        .raw("not-a-date", "09:00", "30", "Available", "")
        .raw("2025-09-01", "late morning", "30", "Available", "")
        .raw("2025-09-01", "10:00", "45", "Available", "")
        .raw("2025-09-01", "11:00", "30", "Blocked", "")
        .raw("2025-09-01", "12:00", "30", "Booked", "")
        .available("2025-09-01", "13:00", 30)
        .build();
    let (_, store) = store_with(schedule);

    let slots = store.slots().await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time, time(13, 0));
}

#[tokio::test]
async fn test_book_marks_slot_and_records_patient() {
    let (tables, store) = store_with(default_schedule());

    let booked = store.book(date(2025, 9, 1), time(9, 30), THIRTY, PatientId(101)).await.unwrap();
    assert_eq!(booked.status, SlotStatus::Booked { patient_id: PatientId(101) });

    let table = tables.read_all(SCHEDULE_TABLE).await.unwrap();
    let status = table.column("Status").unwrap();
    let booked_by = table.column("BookedByPatientID").unwrap();
    assert_eq!(table.cell(1, status), "Booked");
    assert_eq!(table.cell(1, booked_by), "101");
    assert_eq!(table.cell(0, status), "Available");

    let remaining = store.find_available(AppointmentDuration::ThirtyMinutes).await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|slot| slot.start_time != time(9, 30) || slot.date != date(2025, 9, 1)));
}

#[tokio::test]
async fn test_booking_invariant_holds_before_and_after_book() {
    let (_, store) = store_with(default_schedule());
    assert_booking_invariant(&store.slots().await.unwrap());

    store.book(date(2025, 9, 2), time(9, 0), SIXTY, PatientId::UNREGISTERED).await.unwrap();
    let slots = store.slots().await.unwrap();
    assert_booking_invariant(&slots);

    let booked: Vec<&Slot> = slots.iter().filter(|slot| !slot.is_available()).collect();
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].status.booked_by(), Some(PatientId::UNREGISTERED));
}

#[tokio::test]
async fn test_book_missing_slot_is_not_found() {
    let (tables, store) = store_with(default_schedule());

    let result = store.book(date(2025, 9, 5), time(9, 0), THIRTY, PatientId(101)).await;
    assert_matches!(result, Err(AppError::NotFound(_)));

    assert_eq!(tables.read_all(SCHEDULE_TABLE).await.unwrap(), default_schedule());
}

#[tokio::test]
async fn test_book_already_booked_slot_is_not_found() {
    let (_, store) = store_with(default_schedule());

    store.book(date(2025, 9, 1), time(9, 0), THIRTY, PatientId(101)).await.unwrap();
    let second = store.book(date(2025, 9, 1), time(9, 0), THIRTY, PatientId(102)).await;

    assert_matches!(second, Err(ref e) if e.is_retryable());
}

#[tokio::test]
async fn test_book_adds_missing_patient_column() {
    let mut schedule = Table::new(["Date", "StartTime", "Duration (min)", "Status"]);
    schedule.push_row(vec!["2025-09-01".into(), "09:00".into(), "30".into(), "Available".into()]);
    let (tables, store) = store_with(schedule);

    store.book(date(2025, 9, 1), time(9, 0), THIRTY, PatientId(7)).await.unwrap();

    let table = tables.read_all(SCHEDULE_TABLE).await.unwrap();
    let booked_by = table.column("BookedByPatientID").expect("column should be added");
    assert_eq!(table.cell(0, booked_by), "7");
}

#[tokio::test]
async fn test_missing_status_column_is_storage_error() {
    let schedule = Table::new(["Date", "StartTime", "Duration (min)"]);
    let (_, store) = store_with(schedule);

    let result = store.find_available(AppointmentDuration::ThirtyMinutes).await;
    assert_matches!(result, Err(AppError::Storage(_)));
}

#[tokio::test]
async fn test_concurrent_bookings_of_one_slot_have_single_winner() {
    let (tables, store) = store_with(default_schedule());
    let store = Arc::new(store);

    let attempts = (0..8).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.book(date(2025, 9, 1), time(10, 0), SIXTY, PatientId(200 + i)).await })
    });
    let results = futures::future::join_all(attempts).await;

    let outcomes: Vec<Result<Slot, AppError>> = results.into_iter().map(|joined| joined.unwrap()).collect();
    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .all(|err| matches!(err, AppError::NotFound(_))));

    let table = tables.read_all(SCHEDULE_TABLE).await.unwrap();
    let status = table.column("Status").unwrap();
    let booked_rows = (0..table.len()).filter(|&row| table.cell(row, status) == "Booked").count();
    assert_eq!(booked_rows, 1);
}

#[tokio::test]
async fn test_list_booked_respects_cutoff() {
    let schedule = ScheduleTableBuilder::new()
        .booked("2025-08-30", "09:00", 30, 101)
        .booked("2025-09-01", "09:00", 30, 102)
        .available("2025-09-02", "09:00", 30)
        .booked("2025-09-08", "10:00", 60, 103)
        .build();
    let (_, store) = store_with(schedule);

    let booked = store.list_booked(date(2025, 9, 1)).await.unwrap();
    let patients: Vec<Option<PatientId>> = booked.iter().map(|entry| entry.patient_id).collect();
    assert_eq!(patients, [Some(PatientId(102)), Some(PatientId(103))]);
}

#[tokio::test]
async fn test_book_matches_length_when_rows_share_a_start_time() {
    let schedule = ScheduleTableBuilder::new()
        .available("2025-09-01", "09:00", 30)
        .available("2025-09-01", "09:00", 60)
        .build();
    let (tables, store) = store_with(schedule);

    let booked = store
        .book(date(2025, 9, 1), time(9, 0), SIXTY, PatientId(102))
        .await
        .unwrap();
    assert_eq!(booked.duration, AppointmentDuration::SixtyMinutes);

    let table = tables.read_all(SCHEDULE_TABLE).await.unwrap();
    let status = table.column("Status").unwrap();
    assert_eq!(table.cell(0, status), "Available");
    assert_eq!(table.cell(1, status), "Booked");
    assert!(store.find_available(AppointmentDuration::SixtyMinutes).await.unwrap().is_empty());
    assert_eq!(store.find_available(AppointmentDuration::ThirtyMinutes).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_book_with_wrong_length_is_not_found() {
    let (tables, store) = store_with(default_schedule());

    let result = store
        .book(date(2025, 9, 1), time(9, 0), SIXTY, PatientId(101))
        .await;
    assert_matches!(result, Err(AppError::NotFound(_)));
    assert_eq!(tables.read_all(SCHEDULE_TABLE).await.unwrap(), default_schedule());
}

#[tokio::test]
async fn test_list_booked_needs_only_a_readable_date() {
    let schedule = ScheduleTableBuilder::new()
        .raw("2025-09-08", "10:00", "45", "Booked", "101")
        .raw("2025-09-08", "ten o'clock", "30", "Booked", "102")
        .raw("2025-09-09", "09:00", "30", "Booked", "")
        .raw("someday", "09:00", "30", "Booked", "103")
        .raw("2025-09-08", "11:00", "45", "Available", "")
        .build();
    let (_, store) = store_with(schedule);

    let booked = store.list_booked(date(2025, 9, 1)).await.unwrap();

    assert_eq!(booked.len(), 3);
    assert_eq!(booked[0].duration_minutes, Some(45));
    assert_eq!(booked[0].start_time, Some(time(10, 0)));
    assert_eq!(booked[1].start_time, None);
    assert_eq!(booked[1].label(), "2025-09-08 at ten o'clock");
    assert_eq!(booked[2].patient_id, None);

    // the stricter slot view still skips all of them
    assert!(store.slots().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_persists_to_csv_for_new_store_instances() {
    let dir = TempDir::new().unwrap();
    let csv: Arc<dyn TableStore> = Arc::new(CsvTableStore::new(dir.path()));
    csv.overwrite_all(SCHEDULE_TABLE, &default_schedule()).await.unwrap();

    let writer = ScheduleStore::new(Arc::clone(&csv), SCHEDULE_TABLE);
    writer.book(date(2025, 9, 1), time(10, 0), SIXTY, PatientId(101)).await.unwrap();

    let reader = ScheduleStore::new(Arc::new(CsvTableStore::new(dir.path())), SCHEDULE_TABLE);
    let booked = reader.list_booked(date(2025, 9, 1)).await.unwrap();
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].label(), "2025-09-01 at 10:00");

    let all_slots = reader.slots().await.unwrap();
    assert_eq!(all_slots.len(), 5);
}
