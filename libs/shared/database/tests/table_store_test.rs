use assert_matches::assert_matches;
use tempfile::TempDir;

use shared_database::{CsvTableStore, DatabaseError, InMemoryTableStore, Table, TableStore};
use shared_models::AppError;

fn schedule_table() -> Table {
    let mut table = Table::new(["Date", "StartTime", "Duration (min)", "Status", "BookedByPatientID"]);
    table.push_row(vec!["2025-09-01".into(), "09:00".into(), "30".into(), "Available".into(), "".into()]);
    table.push_row(vec!["2025-09-01".into(), "10:00".into(), "60".into(), "Booked".into(), "101".into()]);
    table
}

#[tokio::test]
async fn test_csv_store_round_trips_table() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = CsvTableStore::new(dir.path());

    store.overwrite_all("doctor_schedules", &schedule_table()).await.expect("Failed to write table");
    let read_back = store.read_all("doctor_schedules").await.expect("Failed to read table");

    assert_eq!(read_back, schedule_table());
    assert!(store.table_path("doctor_schedules").exists());
}

#[tokio::test]
async fn test_csv_store_reports_missing_table() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = CsvTableStore::new(dir.path());

    let result = store.read_all("admin_report").await;
    assert_matches!(result, Err(DatabaseError::TableNotFound(name)) if name == "admin_report");
}

#[tokio::test]
async fn test_csv_store_reads_ragged_rows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("patients.csv"),
        "PatientID,FirstName,LastName,DOB,IsReturning\n101,Peter,Jones,2001-02-15\n",
    )
    .expect("Failed to seed csv");

    let store = CsvTableStore::new(dir.path());
    let table = store.read_all("patients").await.expect("Failed to read table");

    assert_eq!(table.len(), 1);
    let returning = table.column("IsReturning").unwrap();
    assert_eq!(table.cell(0, returning), "");
}

#[tokio::test]
async fn test_csv_store_creates_data_directory() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let nested = dir.path().join("nested").join("data");
    let store = CsvTableStore::new(&nested);

    store.overwrite_all("admin_report", &Table::new(["PatientID"])).await.expect("Failed to write table");
    assert!(nested.join("admin_report.csv").exists());
}

#[tokio::test]
async fn test_overwrite_replaces_previous_contents() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = CsvTableStore::new(dir.path());

    store.overwrite_all("doctor_schedules", &schedule_table()).await.unwrap();
    let mut smaller = Table::new(["Date"]);
    smaller.push_row(vec!["2025-10-01".into()]);
    store.overwrite_all("doctor_schedules", &smaller).await.unwrap();

    let read_back = store.read_all("doctor_schedules").await.unwrap();
    assert_eq!(read_back, smaller);
}

#[tokio::test]
async fn test_in_memory_store_behaves_like_csv_store() {
    let store = InMemoryTableStore::new().with_table("doctor_schedules", schedule_table());

    assert!(store.contains("doctor_schedules").await);
    assert_eq!(store.read_all("doctor_schedules").await.unwrap(), schedule_table());
    assert_matches!(store.read_all("patients").await, Err(DatabaseError::TableNotFound(_)));

    store.overwrite_all("patients", &Table::new(["PatientID"])).await.unwrap();
    assert!(store.contains("patients").await);
}

#[test]
fn test_database_errors_become_storage_errors() {
    let err: AppError = DatabaseError::TableNotFound("patients".into()).into();
    assert_matches!(err, AppError::Storage(msg) if msg.contains("patients"));
}
