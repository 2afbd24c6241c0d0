use std::path::Path;

use chrono::NaiveDate;

use shared_config::AppConfig;
use shared_database::{InMemoryTableStore, Table};

pub const PATIENTS_TABLE: &str = "patients";
pub const SCHEDULE_TABLE: &str = "doctor_schedules";
pub const REPORT_TABLE: &str = "admin_report";
pub const LEDGER_TABLE: &str = "reminders_sent";

pub const PATIENT_COLUMNS: [&str; 5] = ["PatientID", "FirstName", "LastName", "DOB", "IsReturning"];
pub const SCHEDULE_COLUMNS: [&str; 6] = [
    "DoctorName",
    "Date",
    "StartTime",
    "Duration (min)",
    "Status",
    "BookedByPatientID",
];

/// Config pointing at `data_dir` with mail fully configured against `relay_url`.
pub fn test_app_config(data_dir: &Path, relay_url: &str) -> AppConfig {
    AppConfig {
        data_dir: data_dir.to_path_buf(),
        sender_email: "clinic@example.com".to_string(),
        sender_password: "test-app-password".to_string(),
        receiver_email: "patient@example.com".to_string(),
        mail_relay_url: relay_url.to_string(),
        intake_form_path: data_dir.join("New Patient Intake Form.pdf"),
        ..AppConfig::default()
    }
}

pub struct TestPatient {
    pub id: i64,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub dob: &'static str,
    pub returning: bool,
}

impl TestPatient {
    pub fn peter_jones() -> Self {
        Self {
            id: 101,
            first_name: "Peter",
            last_name: "Jones",
            dob: "2001-02-15",
            returning: true,
        }
    }

    pub fn ana_lopez() -> Self {
        Self {
            id: 102,
            first_name: "Ana",
            last_name: "Lopez",
            dob: "1988-07-30",
            returning: false,
        }
    }
}

pub fn patients_table(patients: &[TestPatient]) -> Table {
    let mut table = Table::new(PATIENT_COLUMNS);
    for patient in patients {
        table.push_row(vec![
            patient.id.to_string(),
            patient.first_name.to_string(),
            patient.last_name.to_string(),
            patient.dob.to_string(),
            if patient.returning { "True" } else { "False" }.to_string(),
        ]);
    }
    table
}

/// Builds schedule tables row by row, in the order the rows should appear.
pub struct ScheduleTableBuilder {
    table: Table,
}

impl Default for ScheduleTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleTableBuilder {
    pub fn new() -> Self {
        Self { table: Table::new(SCHEDULE_COLUMNS) }
    }

    pub fn available(self, date: &str, start_time: &str, duration: u32) -> Self {
        self.raw(date, start_time, &duration.to_string(), "Available", "")
    }

    pub fn booked(self, date: &str, start_time: &str, duration: u32, patient_id: i64) -> Self {
        self.raw(date, start_time, &duration.to_string(), "Booked", &patient_id.to_string())
    }

    pub fn raw(mut self, date: &str, start_time: &str, duration: &str, status: &str, booked_by: &str) -> Self {
        self.table.push_row(vec![
            "Dr. Rivera".to_string(),
            date.to_string(),
            start_time.to_string(),
            duration.to_string(),
            status.to_string(),
            booked_by.to_string(),
        ]);
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}

/// Two days of slots for a single doctor, all available.
pub fn default_schedule() -> Table {
    ScheduleTableBuilder::new()
        .available("2025-09-01", "09:00", 30)
        .available("2025-09-01", "09:30", 30)
        .available("2025-09-01", "10:00", 60)
        .available("2025-09-02", "09:00", 60)
        .available("2025-09-02", "11:00", 30)
        .build()
}

pub fn seeded_store(schedule: Table) -> InMemoryTableStore {
    InMemoryTableStore::new()
        .with_table(PATIENTS_TABLE, patients_table(&[TestPatient::peter_jones(), TestPatient::ana_lopez()]))
        .with_table(SCHEDULE_TABLE, schedule)
}

pub fn days_from(today: NaiveDate, days: i64) -> String {
    (today + chrono::Duration::days(days)).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_database::TableStore;

    #[test]
    fn builder_keeps_row_order() {
        let table = ScheduleTableBuilder::new()
            .available("2025-09-02", "09:00", 60)
            .booked("2025-09-01", "10:00", 30, 101)
            .build();

        let date = table.column("Date").unwrap();
        assert_eq!(table.cell(0, date), "2025-09-02");
        assert_eq!(table.cell(1, date), "2025-09-01");
    }

    #[test]
    fn days_from_formats_iso_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert_eq!(days_from(today, 3), "2025-09-01");
    }

    #[tokio::test]
    async fn seeded_store_has_both_tables() {
        let store = seeded_store(default_schedule());
        assert_eq!(store.read_all(PATIENTS_TABLE).await.unwrap().len(), 2);
        assert_eq!(store.read_all(SCHEDULE_TABLE).await.unwrap().len(), 5);
    }
}
