use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use patient_cell::PatientId;
use shared_config::AppConfig;
use shared_database::{cells, DatabaseError, Table, TableStore};
use shared_models::AppError;

use crate::models::AdminReportRow;

pub const REPORT_COLUMNS: [&str; 4] = ["PatientID", "PatientName", "AppointmentTime", "Status"];

/// Append-only admin report of confirmed bookings.
pub struct ReportSink {
    store: Arc<dyn TableStore>,
    table: String,
    write_lock: Mutex<()>,
}

impl ReportSink {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(store: Arc<dyn TableStore>, config: &AppConfig) -> Self {
        Self::new(store, config.report_table.clone())
    }

    pub async fn append(&self, row: &AdminReportRow) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut table = match self.store.read_all(&self.table).await {
            Ok(table) => table,
            Err(DatabaseError::TableNotFound(_)) => {
                info!("Creating admin report table {}", self.table);
                Table::new(REPORT_COLUMNS)
            }
            Err(e) => return Err(e.into()),
        };

        table.push_record(&[
            ("PatientID", row.patient_id.to_string()),
            ("PatientName", row.patient_name.clone()),
            ("AppointmentTime", row.appointment_time.clone()),
            ("Status", row.status.clone()),
        ]);
        self.store.overwrite_all(&self.table, &table).await?;

        info!("Admin report updated for {} ({} rows)", row.patient_name, table.len());
        Ok(())
    }

    /// All report rows in append order; an absent report reads as empty.
    pub async fn rows(&self) -> Result<Vec<AdminReportRow>, AppError> {
        let table = match self.store.read_all(&self.table).await {
            Ok(table) => table,
            Err(DatabaseError::TableNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let patient_id = table.require_column(&self.table, "PatientID")?;
        let patient_name = table.require_column(&self.table, "PatientName")?;
        let appointment_time = table.require_column(&self.table, "AppointmentTime")?;
        let status = table.require_column(&self.table, "Status")?;

        let mut rows = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let Some(id) = cells::parse_integer(table.cell(row, patient_id)) else {
                warn!("Skipping report row {} with unreadable PatientID", row + 1);
                continue;
            };
            rows.push(AdminReportRow {
                patient_id: PatientId(id),
                patient_name: table.cell(row, patient_name).to_string(),
                appointment_time: table.cell(row, appointment_time).to_string(),
                status: table.cell(row, status).to_string(),
            });
        }

        debug!("Read {} admin report rows", rows.len());
        Ok(rows)
    }
}
