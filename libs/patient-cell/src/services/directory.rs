use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::{cells, Table, TableStore};
use shared_models::AppError;

use crate::models::{normalize_date_of_birth, PatientId, PatientLookup, PatientRecord};

/// Read-only view over the patient table.
pub struct PatientDirectory {
    store: Arc<dyn TableStore>,
    table: String,
}

struct PatientColumns {
    patient_id: usize,
    first_name: usize,
    last_name: usize,
    date_of_birth: usize,
    is_returning: usize,
}

impl PatientDirectory {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn from_config(store: Arc<dyn TableStore>, config: &AppConfig) -> Self {
        Self::new(store, config.patients_table.clone())
    }

    /// Looks a patient up by `"First Last"` and a typed date of birth.
    ///
    /// A malformed date is an `InputFormat` error; a well-formed date that
    /// matches nobody is `PatientLookup::NotFound`.
    pub async fn lookup(&self, full_name: &str, dob: &str) -> Result<PatientLookup, AppError> {
        let date_of_birth = normalize_date_of_birth(dob)?;
        let full_name = full_name.trim();
        debug!("Looking up patient {} born {}", full_name, date_of_birth);

        let table = self.store.read_all(&self.table).await?;
        let columns = self.columns(&table)?;

        for row in 0..table.len() {
            let name = format!(
                "{} {}",
                table.cell(row, columns.first_name),
                table.cell(row, columns.last_name)
            );
            if name != full_name {
                continue;
            }

            let Some(row_dob) = cells::parse_date(table.cell(row, columns.date_of_birth)) else {
                warn!("Skipping patient row {} with unreadable DOB", row + 1);
                continue;
            };
            if row_dob != date_of_birth {
                continue;
            }

            if let Some(record) = self.record_at(&table, &columns, row, row_dob) {
                info!("Found patient {} (returning: {})", record.patient_id, record.is_returning);
                return Ok(PatientLookup::Found(record));
            }
        }

        info!("No patient record for {}", full_name);
        Ok(PatientLookup::NotFound)
    }

    fn columns(&self, table: &Table) -> Result<PatientColumns, AppError> {
        Ok(PatientColumns {
            patient_id: table.require_column(&self.table, "PatientID")?,
            first_name: table.require_column(&self.table, "FirstName")?,
            last_name: table.require_column(&self.table, "LastName")?,
            date_of_birth: table.require_column(&self.table, "DOB")?,
            is_returning: table.require_column(&self.table, "IsReturning")?,
        })
    }

    fn record_at(
        &self,
        table: &Table,
        columns: &PatientColumns,
        row: usize,
        date_of_birth: NaiveDate,
    ) -> Option<PatientRecord> {
        let Some(patient_id) = cells::parse_integer(table.cell(row, columns.patient_id)) else {
            warn!("Skipping patient row {} with unreadable PatientID", row + 1);
            return None;
        };

        let raw_flag = table.cell(row, columns.is_returning);
        let is_returning = cells::parse_bool(raw_flag).unwrap_or_else(|| {
            warn!("Patient {} has unreadable IsReturning '{}', treating as new", patient_id, raw_flag);
            false
        });

        Some(PatientRecord {
            patient_id: PatientId(patient_id),
            first_name: table.cell(row, columns.first_name).to_string(),
            last_name: table.cell(row, columns.last_name).to_string(),
            date_of_birth,
            is_returning,
        })
    }
}
