// libs/schedule-cell/src/services/store.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use patient_cell::PatientId;
use shared_config::AppConfig;
use shared_database::{cells, Table, TableStore};
use shared_models::AppError;

use crate::models::{
    AppointmentDuration, BookedAppointment, Slot, SlotStatus, STATUS_AVAILABLE, STATUS_BOOKED,
};

const DATE_COLUMN: &str = "Date";
const START_TIME_COLUMN: &str = "StartTime";
const DURATION_COLUMN: &str = "Duration (min)";
const STATUS_COLUMN: &str = "Status";
const BOOKED_BY_COLUMN: &str = "BookedByPatientID";

/// The doctor's schedule table.
///
/// Every read-modify-write cycle holds `write_lock`, so a slot can be booked
/// by at most one caller sharing this store.
pub struct ScheduleStore {
    store: Arc<dyn TableStore>,
    table: String,
    write_lock: Mutex<()>,
}

struct ScheduleColumns {
    date: usize,
    start_time: usize,
    duration: usize,
    status: usize,
    booked_by: Option<usize>,
}

impl ScheduleStore {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(store: Arc<dyn TableStore>, config: &AppConfig) -> Self {
        Self::new(store, config.schedule_table.clone())
    }

    /// Available slots of exactly `duration`, in table order.
    pub async fn find_available(&self, duration: AppointmentDuration) -> Result<Vec<Slot>, AppError> {
        let slots = self.slots().await?;
        let available: Vec<Slot> = slots
            .into_iter()
            .filter(|slot| slot.is_available() && slot.duration == duration)
            .collect();

        debug!("Found {} available {} slots", available.len(), duration);
        Ok(available)
    }

    /// Booked rows dated on or after `on_or_after`, in table order.
    ///
    /// Only the date has to parse. Rows with an unreadable start time, an
    /// unusual length or no patient id are still returned.
    pub async fn list_booked(&self, on_or_after: NaiveDate) -> Result<Vec<BookedAppointment>, AppError> {
        let table = self.store.read_all(&self.table).await?;
        let date = table.require_column(&self.table, DATE_COLUMN)?;
        let status = table.require_column(&self.table, STATUS_COLUMN)?;
        let start_time = table.column(START_TIME_COLUMN);
        let duration = table.column(DURATION_COLUMN);
        let booked_by = table.column(BOOKED_BY_COLUMN);

        let mut booked = Vec::new();
        for row in 0..table.len() {
            if !table.cell(row, status).eq_ignore_ascii_case(STATUS_BOOKED) {
                continue;
            }
            let Some(row_date) = cells::parse_date(table.cell(row, date)) else {
                debug!("Skipping booked schedule row {} with unreadable date", row + 1);
                continue;
            };
            if row_date < on_or_after {
                continue;
            }

            let start_time_text = start_time.map(|column| table.cell(row, column)).unwrap_or_default();
            let parsed_time = cells::parse_time(start_time_text);
            if parsed_time.is_none() {
                warn!("Booked schedule row {} has unreadable start time '{}'", row + 1, start_time_text);
            }

            booked.push(BookedAppointment {
                date: row_date,
                start_time: parsed_time,
                start_time_text: start_time_text.to_string(),
                duration_minutes: duration.and_then(|column| cells::parse_integer(table.cell(row, column))),
                patient_id: booked_by
                    .and_then(|column| cells::parse_integer(table.cell(row, column)))
                    .map(PatientId),
            });
        }

        Ok(booked)
    }

    /// Every readable slot. Rows with an unreadable date, time, duration or
    /// status are skipped.
    pub async fn slots(&self) -> Result<Vec<Slot>, AppError> {
        let table = self.store.read_all(&self.table).await?;
        let columns = self.columns(&table)?;

        Ok((0..table.len())
            .filter_map(|row| parse_row(&table, &columns, row))
            .collect())
    }

    /// Marks the available `duration` slot at `date`/`start_time` as booked by
    /// `patient_id`.
    ///
    /// Returns `NotFound` when no such slot is still available, e.g. when
    /// another session booked it first.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn book(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        duration: AppointmentDuration,
        patient_id: PatientId,
    ) -> Result<Slot, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.store.read_all(&self.table).await?;
        let mut columns = self.columns(&table)?;
        let booked_by = match columns.booked_by {
            Some(index) => index,
            None => table.ensure_column(BOOKED_BY_COLUMN),
        };
        columns.booked_by = Some(booked_by);

        let target = (0..table.len()).find_map(|row| {
            parse_row(&table, &columns, row)
                .filter(|slot| {
                    slot.is_available()
                        && slot.date == date
                        && slot.start_time == start_time
                        && slot.duration == duration
                })
                .map(|slot| (row, slot))
        });

        let Some((row, mut slot)) = target else {
            warn!("No available {} slot on {} at {} to book", duration, date, start_time);
            return Err(AppError::NotFound(format!(
                "no available {} slot on {} at {}",
                duration,
                date,
                start_time.format("%H:%M")
            )));
        };

        table.set_cell(row, columns.status, STATUS_BOOKED);
        table.set_cell(row, booked_by, patient_id.to_string());
        self.store.overwrite_all(&self.table, &table).await?;

        slot.status = SlotStatus::Booked { patient_id };
        info!("Booked slot {} for patient {}", slot.label(), patient_id);
        Ok(slot)
    }

    fn columns(&self, table: &Table) -> Result<ScheduleColumns, AppError> {
        Ok(ScheduleColumns {
            date: table.require_column(&self.table, DATE_COLUMN)?,
            start_time: table.require_column(&self.table, START_TIME_COLUMN)?,
            duration: table.require_column(&self.table, DURATION_COLUMN)?,
            status: table.require_column(&self.table, STATUS_COLUMN)?,
            booked_by: table.column(BOOKED_BY_COLUMN),
        })
    }
}

fn parse_row(table: &Table, columns: &ScheduleColumns, row: usize) -> Option<Slot> {
    let date = cells::parse_date(table.cell(row, columns.date));
    let start_time = cells::parse_time(table.cell(row, columns.start_time));
    let (Some(date), Some(start_time)) = (date, start_time) else {
        debug!("Skipping schedule row {} with unreadable date or time", row + 1);
        return None;
    };

    let duration = cells::parse_integer(table.cell(row, columns.duration))
        .and_then(AppointmentDuration::from_minutes)?;

    let raw_status = table.cell(row, columns.status);
    let status = if raw_status.eq_ignore_ascii_case(STATUS_AVAILABLE) {
        SlotStatus::Available
    } else if raw_status.eq_ignore_ascii_case(STATUS_BOOKED) {
        let patient_id = columns
            .booked_by
            .and_then(|column| cells::parse_integer(table.cell(row, column)));
        match patient_id {
            Some(id) => SlotStatus::Booked { patient_id: PatientId(id) },
            None => {
                warn!("Skipping booked schedule row {} without a patient id", row + 1);
                return None;
            }
        }
    } else {
        debug!("Skipping schedule row {} with status '{}'", row + 1, raw_status);
        return None;
    };

    Some(Slot {
        date,
        start_time,
        duration,
        status,
    })
}
