use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::{cells, DatabaseError, Table, TableStore};
use shared_models::AppError;

use crate::models::ReminderKey;

pub const LEDGER_COLUMNS: [&str; 4] = ["Date", "StartTime", "DaysBefore", "SentAt"];

/// Record of reminders already delivered, so each one fires at most once.
pub struct ReminderLedger {
    store: Arc<dyn TableStore>,
    table: String,
    write_lock: Mutex<()>,
}

impl ReminderLedger {
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(store: Arc<dyn TableStore>, config: &AppConfig) -> Self {
        Self::new(store, config.reminder_ledger_table.clone())
    }

    /// Every recorded reminder. An absent ledger reads as empty.
    pub async fn sent_keys(&self) -> Result<HashSet<ReminderKey>, AppError> {
        let table = match self.store.read_all(&self.table).await {
            Ok(table) => table,
            Err(DatabaseError::TableNotFound(_)) => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };

        let date = table.require_column(&self.table, "Date")?;
        let start_time = table.require_column(&self.table, "StartTime")?;
        let days_before = table.require_column(&self.table, "DaysBefore")?;

        let mut keys = HashSet::with_capacity(table.len());
        for row in 0..table.len() {
            let raw_time = table.cell(row, start_time);
            let time_label = cells::parse_time(raw_time)
                .map(|time| time.format("%H:%M").to_string())
                .unwrap_or_else(|| raw_time.to_string());
            let key = (
                cells::parse_date(table.cell(row, date)),
                cells::parse_integer(table.cell(row, days_before)),
            );
            match key {
                (Some(date), Some(days_before)) => {
                    keys.insert(ReminderKey {
                        date,
                        start_time: time_label,
                        days_before,
                    });
                }
                _ => warn!("Skipping unreadable reminder ledger row {}", row + 1),
            }
        }

        debug!("Reminder ledger holds {} entries", keys.len());
        Ok(keys)
    }

    pub async fn record(&self, key: ReminderKey, sent_at: DateTime<Utc>) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let mut table = match self.store.read_all(&self.table).await {
            Ok(table) => table,
            Err(DatabaseError::TableNotFound(_)) => {
                info!("Creating reminder ledger table {}", self.table);
                Table::new(LEDGER_COLUMNS)
            }
            Err(e) => return Err(e.into()),
        };

        table.push_record(&[
            ("Date", key.date.format("%Y-%m-%d").to_string()),
            ("StartTime", key.start_time),
            ("DaysBefore", key.days_before.to_string()),
            ("SentAt", sent_at.to_rfc3339()),
        ]);
        self.store.overwrite_all(&self.table, &table).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_database::InMemoryTableStore;

    fn key(day: u32, days_before: i64) -> ReminderKey {
        ReminderKey {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            start_time: "09:30".to_string(),
            days_before,
        }
    }

    #[tokio::test]
    async fn recorded_keys_read_back() {
        let ledger = ReminderLedger::new(Arc::new(InMemoryTableStore::new()), "reminders_sent");
        assert!(ledger.sent_keys().await.unwrap().is_empty());

        ledger.record(key(8, 7), Utc::now()).await.unwrap();
        ledger.record(key(8, 3), Utc::now()).await.unwrap();

        let keys = ledger.sent_keys().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&key(8, 7)));
        assert!(keys.contains(&key(8, 3)));
        assert!(!keys.contains(&key(8, 1)));
    }
}
