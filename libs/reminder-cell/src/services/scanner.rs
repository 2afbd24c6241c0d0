// libs/reminder-cell/src/services/scanner.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use notification_cell::{DeliveryOutcome, EmailMessage, NotificationGateway};
use schedule_cell::ScheduleStore;
use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{ReminderKey, ReminderKind, ScanSummary};
use crate::services::ledger::ReminderLedger;

/// Finds booked slots a fixed number of days out and emails a reminder for each.
///
/// Without a ledger every scan sends whatever is due that day, so two scans
/// on the same day send twice. Attach a `ReminderLedger` to fire each
/// reminder once.
pub struct ReminderScanner {
    schedule: Arc<ScheduleStore>,
    notifier: Arc<dyn NotificationGateway>,
    recipient: String,
    clinic_name: String,
    ledger: Option<ReminderLedger>,
}

impl ReminderScanner {
    pub fn new(
        schedule: Arc<ScheduleStore>,
        notifier: Arc<dyn NotificationGateway>,
        recipient: impl Into<String>,
        clinic_name: impl Into<String>,
    ) -> Self {
        Self {
            schedule,
            notifier,
            recipient: recipient.into(),
            clinic_name: clinic_name.into(),
            ledger: None,
        }
    }

    pub fn from_config(
        schedule: Arc<ScheduleStore>,
        notifier: Arc<dyn NotificationGateway>,
        config: &AppConfig,
    ) -> Self {
        Self::new(schedule, notifier, config.receiver_email.clone(), config.clinic_name.clone())
    }

    pub fn with_ledger(mut self, ledger: ReminderLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    #[instrument(skip(self))]
    pub async fn scan(&self, today: NaiveDate) -> Result<ScanSummary, AppError> {
        info!("Running reminder check for {}", today);

        let upcoming = self.schedule.list_booked(today).await?;
        let already_sent = match &self.ledger {
            Some(ledger) => ledger.sent_keys().await?,
            None => Default::default(),
        };

        let mut summary = ScanSummary {
            considered: upcoming.len(),
            ..ScanSummary::default()
        };
        if upcoming.is_empty() {
            info!("No upcoming appointments to send reminders for");
            return Ok(summary);
        }

        for appointment in &upcoming {
            let days_until = appointment.days_until(today);
            let Some(kind) = ReminderKind::for_days_until(days_until) else {
                continue;
            };

            let key = ReminderKey::for_appointment(appointment, days_until);
            if already_sent.contains(&key) {
                debug!("Reminder for {} ({} days out) already sent", appointment.label(), days_until);
                summary.suppressed += 1;
                continue;
            }

            let message = EmailMessage::new(&self.recipient, kind.subject(), kind.body(appointment, &self.clinic_name));
            let outcome = self.notifier.send(&message).await;
            match &outcome {
                DeliveryOutcome::Sent => info!("Sent {:?} reminder for {}", kind, appointment.label()),
                DeliveryOutcome::Skipped(reason) => warn!("Reminder for {} skipped: {}", appointment.label(), reason),
                DeliveryOutcome::Failed(reason) => error!("Reminder for {} failed: {}", appointment.label(), reason),
            }
            summary.record(&outcome);

            if let (DeliveryOutcome::Sent, Some(ledger)) = (&outcome, &self.ledger) {
                ledger.record(key, Utc::now()).await?;
            }
        }

        info!(
            "Reminder check complete: {} considered, {} sent, {} skipped, {} failed, {} suppressed",
            summary.considered, summary.sent, summary.skipped, summary.failed, summary.suppressed
        );
        Ok(summary)
    }
}
