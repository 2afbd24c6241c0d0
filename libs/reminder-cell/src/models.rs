// libs/reminder-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use notification_cell::DeliveryOutcome;
use schedule_cell::BookedAppointment;

pub const INFORMATIONAL_OFFSET: i64 = 7;
pub const ACTION_REQUIRED_OFFSETS: [i64; 2] = [3, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// A week out: a plain heads-up.
    Informational,
    /// Three days and one day out: asks the patient to confirm.
    ActionRequired,
}

impl ReminderKind {
    /// The reminder due `days_until` days before a booked slot, if any.
    pub fn for_days_until(days_until: i64) -> Option<Self> {
        if days_until == INFORMATIONAL_OFFSET {
            Some(ReminderKind::Informational)
        } else if ACTION_REQUIRED_OFFSETS.contains(&days_until) {
            Some(ReminderKind::ActionRequired)
        } else {
            None
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            ReminderKind::Informational => "Reminder: Your Upcoming Appointment",
            ReminderKind::ActionRequired => "Action Required: Please Confirm Your Upcoming Appointment",
        }
    }

    pub fn body(&self, appointment: &BookedAppointment, clinic_name: &str) -> String {
        match self {
            ReminderKind::Informational => format!(
                "This is a friendly reminder of your upcoming appointment on {}. We look forward to seeing you!",
                appointment.label()
            ),
            ReminderKind::ActionRequired => format!(
                "This is a reminder for your upcoming appointment on {}. \
                 Please take a moment to confirm your visit.\n\n\
                 1. Have you filled out the new patient forms?\n\
                 2. Please reply to this email with 'CONFIRMED' to confirm your attendance. \
                 If you need to cancel, please state the reason.\n\n\
                 Thank you!\n{}",
                appointment.label(),
                clinic_name
            ),
        }
    }
}

/// Identifies one reminder: a booked slot and how many days ahead of it the
/// reminder fires. `start_time` is `HH:MM`, or the cell text when unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub date: NaiveDate,
    pub start_time: String,
    pub days_before: i64,
}

impl ReminderKey {
    pub fn for_appointment(appointment: &BookedAppointment, days_before: i64) -> Self {
        Self {
            date: appointment.date,
            start_time: appointment.time_label(),
            days_before,
        }
    }
}

/// Counts from a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Booked slots dated today or later.
    pub considered: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Already sent by an earlier scan, per the reminder ledger.
    pub suppressed: usize,
}

impl ScanSummary {
    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Sent => self.sent += 1,
            DeliveryOutcome::Skipped(_) => self.skipped += 1,
            DeliveryOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Reminders that were due this scan, whatever happened to them.
    pub fn due(&self) -> usize {
        self.sent + self.skipped + self.failed + self.suppressed
    }
}
