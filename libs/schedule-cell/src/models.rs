// libs/schedule-cell/src/models.rs
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use patient_cell::PatientId;

pub const STATUS_AVAILABLE: &str = "Available";
pub const STATUS_BOOKED: &str = "Booked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentDuration {
    ThirtyMinutes,
    SixtyMinutes,
}

impl AppointmentDuration {
    pub fn minutes(&self) -> u32 {
        match self {
            AppointmentDuration::ThirtyMinutes => 30,
            AppointmentDuration::SixtyMinutes => 60,
        }
    }

    pub fn from_minutes(minutes: i64) -> Option<Self> {
        match minutes {
            30 => Some(AppointmentDuration::ThirtyMinutes),
            60 => Some(AppointmentDuration::SixtyMinutes),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-minute", self.minutes())
    }
}

/// Booking state of a slot. The booking patient only exists on `Booked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Booked { patient_id: PatientId },
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => STATUS_AVAILABLE,
            SlotStatus::Booked { .. } => STATUS_BOOKED,
        }
    }

    pub fn booked_by(&self) -> Option<PatientId> {
        match self {
            SlotStatus::Available => None,
            SlotStatus::Booked { patient_id } => Some(*patient_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration: AppointmentDuration,
    pub status: SlotStatus,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at() + Duration::minutes(self.duration.minutes() as i64)
    }

    /// Human-readable identity, e.g. `2025-09-01 at 09:30`.
    pub fn label(&self) -> String {
        format!("{} at {}", self.date.format("%Y-%m-%d"), self.start_time.format("%H:%M"))
    }

    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.duration)
    }
}

/// A booked row as the reminder scan reads it. Only the date has to be
/// readable; a start time or length that does not parse is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedAppointment {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    /// The start time cell as written.
    pub start_time_text: String,
    pub duration_minutes: Option<i64>,
    pub patient_id: Option<PatientId>,
}

impl BookedAppointment {
    /// `HH:MM` when the start time parses, otherwise the cell text.
    pub fn time_label(&self) -> String {
        match self.start_time {
            Some(time) => time.format("%H:%M").to_string(),
            None => self.start_time_text.clone(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} at {}", self.date.format("%Y-%m-%d"), self.time_label())
    }

    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}
