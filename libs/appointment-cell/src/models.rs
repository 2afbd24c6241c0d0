// libs/appointment-cell/src/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notification_cell::DeliveryOutcome;
use patient_cell::PatientId;
use schedule_cell::{AppointmentDuration, Slot};
use shared_models::AppError;

pub const REPORT_STATUS_CONFIRMED: &str = "Confirmed";

// ==============================================================================
// PATIENT-FACING INPUT
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub full_name: String,
    /// As typed by the patient, expected as `MM/DD/YYYY`.
    pub date_of_birth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub carrier: String,
    pub member_id: String,
    pub group_number: String,
}

// ==============================================================================
// SESSION STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    New,
    Returning,
    LookupFailed,
}

impl PatientStatus {
    /// Returning patients get 30 minutes, everyone else 60.
    pub fn required_duration(&self) -> Option<AppointmentDuration> {
        match self {
            PatientStatus::Returning => Some(AppointmentDuration::ThirtyMinutes),
            PatientStatus::New => Some(AppointmentDuration::SixtyMinutes),
            PatientStatus::LookupFailed => None,
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientStatus::New => write!(f, "new"),
            PatientStatus::Returning => write!(f, "returning"),
            PatientStatus::LookupFailed => write!(f, "lookup_failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    #[default]
    Unset,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Greeting,
    Lookup,
    Availability,
    InsuranceCollection,
    Confirmation,
    Done,
    Abandoned,
}

impl WorkflowStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStep::Done | WorkflowStep::Abandoned)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::Greeting => write!(f, "greeting"),
            WorkflowStep::Lookup => write!(f, "lookup"),
            WorkflowStep::Availability => write!(f, "availability"),
            WorkflowStep::InsuranceCollection => write!(f, "insurance_collection"),
            WorkflowStep::Confirmation => write!(f, "confirmation"),
            WorkflowStep::Done => write!(f, "done"),
            WorkflowStep::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Everything known about one patient's walk through the workflow.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pub session_id: Uuid,
    pub patient_name: String,
    pub patient_dob: String,
    pub patient_id: PatientId,
    pub patient_status: Option<PatientStatus>,
    pub appointment_duration: Option<AppointmentDuration>,
    pub available_slots: Vec<Slot>,
    pub selected_slot: Option<Slot>,
    pub insurance: Option<InsuranceInfo>,
    pub confirmation_status: ConfirmationStatus,
    pub step: WorkflowStep,
    pub history: Vec<WorkflowStep>,
    pub notification: Option<DeliveryOutcome>,
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            patient_name: String::new(),
            patient_dob: String::new(),
            patient_id: PatientId::UNREGISTERED,
            patient_status: None,
            appointment_duration: None,
            available_slots: Vec::new(),
            selected_slot: None,
            insurance: None,
            confirmation_status: ConfirmationStatus::Unset,
            step: WorkflowStep::Greeting,
            history: vec![WorkflowStep::Greeting],
            notification: None,
        }
    }

    pub fn visited(&self, step: WorkflowStep) -> bool {
        self.history.contains(&step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    InvalidDateOfBirth(String),
    NoAvailableSlots(AppointmentDuration),
    NoSlotChosen,
}

impl AbandonReason {
    /// The error kind behind the abandonment. Declining every slot is a
    /// patient choice, not an error.
    pub fn as_error(&self) -> Option<AppError> {
        match self {
            AbandonReason::InvalidDateOfBirth(detail) => Some(AppError::InputFormat(detail.clone())),
            AbandonReason::NoAvailableSlots(duration) => {
                Some(AppError::EmptyResult(format!("no available {} slots", duration)))
            }
            AbandonReason::NoSlotChosen => None,
        }
    }
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::InvalidDateOfBirth(detail) => write!(f, "invalid date of birth ({})", detail),
            AbandonReason::NoAvailableSlots(duration) => write!(f, "no available {} slots", duration),
            AbandonReason::NoSlotChosen => write!(f, "no slot was chosen"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Confirmed(BookingSession),
    Abandoned {
        session: BookingSession,
        reason: AbandonReason,
    },
}

impl SessionOutcome {
    pub fn session(&self) -> &BookingSession {
        match self {
            SessionOutcome::Confirmed(session) => session,
            SessionOutcome::Abandoned { session, .. } => session,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionOutcome::Confirmed(_))
    }
}

// ==============================================================================
// ADMIN REPORT
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminReportRow {
    pub patient_id: PatientId,
    pub patient_name: String,
    pub appointment_time: String,
    pub status: String,
}

impl AdminReportRow {
    pub fn confirmed(patient_id: PatientId, patient_name: impl Into<String>, slot: &Slot) -> Self {
        Self {
            patient_id,
            patient_name: patient_name.into(),
            appointment_time: slot.label(),
            status: REPORT_STATUS_CONFIRMED.to_string(),
        }
    }
}
