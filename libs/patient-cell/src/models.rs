use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::AppError;

/// Accepted layouts for a date of birth typed by a patient.
const DOB_INPUT_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub i64);

impl PatientId {
    /// Written for patients that are not in the directory yet.
    pub const UNREGISTERED: PatientId = PatientId(-1);

    pub fn is_registered(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub is_returning: bool,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientLookup {
    Found(PatientRecord),
    NotFound,
}

/// Parses a typed date of birth (`MM/DD/YYYY`, or already canonical
/// `YYYY-MM-DD`) into a calendar date.
pub fn normalize_date_of_birth(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    DOB_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            AppError::InputFormat(format!("date of birth '{}' is not in MM/DD/YYYY format", raw))
        })
}
