use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy shared by every cell.
///
/// Only `Storage` and a `NotFound` raised while booking a slot are meant to
/// reach the top of a session or scan; the other kinds are normally folded
/// into workflow outcomes by the caller.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    #[error("Invalid input format: {0}")]
    InputFormat(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("No results: {0}")]
    EmptyResult(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid workflow transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl AppError {
    /// A lost race for a slot can be retried by re-querying availability.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}
