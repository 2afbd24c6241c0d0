use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table {table} is missing column {column}")]
    MissingColumn { table: String, column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Storage(err.to_string())
    }
}
