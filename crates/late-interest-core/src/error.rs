use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LateInterestError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid date range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LateInterestError {
    fn from(e: serde_json::Error) -> Self {
        LateInterestError::SerializationError(e.to_string())
    }
}
