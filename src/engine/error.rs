use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Coarse failure class, for callers that branch on outcome rather than detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Nothing was mutated.
    Validation,
    /// The requested slot overlaps an existing booking.
    Conflict,
    NotFound,
    /// The durable write failed. In-memory state was rolled back.
    Storage,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid start_time format. Use ISO format (YYYY-MM-DDTHH:MM)")]
    InvalidStartTime(String),
    #[error("Invalid time format: {0}")]
    InvalidTime(String),
    #[error("Invalid duration: {0}. Use a positive number of minutes")]
    InvalidDuration(String),
    #[error("Cannot book resources for past dates")]
    PastDate(NaiveDate),
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
    #[error("This time slot conflicts with an existing booking")]
    Conflict(Uuid),
    #[error("Booking not found")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MissingFields(_)
            | EngineError::InvalidStartTime(_)
            | EngineError::InvalidTime(_)
            | EngineError::InvalidDuration(_)
            | EngineError::PastDate(_)
            | EngineError::LimitExceeded(_) => ErrorKind::Validation,
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::Storage(_) => ErrorKind::Storage,
        }
    }
}
