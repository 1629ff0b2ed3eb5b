use thiserror::Error;

use crate::slot::SlotTime;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Slot {0} is in the past")]
    PastSlot(SlotTime),

    #[error("Booking policy violated: {0}")]
    PolicyViolation(String),

    /// Another player took the slot between the grid read and the submission.
    /// The grid must be rebuilt from a fresh directory read before retrying.
    #[error("Slot already taken, choose another time: {0}")]
    SubmissionConflict(String),

    #[error("Booking service error: {0}")]
    SubmissionFailure(#[from] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type BookingResult<T> = Result<T, BookingError>;
