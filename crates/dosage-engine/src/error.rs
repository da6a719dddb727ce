//! Error types for dosage-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DosageError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Schedule not found: {0}")]
    NotFound(String),

    #[error("Rounding error: {0}")]
    Rounding(#[from] chrono::RoundingError),
}

pub type Result<T> = std::result::Result<T, DosageError>;
