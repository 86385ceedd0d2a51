//! Unified application error type.
//! Transition failures live in `ClockError`; everything else (db, config,
//! parsing, export) is an `AppError`, which also wraps `ClockError`.

use crate::models::session::{EmployeeId, SessionId};
use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

/// Client-correctable failures raised by time-clock transitions.
/// None of them mutates the session they were raised for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Employee {employee} is already clocked in (open session #{session})")]
    AlreadyClockedIn {
        employee: EmployeeId,
        session: SessionId,
    },

    #[error("Session #{0} is not open")]
    SessionNotOpen(SessionId),

    #[error("Session #{0} does not exist")]
    SessionNotFound(SessionId),

    #[error("Session #{0} already has an active break")]
    BreakAlreadyActive(SessionId),

    #[error("Session #{0} has no active break")]
    NoActiveBreak(SessionId),

    #[error("Timestamp {at} is not after {previous}")]
    TimestampOutOfOrder {
        at: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("Employee {0} has no open session")]
    NotClockedIn(EmployeeId),

    #[error("Session #{0} is still open and cannot be approved")]
    SessionStillOpen(SessionId),
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Time clock
    // ---------------------------
    #[error(transparent)]
    Clock(#[from] ClockError),

    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Corrupt session record: {0}")]
    CorruptSession(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Invalid employee id: {0:?}")]
    InvalidEmployee(String),

    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// The transition error behind this failure, if any.
    pub fn as_clock(&self) -> Option<&ClockError> {
        match self {
            AppError::Clock(e) => Some(e),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
