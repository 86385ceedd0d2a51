use super::session::{EmployeeId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transition kinds a task trigger can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockEventKind {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
    Manual,
}

impl ClockEventKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ClockEventKind::ClockIn => "clock_in",
            ClockEventKind::ClockOut => "clock_out",
            ClockEventKind::BreakStart => "break_start",
            ClockEventKind::BreakEnd => "break_end",
            ClockEventKind::Manual => "manual",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "clock_in" => Some(ClockEventKind::ClockIn),
            "clock_out" => Some(ClockEventKind::ClockOut),
            "break_start" => Some(ClockEventKind::BreakStart),
            "break_end" => Some(ClockEventKind::BreakEnd),
            "manual" => Some(ClockEventKind::Manual),
            _ => None,
        }
    }
}

/// Emitted by every successful transition (and by manual firing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockEvent {
    pub kind: ClockEventKind,
    pub employee_id: EmployeeId,
    pub session_id: Option<SessionId>,
    pub at: DateTime<Utc>,
}

impl ClockEvent {
    pub fn new(
        kind: ClockEventKind,
        employee_id: EmployeeId,
        session_id: Option<SessionId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            employee_id,
            session_id,
            at,
        }
    }
}
