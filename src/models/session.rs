use super::location::GeoPoint;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the employee owning a session. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidEmployee(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmployeeId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmployeeId::new(value)
    }
}

impl From<EmployeeId> for String {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    ClockedIn,
    OnBreak,
    ClockedOut,
}

impl SessionStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SessionStatus::ClockedIn => "clocked_in",
            SessionStatus::OnBreak => "on_break",
            SessionStatus::ClockedOut => "clocked_out",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "clocked_in" => Some(SessionStatus::ClockedIn),
            "on_break" => Some(SessionStatus::OnBreak),
            "clocked_out" => Some(SessionStatus::ClockedOut),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::ClockedIn => "Clocked in",
            SessionStatus::OnBreak => "On break",
            SessionStatus::ClockedOut => "Clocked out",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, SessionStatus::ClockedOut)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakInterval {
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

impl BreakInterval {
    pub fn open(start_at: DateTime<Utc>) -> Self {
        Self {
            start_at,
            end_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }
}

/// One employee's work record from clock-in to clock-out.
///
/// Fields are public so stores and exporters can map them, but state changes
/// go through the transitions in `core::clock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeClockSession {
    pub id: SessionId,
    pub employee_id: EmployeeId,
    pub status: SessionStatus,
    pub clock_in_at: DateTime<Utc>,
    pub clock_out_at: Option<DateTime<Utc>>,
    pub breaks: Vec<BreakInterval>,
    pub clock_in_location: Option<GeoPoint>,
    pub clock_out_location: Option<GeoPoint>,
    pub notes: Option<String>,
    #[serde(default)]
    pub supervisor_approved: bool,
}

impl TimeClockSession {
    /// A freshly clocked-in session with no breaks.
    pub fn new(
        id: SessionId,
        employee_id: EmployeeId,
        clock_in_at: DateTime<Utc>,
        clock_in_location: Option<GeoPoint>,
    ) -> Self {
        Self {
            id,
            employee_id,
            status: SessionStatus::ClockedIn,
            clock_in_at,
            clock_out_at: None,
            breaks: Vec::new(),
            clock_in_location,
            clock_out_location: None,
            notes: None,
            supervisor_approved: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.clock_out_at.is_none()
    }

    pub fn open_break(&self) -> Option<&BreakInterval> {
        self.breaks.last().filter(|b| b.is_open())
    }

    /// Check every structural invariant of a session record.
    /// Used on records coming from storage or the wire.
    pub fn validate(&self) -> AppResult<()> {
        let corrupt = |msg: String| Err(AppError::CorruptSession(format!("#{}: {}", self.id, msg)));

        let open_breaks = self.breaks.iter().filter(|b| b.is_open()).count();
        if open_breaks > 1 {
            return corrupt(format!("{} open breaks", open_breaks));
        }
        if open_breaks == 1 && self.open_break().is_none() {
            return corrupt("open break is not the last one".into());
        }

        let mut previous_end = self.clock_in_at;
        for b in &self.breaks {
            if b.start_at < previous_end {
                return corrupt(format!("break at {} overlaps or precedes clock-in", b.start_at));
            }
            if let Some(end) = b.end_at {
                if end <= b.start_at {
                    return corrupt(format!("break ending at {} does not follow its start", end));
                }
                previous_end = end;
            } else {
                previous_end = b.start_at;
            }
        }

        let expected = match self.clock_out_at {
            Some(out) => {
                if out <= self.clock_in_at {
                    return corrupt("clock-out is not after clock-in".into());
                }
                if open_breaks > 0 {
                    return corrupt("closed session with an open break".into());
                }
                if out < previous_end {
                    return corrupt("clock-out precedes the end of a break".into());
                }
                SessionStatus::ClockedOut
            }
            None if open_breaks == 1 => SessionStatus::OnBreak,
            None => SessionStatus::ClockedIn,
        };

        if self.status != expected {
            return corrupt(format!(
                "status {:?} does not match recorded times ({:?})",
                self.status, expected
            ));
        }

        Ok(())
    }
}
