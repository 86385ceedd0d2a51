//! Persistence seam for sessions and scheduled tasks.
//!
//! The one-open-session-per-employee rule is enforced here, at insert time,
//! so that concurrent clock-ins cannot both succeed.

use crate::errors::{AppResult, ClockError};
use crate::models::location::GeoPoint;
use crate::models::session::{EmployeeId, SessionId, TimeClockSession};
use crate::models::task::ScheduledTask;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub employee: Option<EmployeeId>,
    /// Inclusive lower bound on `clock_in_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `clock_in_at`.
    pub to: Option<DateTime<Utc>>,
    pub open_only: bool,
}

impl SessionFilter {
    pub fn matches(&self, s: &TimeClockSession) -> bool {
        self.employee.as_ref().is_none_or(|e| *e == s.employee_id)
            && self.from.is_none_or(|f| s.clock_in_at >= f)
            && self.to.is_none_or(|t| s.clock_in_at < t)
            && (!self.open_only || s.is_open())
    }
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub employee: Option<EmployeeId>,
    /// Only tasks due at or before this instant.
    pub due_by: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn matches(&self, t: &ScheduledTask) -> bool {
        self.employee.as_ref().is_none_or(|e| *e == t.employee_id)
            && self.due_by.is_none_or(|d| t.due_at <= d)
    }
}

pub trait SessionStore {
    /// Atomically create an open session, or fail with `AlreadyClockedIn`.
    fn insert_open(
        &mut self,
        employee: &EmployeeId,
        clock_in_at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> AppResult<TimeClockSession>;

    fn find(&self, id: SessionId) -> AppResult<Option<TimeClockSession>>;

    fn find_open(&self, employee: &EmployeeId) -> AppResult<Option<TimeClockSession>>;

    /// Replace the stored record with `session` (breaks included).
    /// Fails with `SessionNotOpen` if the record is missing, or is already
    /// closed and `session` carries a different clock-out.
    fn save(&mut self, session: &TimeClockSession) -> AppResult<()>;

    /// Sessions ordered by clock-in time.
    fn list(&self, filter: &SessionFilter) -> AppResult<Vec<TimeClockSession>>;
}

pub trait TriggerLedger {
    /// Tasks already scheduled by `trigger` for `employee` with `fired_at` in `[from, to)`.
    fn firing_count(
        &self,
        trigger: &str,
        employee: &EmployeeId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<u32>;

    fn record_task(&mut self, task: &ScheduledTask) -> AppResult<ScheduledTask>;

    /// Tasks ordered by due time.
    fn tasks(&self, filter: &TaskFilter) -> AppResult<Vec<ScheduledTask>>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: HashMap<SessionId, TimeClockSession>,
    tasks: Vec<ScheduledTask>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn insert_open(
        &mut self,
        employee: &EmployeeId,
        clock_in_at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> AppResult<TimeClockSession> {
        if let Some(open) = self.find_open(employee)? {
            return Err(ClockError::AlreadyClockedIn {
                employee: employee.clone(),
                session: open.id,
            }
            .into());
        }

        self.next_id += 1;
        let session =
            TimeClockSession::new(SessionId(self.next_id), employee.clone(), clock_in_at, location);
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    fn find(&self, id: SessionId) -> AppResult<Option<TimeClockSession>> {
        Ok(self.sessions.get(&id).cloned())
    }

    fn find_open(&self, employee: &EmployeeId) -> AppResult<Option<TimeClockSession>> {
        Ok(self
            .sessions
            .values()
            .find(|s| s.is_open() && s.employee_id == *employee)
            .cloned())
    }

    fn save(&mut self, session: &TimeClockSession) -> AppResult<()> {
        match self.sessions.get_mut(&session.id) {
            // a closed record keeps its clock-out
            Some(slot) if slot.clock_out_at.is_none_or(|t| session.clock_out_at == Some(t)) => {
                *slot = session.clone();
                Ok(())
            }
            _ => Err(ClockError::SessionNotOpen(session.id).into()),
        }
    }

    fn list(&self, filter: &SessionFilter) -> AppResult<Vec<TimeClockSession>> {
        let mut out: Vec<TimeClockSession> = self
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        out.sort_by_key(|s| (s.clock_in_at, s.id));
        Ok(out)
    }
}

impl TriggerLedger for MemoryStore {
    fn firing_count(
        &self,
        trigger: &str,
        employee: &EmployeeId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<u32> {
        let n = self
            .tasks
            .iter()
            .filter(|t| {
                t.trigger == trigger && t.employee_id == *employee && t.fired_at >= from && t.fired_at < to
            })
            .count();
        Ok(n as u32)
    }

    fn record_task(&mut self, task: &ScheduledTask) -> AppResult<ScheduledTask> {
        let mut stored = task.clone();
        stored.id = self.tasks.len() as i64 + 1;
        self.tasks.push(stored.clone());
        Ok(stored)
    }

    fn tasks(&self, filter: &TaskFilter) -> AppResult<Vec<ScheduledTask>> {
        let mut out: Vec<ScheduledTask> = self
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        out.sort_by_key(|t| (t.due_at, t.id));
        Ok(out)
    }
}
