use crate::core::store::SessionStore;
use crate::errors::{AppResult, ClockError};
use crate::models::clock_event::{ClockEvent, ClockEventKind};
use crate::models::location::GeoPoint;
use crate::models::session::{EmployeeId, SessionId, TimeClockSession};
use chrono::{DateTime, Utc};

/// Time-clock operations over a `SessionStore`.
///
/// Each operation loads the session, applies one transition and saves it.
/// The in-memory copy is only written back after the transition succeeded.
pub struct TimeClockLogic<'a, S: SessionStore> {
    store: &'a mut S,
}

impl<'a, S: SessionStore> TimeClockLogic<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    pub fn clock_in(
        &mut self,
        employee: &EmployeeId,
        location: Option<GeoPoint>,
        now: DateTime<Utc>,
    ) -> AppResult<(TimeClockSession, ClockEvent)> {
        if let Some(open) = self.store.find_open(employee)? {
            return Err(ClockError::AlreadyClockedIn {
                employee: employee.clone(),
                session: open.id,
            }
            .into());
        }

        let session = self.store.insert_open(employee, now, location)?;
        let event = ClockEvent::new(ClockEventKind::ClockIn, employee.clone(), Some(session.id), now);
        Ok((session, event))
    }

    pub fn start_break(
        &mut self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> AppResult<(TimeClockSession, ClockEvent)> {
        self.transition(id, |s| s.start_break(now))
    }

    pub fn end_break(
        &mut self,
        id: SessionId,
        now: DateTime<Utc>,
    ) -> AppResult<(TimeClockSession, ClockEvent)> {
        self.transition(id, |s| s.end_break(now))
    }

    pub fn clock_out(
        &mut self,
        id: SessionId,
        notes: Option<String>,
        location: Option<GeoPoint>,
        now: DateTime<Utc>,
    ) -> AppResult<(TimeClockSession, ClockEvent)> {
        self.transition(id, |s| s.clock_out(now, notes, location))
    }

    /// Set or revise supervisor approval of a closed session.
    pub fn approve(&mut self, id: SessionId, approved: bool) -> AppResult<TimeClockSession> {
        let mut session = self
            .store
            .find(id)?
            .ok_or(ClockError::SessionNotFound(id))?;
        session.set_approval(approved)?;
        self.store.save(&session)?;
        Ok(session)
    }

    /// The employee's open session, or `NotClockedIn`.
    pub fn open_session(&self, employee: &EmployeeId) -> AppResult<TimeClockSession> {
        self.store
            .find_open(employee)?
            .ok_or_else(|| ClockError::NotClockedIn(employee.clone()).into())
    }

    fn transition<F>(&mut self, id: SessionId, apply: F) -> AppResult<(TimeClockSession, ClockEvent)>
    where
        F: FnOnce(&mut TimeClockSession) -> Result<ClockEvent, ClockError>,
    {
        let mut session = self
            .store
            .find(id)?
            .ok_or(ClockError::SessionNotOpen(id))?;

        let event = apply(&mut session)?;
        self.store.save(&session)?;
        Ok((session, event))
    }
}
