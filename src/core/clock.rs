//! Time-clock state machine.
//!
//! ```text
//!   (none) --clock_in--> ClockedIn --start_break--> OnBreak
//!                          ^   |                      |
//!                          |   +----end_break---------+ (back to ClockedIn)
//!                          |
//!   ClockedIn | OnBreak --clock_out--> ClockedOut (terminal)
//! ```
//!
//! Every transition validates first and mutates last, so a failed call leaves
//! the session untouched. `now` is always supplied by the caller.

use crate::core::calculator::duration::current_status;
use crate::errors::ClockError;
use crate::models::clock_event::{ClockEvent, ClockEventKind};
use crate::models::location::GeoPoint;
use crate::models::session::{BreakInterval, SessionStatus, TimeClockSession};
use chrono::{DateTime, Utc};

impl TimeClockSession {
    /// Latest instant already recorded on the session (clock-in, or the
    /// start/end of the last break).
    fn last_recorded_instant(&self) -> DateTime<Utc> {
        match self.breaks.last() {
            Some(b) => b.end_at.unwrap_or(b.start_at),
            None => self.clock_in_at,
        }
    }

    fn event(&self, kind: ClockEventKind, at: DateTime<Utc>) -> ClockEvent {
        ClockEvent::new(kind, self.employee_id.clone(), Some(self.id), at)
    }

    pub fn start_break(&mut self, now: DateTime<Utc>) -> Result<ClockEvent, ClockError> {
        match current_status(self) {
            SessionStatus::ClockedOut => return Err(ClockError::SessionNotOpen(self.id)),
            SessionStatus::OnBreak => return Err(ClockError::BreakAlreadyActive(self.id)),
            SessionStatus::ClockedIn => {}
        }

        let previous = self.last_recorded_instant();
        if now < previous {
            return Err(ClockError::TimestampOutOfOrder { at: now, previous });
        }

        self.breaks.push(BreakInterval::open(now));
        self.status = SessionStatus::OnBreak;
        Ok(self.event(ClockEventKind::BreakStart, now))
    }

    pub fn end_break(&mut self, now: DateTime<Utc>) -> Result<ClockEvent, ClockError> {
        match current_status(self) {
            SessionStatus::ClockedOut => return Err(ClockError::SessionNotOpen(self.id)),
            SessionStatus::ClockedIn => return Err(ClockError::NoActiveBreak(self.id)),
            SessionStatus::OnBreak => {}
        }

        let id = self.id;
        let open = self
            .breaks
            .last_mut()
            .filter(|b| b.is_open())
            .ok_or(ClockError::NoActiveBreak(id))?;

        if now <= open.start_at {
            return Err(ClockError::TimestampOutOfOrder {
                at: now,
                previous: open.start_at,
            });
        }

        open.end_at = Some(now);
        self.status = SessionStatus::ClockedIn;
        Ok(self.event(ClockEventKind::BreakEnd, now))
    }

    /// Close the session. An open break is closed at the same instant.
    pub fn clock_out(
        &mut self,
        now: DateTime<Utc>,
        notes: Option<String>,
        location: Option<GeoPoint>,
    ) -> Result<ClockEvent, ClockError> {
        if current_status(self) == SessionStatus::ClockedOut {
            return Err(ClockError::SessionNotOpen(self.id));
        }

        if now <= self.clock_in_at {
            return Err(ClockError::TimestampOutOfOrder {
                at: now,
                previous: self.clock_in_at,
            });
        }

        let previous = self.last_recorded_instant();
        let on_break = self.open_break().is_some();
        // an open break must get a non-empty interval; a closed one may end exactly now
        if (on_break && now <= previous) || now < previous {
            return Err(ClockError::TimestampOutOfOrder { at: now, previous });
        }

        if let Some(open) = self.breaks.last_mut().filter(|b| b.is_open()) {
            open.end_at = Some(now);
        }

        self.clock_out_at = Some(now);
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self.clock_out_location = location;
        self.status = SessionStatus::ClockedOut;
        Ok(self.event(ClockEventKind::ClockOut, now))
    }

    /// Set or revise supervisor approval. Only closed sessions can be approved.
    pub fn set_approval(&mut self, approved: bool) -> Result<(), ClockError> {
        if self.is_open() {
            return Err(ClockError::SessionStillOpen(self.id));
        }
        self.supervisor_approved = approved;
        Ok(())
    }
}
