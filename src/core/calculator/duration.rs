//! Derived queries over a session. Pure functions of the session and `now`;
//! every duration is clamped at zero.

use crate::models::session::{SessionStatus, TimeClockSession};
use chrono::{DateTime, Duration, Utc};

fn non_negative(d: Duration) -> Duration {
    d.max(Duration::zero())
}

/// `(clock_out_at ?? now) - clock_in_at`
pub fn elapsed_since_clock_in(session: &TimeClockSession, now: DateTime<Utc>) -> Duration {
    let end = session.clock_out_at.unwrap_or(now);
    non_negative(end - session.clock_in_at)
}

/// Sum of all break intervals; an open break counts up to `now`.
pub fn total_break_duration(session: &TimeClockSession, now: DateTime<Utc>) -> Duration {
    session
        .breaks
        .iter()
        .map(|b| non_negative(b.end_at.unwrap_or(now) - b.start_at))
        .fold(Duration::zero(), |acc, d| acc + d)
}

pub fn worked_duration(session: &TimeClockSession, now: DateTime<Utc>) -> Duration {
    let elapsed = elapsed_since_clock_in(session, now);
    let breaks = total_break_duration(session, now);
    non_negative(elapsed - breaks)
}

/// Status derived from the recorded times, not from the stored `status` field.
pub fn current_status(session: &TimeClockSession) -> SessionStatus {
    if session.clock_out_at.is_some() {
        SessionStatus::ClockedOut
    } else if session.open_break().is_some() {
        SessionStatus::OnBreak
    } else {
        SessionStatus::ClockedIn
    }
}
