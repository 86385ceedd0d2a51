use super::duration::{current_status, elapsed_since_clock_in, total_break_duration, worked_duration};
use crate::models::session::{EmployeeId, SessionId, SessionStatus, TimeClockSession};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One report row per session, durations in whole minutes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub employee_id: EmployeeId,
    pub status: SessionStatus,
    pub clock_in_at: DateTime<Utc>,
    pub clock_out_at: Option<DateTime<Utc>>,
    pub break_count: usize,
    pub elapsed_minutes: i64,
    pub break_minutes: i64,
    pub worked_minutes: i64,
    pub supervisor_approved: bool,
}

pub fn summarize(session: &TimeClockSession, now: DateTime<Utc>) -> SessionSummary {
    SessionSummary {
        id: session.id,
        employee_id: session.employee_id.clone(),
        status: current_status(session),
        clock_in_at: session.clock_in_at,
        clock_out_at: session.clock_out_at,
        break_count: session.breaks.len(),
        elapsed_minutes: elapsed_since_clock_in(session, now).num_minutes(),
        break_minutes: total_break_duration(session, now).num_minutes(),
        worked_minutes: worked_duration(session, now).num_minutes(),
        supervisor_approved: session.supervisor_approved,
    }
}

/// Totals across several summaries (used by `list`).
pub fn total_worked_minutes(rows: &[SessionSummary]) -> i64 {
    rows.iter().map(|r| r.worked_minutes).sum()
}
