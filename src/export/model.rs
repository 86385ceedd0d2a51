use crate::core::calculator::summary::summarize;
use crate::models::session::TimeClockSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Full session record plus its derived durations (minutes, at export time).
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    #[serde(flatten)]
    pub session: TimeClockSession,
    pub elapsed_minutes: i64,
    pub break_minutes: i64,
    pub worked_minutes: i64,
}

impl SessionExport {
    pub fn new(session: TimeClockSession, now: DateTime<Utc>) -> Self {
        let s = summarize(&session, now);
        Self {
            elapsed_minutes: s.elapsed_minutes,
            break_minutes: s.break_minutes,
            worked_minutes: s.worked_minutes,
            session,
        }
    }
}
