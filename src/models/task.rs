use super::clock_event::ClockEventKind;
use super::session::{EmployeeId, SessionId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A delayed task produced by a matching trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: i64, // 0 until stored
    pub trigger: String,
    pub employee_id: EmployeeId,
    pub session_id: Option<SessionId>,
    pub event: ClockEventKind,
    pub fired_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub title: String,
    pub show_alert: bool,
    pub play_sound: bool,
    /// Label of the text field shown with the task, if any.
    pub text_field: Option<String>,
    pub text_required: bool,
}
