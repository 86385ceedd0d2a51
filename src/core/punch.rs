use crate::core::timeclock::TimeClockLogic;
use crate::core::triggers::TriggerEngine;
use crate::db::log::ttlog_soft;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::models::clock_event::ClockEvent;
use crate::models::location::GeoPoint;
use crate::models::session::{EmployeeId, TimeClockSession};
use crate::models::task::ScheduledTask;
use crate::ui::messages::warning;
use chrono::{DateTime, Utc};

/// One time-clock action requested from the CLI.
#[derive(Debug, Clone)]
pub enum Punch {
    In {
        location: Option<GeoPoint>,
    },
    BreakStart,
    BreakEnd,
    Out {
        notes: Option<String>,
        location: Option<GeoPoint>,
    },
}

impl Punch {
    fn operation(&self) -> &'static str {
        match self {
            Punch::In { .. } => "clock_in",
            Punch::BreakStart => "break_start",
            Punch::BreakEnd => "break_end",
            Punch::Out { .. } => "clock_out",
        }
    }
}

pub struct PunchOutcome {
    pub session: TimeClockSession,
    pub event: ClockEvent,
    pub tasks: Vec<ScheduledTask>,
}

/// High-level business logic for the punch commands
/// (`in`, `break`, `resume`, `out`).
pub struct PunchLogic;

impl PunchLogic {
    /// Apply `punch` for `employee`, dispatch the resulting event to the
    /// triggers and write the audit log.
    ///
    /// Only the transition itself can fail the call. Trigger errors are
    /// reported as warnings and yield no tasks.
    pub fn apply(
        store: &mut SqliteStore,
        engine: &TriggerEngine,
        employee: &EmployeeId,
        punch: Punch,
        now: DateTime<Utc>,
    ) -> AppResult<PunchOutcome> {
        let operation = punch.operation();

        let (session, event) = {
            let mut clock = TimeClockLogic::new(store);
            match punch {
                Punch::In { location } => clock.clock_in(employee, location, now)?,
                Punch::BreakStart => {
                    let id = clock.open_session(employee)?.id;
                    clock.start_break(id, now)?
                }
                Punch::BreakEnd => {
                    let id = clock.open_session(employee)?.id;
                    clock.end_break(id, now)?
                }
                Punch::Out { notes, location } => {
                    let id = clock.open_session(employee)?.id;
                    clock.clock_out(id, notes, location, now)?
                }
            }
        };

        ttlog_soft(
            &store.pool.conn,
            operation,
            &format!("#{}", session.id),
            &format!("{} at {}", employee, event.at.to_rfc3339()),
        );

        // the punch is already stored; a ledger failure only costs the tasks
        let tasks = match engine.dispatch(store, &event) {
            Ok(tasks) => tasks,
            Err(e) => {
                warning(format!("Triggers not evaluated for {}: {}", operation, e));
                Vec::new()
            }
        };
        for t in &tasks {
            ttlog_soft(
                &store.pool.conn,
                "trigger",
                &t.trigger,
                &format!("scheduled '{}' for {} due {}", t.title, t.employee_id, t.due_at.to_rfc3339()),
            );
        }

        Ok(PunchOutcome {
            session,
            event,
            tasks,
        })
    }
}
