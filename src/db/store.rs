use crate::core::store::{SessionFilter, SessionStore, TaskFilter, TriggerLedger};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult, ClockError};
use crate::models::location::GeoPoint;
use crate::models::session::{EmployeeId, SessionId, TimeClockSession};
use crate::models::task::ScheduledTask;
use chrono::{DateTime, Utc};

/// SQLite-backed store. The partial unique index on open sessions makes
/// `insert_open` atomic across processes.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    /// Open the database at `path` and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }
}

impl SessionStore for SqliteStore {
    fn insert_open(
        &mut self,
        employee: &EmployeeId,
        clock_in_at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> AppResult<TimeClockSession> {
        let draft = TimeClockSession::new(SessionId(0), employee.clone(), clock_in_at, location);

        match queries::insert_open_session(&self.pool.conn, &draft) {
            Ok(id) => Ok(TimeClockSession {
                id: SessionId(id),
                ..draft
            }),
            Err(e) if queries::is_unique_violation(&e) => {
                let session = queries::open_session_id(&self.pool.conn, employee)?
                    .unwrap_or(SessionId(0));
                Err(ClockError::AlreadyClockedIn {
                    employee: employee.clone(),
                    session,
                }
                .into())
            }
            Err(e) => Err(AppError::Db(e)),
        }
    }

    fn find(&self, id: SessionId) -> AppResult<Option<TimeClockSession>> {
        queries::load_session(&self.pool.conn, id)
    }

    fn find_open(&self, employee: &EmployeeId) -> AppResult<Option<TimeClockSession>> {
        queries::load_open_session(&self.pool.conn, employee)
    }

    fn save(&mut self, session: &TimeClockSession) -> AppResult<()> {
        if queries::save_session(&mut self.pool.conn, session)? {
            Ok(())
        } else {
            Err(ClockError::SessionNotOpen(session.id).into())
        }
    }

    fn list(&self, filter: &SessionFilter) -> AppResult<Vec<TimeClockSession>> {
        queries::list_sessions(&self.pool.conn, filter)
    }
}

impl TriggerLedger for SqliteStore {
    fn firing_count(
        &self,
        trigger: &str,
        employee: &EmployeeId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<u32> {
        queries::count_firings(&self.pool.conn, trigger, employee, &from, &to)
    }

    fn record_task(&mut self, task: &ScheduledTask) -> AppResult<ScheduledTask> {
        let id = queries::insert_task(&self.pool.conn, task)?;
        Ok(ScheduledTask { id, ..task.clone() })
    }

    fn tasks(&self, filter: &TaskFilter) -> AppResult<Vec<ScheduledTask>> {
        queries::list_tasks(&self.pool.conn, filter)
    }
}
