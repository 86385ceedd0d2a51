use crate::core::store::{SessionFilter, TaskFilter};
use crate::errors::{AppError, AppResult};
use crate::models::clock_event::ClockEventKind;
use crate::models::location::GeoPoint;
use crate::models::session::{BreakInterval, EmployeeId, SessionId, SessionStatus, TimeClockSession};
use crate::models::task::ScheduledTask;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

/// Fixed-width RFC 3339, so stored instants sort as text.
pub fn ts_to_db(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn ts_from_db(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::CorruptSession(format!("bad timestamp '{}'", s)))
}

fn opt_ts_from_db(s: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    s.as_deref().map(ts_from_db).transpose()
}

fn opt_location_from_db(s: Option<String>) -> AppResult<Option<GeoPoint>> {
    s.as_deref()
        .filter(|v| !v.is_empty())
        .map(GeoPoint::from_db_str)
        .transpose()
}

/// Raw `sessions` row, converted to a session once its breaks are loaded.
struct SessionRow {
    id: i64,
    employee_id: String,
    status: String,
    clock_in_at: String,
    clock_out_at: Option<String>,
    clock_in_location: Option<String>,
    clock_out_location: Option<String>,
    notes: Option<String>,
    supervisor_approved: bool,
}

const SESSION_COLUMNS: &str = "id, employee_id, status, clock_in_at, clock_out_at,
     clock_in_location, clock_out_location, notes, supervisor_approved";

fn map_session_row(row: &Row) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        status: row.get("status")?,
        clock_in_at: row.get("clock_in_at")?,
        clock_out_at: row.get("clock_out_at")?,
        clock_in_location: row.get("clock_in_location")?,
        clock_out_location: row.get("clock_out_location")?,
        notes: row.get("notes")?,
        supervisor_approved: row.get::<_, i32>("supervisor_approved")? == 1,
    })
}

fn load_breaks(conn: &Connection, session: i64) -> AppResult<Vec<BreakInterval>> {
    let mut stmt = conn.prepare_cached(
        "SELECT start_at, end_at FROM breaks
         WHERE session_id = ?1
         ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([session], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (start, end) = r?;
        out.push(BreakInterval {
            start_at: ts_from_db(&start)?,
            end_at: opt_ts_from_db(end)?,
        });
    }
    Ok(out)
}

fn into_session(conn: &Connection, row: SessionRow) -> AppResult<TimeClockSession> {
    let status = SessionStatus::from_db_str(&row.status)
        .ok_or_else(|| AppError::CorruptSession(format!("#{}: bad status '{}'", row.id, row.status)))?;

    let session = TimeClockSession {
        id: SessionId(row.id),
        employee_id: EmployeeId::new(row.employee_id)?,
        status,
        clock_in_at: ts_from_db(&row.clock_in_at)?,
        clock_out_at: opt_ts_from_db(row.clock_out_at)?,
        breaks: load_breaks(conn, row.id)?,
        clock_in_location: opt_location_from_db(row.clock_in_location)?,
        clock_out_location: opt_location_from_db(row.clock_out_location)?,
        notes: row.notes,
        supervisor_approved: row.supervisor_approved,
    };

    session.validate()?;
    Ok(session)
}

fn query_sessions(
    conn: &Connection,
    where_sql: &str,
    args: Vec<Value>,
) -> AppResult<Vec<TimeClockSession>> {
    let sql = format!(
        "SELECT {} FROM sessions {} ORDER BY clock_in_at ASC, id ASC",
        SESSION_COLUMNS, where_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_session_row)?;

    let mut raw = Vec::new();
    for r in rows {
        raw.push(r?);
    }

    raw.into_iter().map(|row| into_session(conn, row)).collect()
}

pub fn load_session(conn: &Connection, id: SessionId) -> AppResult<Option<TimeClockSession>> {
    Ok(query_sessions(conn, "WHERE id = ?1", vec![Value::Integer(id.0)])?
        .into_iter()
        .next())
}

pub fn load_open_session(
    conn: &Connection,
    employee: &EmployeeId,
) -> AppResult<Option<TimeClockSession>> {
    Ok(query_sessions(
        conn,
        "WHERE employee_id = ?1 AND clock_out_at IS NULL",
        vec![Value::Text(employee.as_str().to_string())],
    )?
    .into_iter()
    .next())
}

pub fn list_sessions(conn: &Connection, filter: &SessionFilter) -> AppResult<Vec<TimeClockSession>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();

    if let Some(e) = &filter.employee {
        args.push(Value::Text(e.as_str().to_string()));
        clauses.push(format!("employee_id = ?{}", args.len()));
    }
    if let Some(from) = &filter.from {
        args.push(Value::Text(ts_to_db(from)));
        clauses.push(format!("clock_in_at >= ?{}", args.len()));
    }
    if let Some(to) = &filter.to {
        args.push(Value::Text(ts_to_db(to)));
        clauses.push(format!("clock_in_at < ?{}", args.len()));
    }
    if filter.open_only {
        clauses.push("clock_out_at IS NULL".to_string());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    query_sessions(conn, &where_sql, args)
}

/// Insert a new open session. Fails with a UNIQUE constraint error if the
/// employee already has one.
pub fn insert_open_session(conn: &Connection, session: &TimeClockSession) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO sessions (employee_id, status, clock_in_at, clock_in_location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session.employee_id.as_str(),
            session.status.to_db_str(),
            ts_to_db(&session.clock_in_at),
            session.clock_in_location.map(|l| l.to_db_str()),
            ts_to_db(&Utc::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrite the session row and its breaks in one transaction.
///
/// A closed row only accepts writes that keep its `clock_out_at` (approval),
/// so a stale open copy cannot reopen it. Returns false when no row
/// with that id exists or the guard rejects the write.
pub fn save_session(conn: &mut Connection, session: &TimeClockSession) -> AppResult<bool> {
    let tx = conn.transaction()?;

    let updated = tx.execute(
        "UPDATE sessions
         SET status = ?1, clock_out_at = ?2, clock_in_location = ?3,
             clock_out_location = ?4, notes = ?5, supervisor_approved = ?6
         WHERE id = ?7 AND (clock_out_at IS NULL OR clock_out_at = ?2)",
        params![
            session.status.to_db_str(),
            session.clock_out_at.as_ref().map(ts_to_db),
            session.clock_in_location.map(|l| l.to_db_str()),
            session.clock_out_location.map(|l| l.to_db_str()),
            session.notes,
            if session.supervisor_approved { 1 } else { 0 },
            session.id.0,
        ],
    )?;

    if updated == 0 {
        return Ok(false);
    }

    tx.execute("DELETE FROM breaks WHERE session_id = ?1", [session.id.0])?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO breaks (session_id, position, start_at, end_at)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (i, b) in session.breaks.iter().enumerate() {
            stmt.execute(params![
                session.id.0,
                i as i64,
                ts_to_db(&b.start_at),
                b.end_at.as_ref().map(ts_to_db),
            ])?;
        }
    }

    tx.commit()?;
    Ok(true)
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// ---------------------------
// Scheduled tasks
// ---------------------------

pub fn insert_task(conn: &Connection, task: &ScheduledTask) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO scheduled_tasks
            (trigger_name, employee_id, session_id, event, fired_at, due_at,
             title, show_alert, play_sound, text_field, text_required)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            task.trigger,
            task.employee_id.as_str(),
            task.session_id.map(|s| s.0),
            task.event.to_db_str(),
            ts_to_db(&task.fired_at),
            ts_to_db(&task.due_at),
            task.title,
            task.show_alert as i32,
            task.play_sound as i32,
            task.text_field,
            task.text_required as i32,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_firings(
    conn: &Connection,
    trigger: &str,
    employee: &EmployeeId,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> AppResult<u32> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM scheduled_tasks
         WHERE trigger_name = ?1 AND employee_id = ?2
           AND fired_at >= ?3 AND fired_at < ?4",
        params![trigger, employee.as_str(), ts_to_db(from), ts_to_db(to)],
        |row| row.get(0),
    )?;
    Ok(n as u32)
}

struct TaskRow {
    id: i64,
    trigger: String,
    employee_id: String,
    session_id: Option<i64>,
    event: String,
    fired_at: String,
    due_at: String,
    title: String,
    show_alert: bool,
    play_sound: bool,
    text_field: Option<String>,
    text_required: bool,
}

pub fn list_tasks(conn: &Connection, filter: &TaskFilter) -> AppResult<Vec<ScheduledTask>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();

    if let Some(e) = &filter.employee {
        args.push(Value::Text(e.as_str().to_string()));
        clauses.push(format!("employee_id = ?{}", args.len()));
    }
    if let Some(due) = &filter.due_by {
        args.push(Value::Text(ts_to_db(due)));
        clauses.push(format!("due_at <= ?{}", args.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT id, trigger_name, employee_id, session_id, event, fired_at, due_at,
                title, show_alert, play_sound, text_field, text_required
         FROM scheduled_tasks {} ORDER BY due_at ASC, id ASC",
        where_sql
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), |row| {
        Ok(TaskRow {
            id: row.get(0)?,
            trigger: row.get(1)?,
            employee_id: row.get(2)?,
            session_id: row.get(3)?,
            event: row.get(4)?,
            fired_at: row.get(5)?,
            due_at: row.get(6)?,
            title: row.get(7)?,
            show_alert: row.get::<_, i32>(8)? == 1,
            play_sound: row.get::<_, i32>(9)? == 1,
            text_field: row.get(10)?,
            text_required: row.get::<_, i32>(11)? == 1,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        let t = r?;
        let event = ClockEventKind::from_db_str(&t.event)
            .ok_or_else(|| AppError::Other(format!("task #{}: bad event '{}'", t.id, t.event)))?;
        out.push(ScheduledTask {
            id: t.id,
            trigger: t.trigger,
            employee_id: EmployeeId::new(t.employee_id)?,
            session_id: t.session_id.map(SessionId),
            event,
            fired_at: ts_from_db(&t.fired_at)?,
            due_at: ts_from_db(&t.due_at)?,
            title: t.title,
            show_alert: t.show_alert,
            play_sound: t.play_sound,
            text_field: t.text_field,
            text_required: t.text_required,
        });
    }
    Ok(out)
}

// ---------------------------
// Internal log
// ---------------------------

/// (id, date, operation, target, message), oldest first.
pub fn load_log(conn: &Connection) -> AppResult<Vec<(i64, String, String, String, String)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, operation, IFNULL(target, ''), message FROM log ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Id of the employee's open session, used after a UNIQUE conflict.
pub fn open_session_id(conn: &Connection, employee: &EmployeeId) -> AppResult<Option<SessionId>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM sessions WHERE employee_id = ?1 AND clock_out_at IS NULL",
            [employee.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(SessionId))
}
