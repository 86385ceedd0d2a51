use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, params};

/// Ensure that the `log` table exists. Applied migrations are recorded in it,
/// so it has to exist before anything else.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_sessions",
        description: "Created sessions and breaks tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id         TEXT NOT NULL,
            status              TEXT NOT NULL
                                CHECK(status IN ('clocked_in','on_break','clocked_out')),
            clock_in_at         TEXT NOT NULL,
            clock_out_at        TEXT,
            clock_in_location   TEXT,
            clock_out_location  TEXT,
            notes               TEXT,
            supervisor_approved INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_clock_in ON sessions(clock_in_at);
        CREATE INDEX IF NOT EXISTS idx_sessions_employee ON sessions(employee_id, clock_in_at);

        CREATE TABLE IF NOT EXISTS breaks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            position    INTEGER NOT NULL,
            start_at    TEXT NOT NULL,
            end_at      TEXT,
            UNIQUE(session_id, position)
        );
        "#,
    },
    Migration {
        version: "20250301_0002_one_open_session_per_employee",
        description: "Added unique index on open sessions per employee",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
            ON sessions(employee_id) WHERE clock_out_at IS NULL;
        "#,
    },
    Migration {
        version: "20250318_0003_create_scheduled_tasks",
        description: "Created scheduled_tasks table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS scheduled_tasks (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            trigger_name  TEXT NOT NULL,
            employee_id   TEXT NOT NULL,
            session_id    INTEGER REFERENCES sessions(id) ON DELETE SET NULL,
            event         TEXT NOT NULL,
            fired_at      TEXT NOT NULL,
            due_at        TEXT NOT NULL,
            title         TEXT NOT NULL,
            show_alert    INTEGER NOT NULL DEFAULT 0,
            play_sound    INTEGER NOT NULL DEFAULT 0,
            text_field    TEXT,
            text_required INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_firings
            ON scheduled_tasks(trigger_name, employee_id, fired_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_due ON scheduled_tasks(due_at);
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![m.version, m.description],
    )?;

    tx.commit()?;

    success(format!("Migration applied: {} → {}", m.version, m.description));
    Ok(())
}

/// Public entry point: run all pending migrations, oldest first.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            apply(conn, m)?;
        }
    }

    Ok(())
}

/// Versions recorded as applied, in application order.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
