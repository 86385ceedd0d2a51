use super::model::SessionExport;
use crate::errors::AppResult;
use crate::utils::time::fmt_local;
use chrono::FixedOffset;
use csv::Writer;
use std::path::Path;

const HEADERS: [&str; 11] = [
    "id",
    "employee",
    "status",
    "clock_in",
    "clock_out",
    "breaks",
    "elapsed_min",
    "break_min",
    "worked_min",
    "approved",
    "notes",
];

/// Write one CSV row per session, times in `offset`.
pub fn write_csv(path: &Path, rows: &[SessionExport], offset: FixedOffset) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(HEADERS)?;

    for r in rows {
        let s = &r.session;
        wtr.write_record(&[
            s.id.to_string(),
            s.employee_id.to_string(),
            s.status.to_db_str().to_string(),
            fmt_local(s.clock_in_at, offset),
            s.clock_out_at
                .map(|t| fmt_local(t, offset))
                .unwrap_or_default(),
            s.breaks.len().to_string(),
            r.elapsed_minutes.to_string(),
            r.break_minutes.to_string(),
            r.worked_minutes.to_string(),
            s.supervisor_approved.to_string(),
            s.notes.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
