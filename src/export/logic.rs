use crate::core::store::{SessionFilter, SessionStore};
use crate::db::log::ttlog_soft;
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::export::csv::write_csv;
use crate::export::fs_utils::ensure_writable;
use crate::export::json::write_json;
use crate::export::model::SessionExport;
use crate::export::{ExportFormat, notify_export_success};
use crate::ui::messages::warning;
use crate::utils::date::{day_bounds_utc, parse_period};
use chrono::{DateTime, FixedOffset, Utc};
use std::path::Path;

/// High-level export logic.
pub struct ExportLogic;

impl ExportLogic {
    /// Export sessions whose clock-in falls in `range`.
    ///
    /// `range`: `None`, `"all"`, or a period (`YYYY`, `YYYY-MM`,
    /// `YYYY-MM-DD`, or `start:end` of those). Durations of still-open
    /// sessions are computed at `now`.
    pub fn export(
        store: &SqliteStore,
        offset: FixedOffset,
        format: ExportFormat,
        file: &str,
        range: &Option<String>,
        force: bool,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        ensure_writable(path, force)?;

        let mut filter = SessionFilter::default();
        if let Some(r) = range.as_deref().filter(|r| !r.eq_ignore_ascii_case("all")) {
            let (first, last) = parse_period(r)?;
            let (from, to) = day_bounds_utc(first, last, offset)?;
            filter.from = Some(from);
            filter.to = Some(to);
        }

        let rows: Vec<SessionExport> = store
            .list(&filter)?
            .into_iter()
            .map(|s| SessionExport::new(s, now))
            .collect();

        if rows.is_empty() {
            warning("No sessions found for the requested range.");
        }

        match format {
            ExportFormat::Csv => write_csv(path, &rows, offset)?,
            ExportFormat::Json => write_json(path, &rows)?,
        }

        ttlog_soft(
            &store.pool.conn,
            "export",
            format.as_str(),
            &format!("{} sessions → {}", rows.len(), path.display()),
        );
        notify_export_success(&format.as_str().to_uppercase(), path);

        Ok(rows.len())
    }
}
