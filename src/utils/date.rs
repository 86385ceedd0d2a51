//! Period parsing for `list --period` and `export --range`.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a period into inclusive first/last days.
///
/// Supports:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - any of the above as `start:end` (both sides in the same format)
pub fn parse_period(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    if let Some((start_raw, end_raw)) = p.split_once(':') {
        let (start, end) = (start_raw.trim(), end_raw.trim());
        if start.len() != end.len() {
            return Err(AppError::InvalidDate(format!(
                "start and end of '{}' must have the same format",
                p
            )));
        }
        let (first, _) = single_period(start)?;
        let (_, last) = single_period(end)?;
        if last < first {
            return Err(AppError::InvalidDate(format!("period '{}' ends before it starts", p)));
        }
        return Ok((first, last));
    }

    single_period(p.trim())
}

fn single_period(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(p.to_string());

    match p.len() {
        // YYYY
        4 => {
            let y: i32 = p.parse().map_err(|_| bad())?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((d1, d2))
        }
        // YYYY-MM
        7 => {
            let d1 = parse_date(&format!("{}-01", p)).ok_or_else(bad)?;
            Ok((d1, last_day_of_month(d1).ok_or_else(bad)?))
        }
        // YYYY-MM-DD
        10 => {
            let d = parse_date(p).ok_or_else(bad)?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}

fn last_day_of_month(d: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

/// Inclusive local days → `[first midnight, day after last midnight)` in UTC.
pub fn day_bounds_utc(
    first: NaiveDate,
    last: NaiveDate,
    offset: FixedOffset,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let midnight = |d: NaiveDate| {
        d.and_time(NaiveTime::MIN)
            .and_local_timezone(offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| AppError::InvalidDate(d.to_string()))
    };
    Ok((midnight(first)?, midnight(last)? + Duration::days(1)))
}
