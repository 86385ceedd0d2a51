//! Time utilities: UTC offset parsing, `--at` parsing and local formatting.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Parse "+HH:MM" / "-HH:MM" (or "Z") into a fixed offset.
pub fn parse_offset(s: &str) -> AppResult<FixedOffset> {
    let s = s.trim();
    let bad = || AppError::Config(format!("invalid utc_offset '{}', expected +HH:MM", s));

    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(bad);
    }

    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(bad()),
    };
    let (h, m) = rest.split_once(':').ok_or_else(bad)?;
    let hours: i32 = h.parse().map_err(|_| bad())?;
    let minutes: i32 = m.parse().map_err(|_| bad())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(bad());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(bad)
}

/// Parse a caller-supplied instant.
/// Accepts RFC 3339, or "YYYY-MM-DD HH:MM" / "YYYY-MM-DDTHH:MM" in `offset`.
pub fn parse_instant(s: &str, offset: FixedOffset) -> AppResult<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive
                .and_local_timezone(offset)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AppError::InvalidTime(s.to_string()));
        }
    }

    Err(AppError::InvalidTime(s.to_string()))
}

/// "YYYY-MM-DD HH:MM" in the given offset.
pub fn fmt_local(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}

/// "HH:MM" in the given offset.
pub fn fmt_local_time(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("02:00").is_err());
        assert!(parse_offset("+25:00").is_err());
    }

    #[test]
    fn instants_are_read_in_offset() {
        let plus2 = parse_offset("+02:00").unwrap();
        let at = parse_instant("2025-03-10 10:00", plus2).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap());

        let rfc = parse_instant("2025-03-10T10:00:00Z", plus2).unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap());

        assert!(parse_instant("10:00", plus2).is_err());
    }
}
