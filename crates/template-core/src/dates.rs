//! Date string <-> epoch seconds conversion.
//!
//! Formats use chrono's strftime syntax (`%Y-%m-%d`, `%d/%m/%Y %H:%M`, ...).
//! Parsing is exact: the whole input must match the format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::fmt::Write;

const SECONDS_PER_DAY: i64 = 86_400;

/// Days from 0001-01-01 (day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Error type for date conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateError {
    /// Input does not match the format, or the format cannot be rendered
    #[error("'{input}' does not match date format '{format}'")]
    InvalidFormat { input: String, format: String },
}

/// Parse `date` with `format` into seconds since the Unix epoch.
///
/// Formats carrying an offset (`%z`) are honoured; date-only formats are
/// read as midnight UTC.
pub fn seconds_from_date(date: &str, format: &str) -> Result<i64, DateError> {
    if let Ok(dt) = DateTime::parse_from_str(date, format) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, format) {
        return Ok(dt.and_utc().timestamp());
    }
    if let Ok(day) = NaiveDate::parse_from_str(date, format) {
        return Ok(midnight(day).timestamp());
    }

    Err(DateError::InvalidFormat {
        input: date.to_string(),
        format: format.to_string(),
    })
}

/// Calendar day containing the instant `secs` (time of day discarded).
///
/// Instants beyond chrono's calendar saturate to `NaiveDate::MIN` / `MAX`.
pub fn date_from_seconds(secs: i64) -> NaiveDate {
    let days = secs.div_euclid(SECONDS_PER_DAY);
    i32::try_from(days + UNIX_EPOCH_DAYS_FROM_CE)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// Render `date` (at midnight UTC) with `format`.
pub fn format_date(date: NaiveDate, format: &str) -> Result<String, DateError> {
    let mut out = String::new();
    write!(out, "{}", midnight(date).format(format)).map_err(|_| DateError::InvalidFormat {
        input: date.to_string(),
        format: format.to_string(),
    })?;
    Ok(out)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_from_date_only() {
        assert_eq!(seconds_from_date("1970-01-01", "%Y-%m-%d").unwrap(), 0);
        assert_eq!(
            seconds_from_date("1970-01-02", "%Y-%m-%d").unwrap(),
            SECONDS_PER_DAY
        );
    }

    #[test]
    fn test_seconds_from_date_time() {
        let secs = seconds_from_date("1970-01-01 01:00:30", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(secs, 3630);
    }

    #[test]
    fn test_seconds_from_date_with_offset() {
        let secs =
            seconds_from_date("1970-01-01 02:00:00 +0200", "%Y-%m-%d %H:%M:%S %z").unwrap();
        assert_eq!(secs, 0);
    }

    #[test]
    fn test_partial_match_is_rejected() {
        assert!(seconds_from_date("2023-05-17 trailing", "%Y-%m-%d").is_err());
        assert!(seconds_from_date("2023-05", "%Y-%m-%d").is_err());
        assert_eq!(
            seconds_from_date("17/05/2023", "%Y-%m-%d"),
            Err(DateError::InvalidFormat {
                input: "17/05/2023".to_string(),
                format: "%Y-%m-%d".to_string(),
            })
        );
    }

    #[test]
    fn test_date_from_seconds_truncates_to_day() {
        let day = date_from_seconds(SECONDS_PER_DAY + 3600 * 23);
        assert_eq!(day, NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());

        let before_epoch = date_from_seconds(-1);
        assert_eq!(before_epoch, NaiveDate::from_ymd_opt(1969, 12, 31).unwrap());
    }

    #[test]
    fn test_date_from_seconds_saturates() {
        assert_eq!(date_from_seconds(i64::MAX), NaiveDate::MAX);
        assert_eq!(date_from_seconds(i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn test_round_trip_day_granularity() {
        let cases = [
            ("2023-05-17", "%Y-%m-%d"),
            ("17/05/2023", "%d/%m/%Y"),
            ("1969-07-20", "%Y-%m-%d"),
            ("2024-02-29 00:00", "%Y-%m-%d %H:%M"),
        ];
        for (input, format) in cases {
            let secs = seconds_from_date(input, format).unwrap();
            let formatted = format_date(date_from_seconds(secs), format).unwrap();
            assert_eq!(formatted, input, "format {format}");
        }
    }

    #[test]
    fn test_format_date_discards_time_of_day() {
        let secs = seconds_from_date("2023-05-17 18:45", "%Y-%m-%d %H:%M").unwrap();
        let formatted = format_date(date_from_seconds(secs), "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(formatted, "2023-05-17 00:00");
    }
}
