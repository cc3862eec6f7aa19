//! Wire date format helpers
//!
//! The data API exchanges timestamps as `YYYY-MM-DD HH:MM:SS` without a zone
//! offset. Values are kept naive and read in the zone of whoever emitted them.

use crate::error::{CommonError, Result};
use chrono::{Duration, NaiveDateTime};

/// `chrono` format string for the wire date format
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable form of [`DATE_FORMAT`], used in help texts
pub const DATE_FORMAT_HINT: &str = "YYYY-MM-DD HH:MM:SS";

/// Format a timestamp for the wire
pub fn format_datetime(at: NaiveDateTime) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Parse a wire timestamp
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|source| {
        CommonError::InvalidDateTime {
            value: value.to_string(),
            source,
        }
    })
}

/// Parse a compact duration such as `4h`, `60m`, `45s` or `12h15m30s`.
///
/// Units are `h`, `m` and `s`; every number needs a unit.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = || CommonError::InvalidDuration(value.to_string());

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::zero();
    let mut digits = String::new();

    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        digits.clear();

        let part = match ch {
            'h' => Duration::try_hours(amount),
            'm' => Duration::try_minutes(amount),
            's' => Duration::try_seconds(amount),
            _ => None,
        }
        .ok_or_else(invalid)?;

        total = total.checked_add(&part).ok_or_else(invalid)?;
    }

    if !digits.is_empty() {
        return Err(invalid());
    }

    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_and_format_roundtrip() {
        let at = parse_datetime("2024-03-01 10:00:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(at, expected);
        assert_eq!(format_datetime(at), "2024-03-01 10:00:00");
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(parse_datetime("2024-03-01T10:00:00").is_err());
        assert!(parse_datetime("01.03.2024 10:00").is_err());
        assert!(parse_datetime("").is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("4h").unwrap(), Duration::hours(4));
        assert_eq!(parse_duration("60m").unwrap(), Duration::minutes(60));
        assert_eq!(parse_duration("45s").unwrap(), Duration::seconds(45));
        assert_eq!(
            parse_duration("12h15m30s").unwrap(),
            Duration::hours(12) + Duration::minutes(15) + Duration::seconds(30)
        );
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("15").is_err());
        assert!(parse_duration("1d").is_err());
        assert!(parse_duration("h").is_err());
    }
}
