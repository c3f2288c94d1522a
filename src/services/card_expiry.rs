use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;

use crate::error::CruiseError;

/// Two-digit years this far ahead are read as the previous century.
const CENTURY_GUARD_YEARS: i32 = 20;

fn expiry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(0[1-9]|1[0-2])/(\d{2})$").unwrap_or_else(|e| panic!("expiry pattern: {}", e))
    })
}

fn expiry_year(two_digit: i32, current_year: i32) -> i32 {
    let mut year = 2000 + two_digit;
    if year < 2000 {
        year += 100;
    } else if year >= current_year + CENTURY_GUARD_YEARS {
        year -= 100;
    }
    year
}

/// Last second of the given month, in UTC.
fn end_of_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&first_of_next) - Duration::seconds(1))
}

/// Checks an `MM/YY` card expiry against `now` and returns the moment the
/// card stops being valid.
pub fn validate_card_expiry(expiry: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CruiseError> {
    let captures = expiry_pattern()
        .captures(expiry.trim())
        .ok_or(CruiseError::InvalidCardExpiry)?;

    let month: u32 = captures[1]
        .parse()
        .map_err(|_| CruiseError::InvalidCardExpiry)?;
    let two_digit: i32 = captures[2]
        .parse()
        .map_err(|_| CruiseError::InvalidCardExpiry)?;

    let year = expiry_year(two_digit, now.year());
    let expires_at = end_of_month(year, month).ok_or(CruiseError::InvalidCardExpiry)?;

    if expires_at < now {
        return Err(CruiseError::CardExpired(format!("{:02}/{}", month, year)));
    }
    Ok(expires_at)
}
