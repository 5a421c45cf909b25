//! Business-timezone time helpers
//!
//! All date → timestamp conversion happens at the orchestration layer;
//! repositories only ever see `i64` Unix millis or `YYYY-MM-DD` strings.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use shared::error::{ErrorCode, PosError, PosResult};

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> PosResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        PosError::validation(
            ErrorCode::InvalidDate,
            format!("invalid date format: {date}"),
        )
    })
}

/// Reject dates past today in the business timezone.
pub fn validate_not_future(date: NaiveDate, tz: Tz) -> PosResult<()> {
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    if date > today {
        return Err(PosError::validation(
            ErrorCode::InvalidDate,
            format!("date {date} is in the future (today is {today})"),
        ));
    }
    Ok(())
}

/// Date + time of day → Unix millis in the business timezone.
///
/// DST gap fallback: if the local time does not exist (spring-forward),
/// fall back to interpreting it as UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of the business day for `date`: `date` at the cutoff time.
pub fn day_start_millis(date: NaiveDate, cutoff: NaiveTime, tz: Tz) -> i64 {
    date_time_to_millis(date, cutoff, tz)
}

/// Exclusive end of the business day for `date`: the next day at the
/// cutoff time. Callers use `< end` semantics.
pub fn day_end_millis(date: NaiveDate, cutoff: NaiveTime, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_time_to_millis(next_day, cutoff, tz)
}

/// Parse a `HH:MM` cutoff string; malformed input falls back to midnight.
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!("failed to parse business day cutoff '{cutoff}': {e}, falling back to 00:00");
        NaiveTime::MIN
    })
}

/// The business date that "now" belongs to.
///
/// Before the cutoff the venue is still trading on yesterday's date;
/// at or after the cutoff the business date is today.
pub fn current_business_date(cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let now = chrono::Utc::now().with_timezone(&tz);
    if now.time() < cutoff {
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}
