//! Local calendar windows expressed as UTC instants.
//!
//! All functions take `now` and the caller's time zone explicitly; there is no hidden clock.
//! Dates at the edge of the representable calendar yield [`ValidationError::DateOutOfRange`]
//! instead of overflowing.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

use crate::types::{ValidationError, Window};

/// Step used to walk out of a DST gap.
const GAP_STEP_MINUTES: i64 = 15;
/// Longest gap we are prepared to walk (a full day covers every real zone).
const GAP_MAX_STEPS: i64 = 24 * 60 / GAP_STEP_MINUTES;

/// Converts a local wall-clock time to UTC.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that do not exist
/// (DST spring-forward) resolve to the first existing local time after them.
pub fn resolve_local<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => (1..=GAP_MAX_STEPS)
            .find_map(|step| {
                let later = local.checked_add_signed(Duration::minutes(step * GAP_STEP_MINUTES))?;
                tz.from_local_datetime(&later).earliest()
            })
            .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc)),
    }
}

/// The local calendar date of `now` in `tz`.
pub fn local_date<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

fn local_midnight_to_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN), tz)
}

fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, ValidationError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or(ValidationError::DateOutOfRange { date })
}

/// `days` local days starting at midnight of `first`.
pub(crate) fn days_window<Tz: TimeZone>(
    first: NaiveDate,
    days: i64,
    tz: &Tz,
) -> Result<Window, ValidationError> {
    let after = shift_days(first, days)?;
    Window::new(local_midnight_to_utc(first, tz), local_midnight_to_utc(after, tz))
}

fn monday_of(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    shift_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

/// Local midnight today to local midnight tomorrow.
pub fn day_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Result<Window, ValidationError> {
    days_window(local_date(now, tz), 1, tz)
}

/// Local midnight yesterday to local midnight today.
pub fn last_day_window<Tz: TimeZone>(
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Window, ValidationError> {
    days_window(shift_days(local_date(now, tz), -1)?, 1, tz)
}

/// Monday 00:00 local through the following Monday 00:00.
///
/// Weeks start on Monday; a local Sunday belongs to the week that began six days earlier.
pub fn week_window<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Result<Window, ValidationError> {
    days_window(monday_of(local_date(now, tz))?, 7, tz)
}

/// The week before [`week_window`].
pub fn last_week_window<Tz: TimeZone>(
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Window, ValidationError> {
    days_window(shift_days(monday_of(local_date(now, tz))?, -7)?, 7, tz)
}

/// Local midnight of `from` to local midnight after `to` (both dates inclusive).
pub fn date_range_window<Tz: TimeZone>(
    from: NaiveDate,
    to: NaiveDate,
    tz: &Tz,
) -> Result<Window, ValidationError> {
    if to < from {
        return Err(ValidationError::InvalidDateRange { from, to });
    }
    let days = (to - from).num_days() + 1;
    days_window(from, days, tz)
}
