//! Time and timestamp helpers.

use chrono::{DateTime, NaiveTime, Timelike, Utc};

/// UTC timestamp used for `last_fired`.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current UTC wall-clock time truncated to the minute.
#[must_use]
pub fn time_of_day() -> NaiveTime {
    let now = Utc::now().time();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
