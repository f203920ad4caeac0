//! Common types

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Closed time interval covering one calendar day in a given offset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// `[start-of-day, end-of-day]` for `date` at `offset`
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_start = date.and_time(NaiveTime::MIN);
        // A fixed offset maps every local time to exactly one instant
        let start = offset
            .from_local_datetime(&local_start)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local_start));
        let end = start + Duration::days(1) - Duration::nanoseconds(1);
        Self { date, start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
