use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, Weekday};

const PICKUP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

const RECORD_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Instant in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    pub fn from_unix_timestamp(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds).ok().map(Self)
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn unix_timestamp(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }

    /// ISO-8601 with millisecond precision and a literal `Z`, the format
    /// the courier API expects for pickup dates.
    pub fn format_millis(self) -> String {
        self.0
            .format(PICKUP_FORMAT)
            .unwrap_or_else(|_| self.format_rfc3339())
    }

    /// `YYYY-MM-DD HH:MM:SS`, used for the stored creation timestamp.
    pub fn format_record(self) -> String {
        self.0
            .format(RECORD_FORMAT)
            .unwrap_or_else(|_| self.format_rfc3339())
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn plus_days(self, days: i64) -> Self {
        Self(self.0.saturating_add(Duration::days(days)))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

/// Pickup instant: `offset_days` after `now`, pushed past Saturday and
/// Sunday when `skip_weekends` is set. The time of day is kept.
pub fn pickup_date(now: UtcDateTime, offset_days: u32, skip_weekends: bool) -> UtcDateTime {
    let mut date = now.plus_days(i64::from(offset_days));
    if skip_weekends {
        while matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            date = date.plus_days(1);
        }
    }
    date
}
