use chrono::{DateTime, Datelike, Days, FixedOffset, IsoWeek, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Day-granularity calendar for one campus.
///
/// Group arrival/departure instants are normalised to calendar days in a single
/// fixed UTC offset, so two instants on the same local day always map to the
/// same `NaiveDate` regardless of their time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    /// Calendar that normalises instants in UTC.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar with a fixed offset east of UTC, in minutes.
    ///
    /// Returns `None` when the offset is outside ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Strip the time-of-day of an instant, in this calendar's offset.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// ISO-8601 week (Monday start, week 1 contains the year's first Thursday).
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    date.iso_week()
}

/// Inclusive range of calendar days.
///
/// An inverted range (`end < start`) is empty rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range (0 when inverted).
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Iterate the days of the range in chronological order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let first = if self.is_empty() { None } else { Some(self.start) };
        std::iter::successors(first, move |day| {
            day.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }

    /// Grow the range by `days` on both sides.
    pub fn padded(&self, days: u32) -> Self {
        let pad = Days::new(u64::from(days));
        Self {
            start: self.start.checked_sub_days(pad).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_add_days(pad).unwrap_or(NaiveDate::MAX),
        }
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
