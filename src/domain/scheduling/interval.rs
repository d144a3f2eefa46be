//! Half-open time intervals and the overlap predicate.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Returns true if `[new_start, new_end)` overlaps `[existing_start, existing_end)`.
///
/// Intervals are half-open: one that ends exactly when the other starts
/// does not overlap it.
pub fn overlaps<T: PartialOrd>(existing_start: T, existing_end: T, new_start: T, new_end: T) -> bool {
    new_start < existing_end && new_end > existing_start
}

/// A dated `[start, end)` interval that never crosses midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Builds the slot starting at `start` and lasting `duration_minutes`.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if the duration is zero
    /// - `InvalidFormat` if the session would run past midnight
    pub fn new(date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> Result<Self, ValidationError> {
        if duration_minutes == 0 {
            return Err(ValidationError::out_of_range(
                "duration_minutes",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
        if wrapped != 0 {
            return Err(ValidationError::invalid_format(
                "duration_minutes",
                "session must end on the day it starts",
            ));
        }
        Ok(Self { date, start, end })
    }

    /// Rebuilds a slot from stored bounds.
    pub fn from_bounds(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { date, start, end }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Same date and overlapping times.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.date == other.date && overlaps(other.start, other.end, self.start, self.end)
    }
}
