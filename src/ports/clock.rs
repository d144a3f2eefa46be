//! Clock port.

use crate::domain::foundation::Timestamp;
use chrono::NaiveDate;

/// Source of the current time and date.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Today's calendar date. No time zone handling: the date of `now`.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
