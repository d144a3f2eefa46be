//! Clock adapters.

use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. For tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock reading 09:00 UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let at = date.and_hms_opt(9, 0, 0).unwrap_or_default();
        Self::new(Timestamp::from_datetime(Utc.from_utc_datetime(&at)))
    }

    /// Moves the clock to 09:00 UTC on `date`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_date(&self, date: NaiveDate) {
        let at = date.and_hms_opt(9, 0, 0).unwrap_or_default();
        *self.now.lock().expect("FixedClock: lock poisoned") =
            Timestamp::from_datetime(Utc.from_utc_datetime(&at));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("FixedClock: lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);

        let later = NaiveDate::from_ymd_opt(2026, 11, 5).unwrap();
        clock.set_date(later);
        assert_eq!(clock.today(), later);
    }

    #[test]
    fn system_clock_is_close_to_now() {
        assert_eq!(SystemClock.today(), Utc::now().date_naive());
    }
}
