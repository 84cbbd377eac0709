//! Reference clock used to decide which semesters are open for enrollment.
//!
//! The aggregator never reads ambient system time directly; it is handed a
//! [`Clock`] at construction so tests can pin "today" to a fixed date.

use chrono::{NaiveDate, Utc};

use crate::error::EngineError;
use crate::semester::SemesterCode;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Semester in session on [`Clock::today`].
    fn current_semester(&self) -> Result<SemesterCode, EngineError> {
        SemesterCode::containing(self.today())
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_fixed_clock_current_semester() {
        // ---
        let clock = FixedClock(NaiveDate::from_ymd_opt(2025, 10, 19).unwrap());
        assert_eq!(clock.current_semester().unwrap().get(), 1257);
    }
}
