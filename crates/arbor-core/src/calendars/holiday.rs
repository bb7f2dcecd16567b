//! Calendar backed by an explicit holiday list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Calendar;
use crate::types::Date;

/// Weekends plus a caller-supplied set of holidays.
///
/// ```rust
/// use arbor_core::calendars::{Calendar, HolidayCalendar};
/// use arbor_core::types::Date;
///
/// let anzac = Date::from_ymd(2024, 4, 25).unwrap();
/// let cal = HolidayCalendar::new("AUSY", [anzac]);
/// assert!(!cal.is_business_day(anzac));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    name: String,
    holidays: BTreeSet<Date>,
}

impl HolidayCalendar {
    /// Creates a calendar from a name and its holidays.
    pub fn new(name: impl Into<String>, holidays: impl IntoIterator<Item = Date>) -> Self {
        Self {
            name: name.into(),
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Adds a holiday.
    #[must_use]
    pub fn with_holiday(mut self, date: Date) -> Self {
        self.holidays.insert(date);
        self
    }

    /// The holidays, in date order.
    pub fn holidays(&self) -> impl Iterator<Item = &Date> {
        self.holidays.iter()
    }
}

impl Calendar for HolidayCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend() && !self.holidays.contains(&date)
    }
}
