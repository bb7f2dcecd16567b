//! Business day calendars and conventions.
//!
//! The curve engine only needs two things from a calendar: whether a date is
//! a business day, and how to roll a date that is not. Holiday data is
//! supplied by the caller through [`HolidayCalendar`]; [`JointCalendar`]
//! combines several calendars so that a holiday in any of them is a holiday.

use std::sync::Arc;

mod conventions;
mod holiday;

pub use conventions::BusinessDayConvention;
pub use holiday::HolidayCalendar;

use crate::types::Date;

/// Trait for business day calendars.
pub trait Calendar: Send + Sync {
    /// Returns the name of the calendar.
    fn name(&self) -> &str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is a holiday or weekend.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        conventions::adjust(date, convention, self)
    }

    /// Advances a date by a number of business days.
    ///
    /// Negative values move backward. Zero returns the date unchanged even
    /// if it is not a business day.
    fn add_business_days(&self, date: Date, days: i32) -> Date {
        let mut result = date;
        let mut remaining = days.abs();
        let direction: i64 = if days >= 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction);
            if self.is_business_day(result) {
                remaining -= 1;
            }
        }

        result
    }

    /// Returns the next business day strictly after the given date.
    fn next_business_day(&self, date: Date) -> Date {
        self.add_business_days(date, 1)
    }
}

/// A weekend-only calendar (no holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

/// Calendar that combines multiple calendars (joint holidays).
///
/// A date is a business day only if every member calendar says so.
#[derive(Clone)]
pub struct JointCalendar {
    calendars: Vec<Arc<dyn Calendar>>,
    name: String,
}

impl JointCalendar {
    /// Creates a joint calendar from shared member calendars.
    pub fn new(calendars: Vec<Arc<dyn Calendar>>) -> Self {
        let name = calendars
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>()
            .join("+");

        Self { calendars, name }
    }

    /// Number of member calendars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    /// True when no member calendars were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}

impl std::fmt::Debug for JointCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JointCalendar").field("name", &self.name).finish()
    }
}

impl Calendar for JointCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend() && self.calendars.iter().all(|cal| cal.is_business_day(date))
    }
}
