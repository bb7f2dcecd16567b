//! Business day adjustment conventions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Calendar;
use crate::error::CoreError;
use crate::types::Date;

/// How to roll a date that falls on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BusinessDayConvention {
    /// Use the date as-is.
    Unadjusted,

    /// Move to the following business day.
    Following,

    /// Following, unless that crosses a month boundary, then preceding.
    #[default]
    ModifiedFollowing,

    /// Move to the preceding business day.
    Preceding,

    /// Preceding, unless that crosses a month boundary, then following.
    ModifiedPreceding,
}

impl FromStr for BusinessDayConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace([' ', '_', '-'], "").as_str() {
            "NONE" | "UNADJUSTED" => Ok(Self::Unadjusted),
            "F" | "FOLLOWING" => Ok(Self::Following),
            "MF" | "MODFOLLOWING" | "MODIFIEDFOLLOWING" => Ok(Self::ModifiedFollowing),
            "P" | "PRECEDING" => Ok(Self::Preceding),
            "MP" | "MODPRECEDING" | "MODIFIEDPRECEDING" => Ok(Self::ModifiedPreceding),
            _ => Err(CoreError::unknown_convention("business day convention", s)),
        }
    }
}

/// Adjusts a date according to the given business day convention.
pub fn adjust<C: Calendar + ?Sized>(
    date: Date,
    convention: BusinessDayConvention,
    calendar: &C,
) -> Date {
    if calendar.is_business_day(date) {
        return date;
    }

    match convention {
        BusinessDayConvention::Unadjusted => date,
        BusinessDayConvention::Following => following(date, calendar),
        BusinessDayConvention::ModifiedFollowing => {
            let adjusted = following(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                preceding(date, calendar)
            }
        }
        BusinessDayConvention::Preceding => preceding(date, calendar),
        BusinessDayConvention::ModifiedPreceding => {
            let adjusted = preceding(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                following(date, calendar)
            }
        }
    }
}

fn following<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(1);
    }
    date
}

fn preceding<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(-1);
    }
    date
}
