//! Day count conventions.
//!
//! | Convention | Year fraction |
//! |------------|---------------|
//! | ACT/360    | actual days / 360 |
//! | ACT/365F   | actual days / 365 |
//! | 30/360     | US bond basis (30-day months) / 360 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Date;

/// Day count convention used for accrual periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// Actual/360 (money markets).
    Act360,
    /// Actual/365 Fixed.
    #[default]
    Act365Fixed,
    /// 30/360 US bond basis.
    Thirty360,
}

impl DayCountConvention {
    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Act360 => "ACT/360",
            Self::Act365Fixed => "ACT/365F",
            Self::Thirty360 => "30/360",
        }
    }

    /// Day count between two dates under this convention.
    #[must_use]
    pub fn day_count(&self, start: Date, end: Date) -> i64 {
        match self {
            Self::Act360 | Self::Act365Fixed => start.days_between(&end),
            Self::Thirty360 => {
                let mut d1 = i64::from(start.day());
                let mut d2 = i64::from(end.day());
                if d1 == 31 {
                    d1 = 30;
                }
                if d2 == 31 && d1 == 30 {
                    d2 = 30;
                }
                360 * i64::from(end.year() - start.year())
                    + 30 * (i64::from(end.month()) - i64::from(start.month()))
                    + (d2 - d1)
            }
        }
    }

    /// Year fraction between two dates (negative when `end` precedes `start`).
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let days = self.day_count(start, end) as f64;
        match self {
            Self::Act360 | Self::Thirty360 => days / 360.0,
            Self::Act365Fixed => days / 365.0,
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(' ', "").as_str() {
            "ACT/360" | "ACTUAL/360" | "ACT360" => Ok(Self::Act360),
            "ACT/365" | "ACT/365F" | "ACT/365.FIXED" | "ACTUAL/365" | "ACT365F" => {
                Ok(Self::Act365Fixed)
            }
            "30/360" | "THIRTY360" => Ok(Self::Thirty360),
            _ => Err(CoreError::unknown_convention("day count", s)),
        }
    }
}
