//! Periods and market tenors.
//!
//! A [`Period`] is a pure length (`3M`, `10Y`, `2W`). A [`Tenor`] adds the
//! money-market labels whose start date is not the spot date (`ON`, `TN`,
//! `SN`, `SP`). Curve builders resolve tenors to concrete dates with a calendar.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Unit of a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven calendar days.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        }
    }
}

/// A length of time such as `3M` or `10Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    length: i32,
    unit: TimeUnit,
}

impl Period {
    /// Creates a period.
    #[must_use]
    pub const fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// Convenience constructor for `n` days.
    #[must_use]
    pub const fn days(n: i32) -> Self {
        Self::new(n, TimeUnit::Days)
    }

    /// Convenience constructor for `n` months.
    #[must_use]
    pub const fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// Convenience constructor for `n` years.
    #[must_use]
    pub const fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }

    /// Number of units.
    #[must_use]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// The unit.
    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Approximate length in years: days/365, weeks·7/365, months/12, years.
    ///
    /// Used as the coordinate of expiry and tenor axes, where only the
    /// ordering and relative spacing of labels matter.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        let n = f64::from(self.length);
        match self.unit {
            TimeUnit::Days => n / 365.0,
            TimeUnit::Weeks => n * 7.0 / 365.0,
            TimeUnit::Months => n / 12.0,
            TimeUnit::Years => n,
        }
    }

    /// Total number of months, when the period is month-based.
    #[must_use]
    pub fn total_months(&self) -> Option<i32> {
        match self.unit {
            TimeUnit::Months => Some(self.length),
            TimeUnit::Years => Some(self.length * 12),
            _ => None,
        }
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_uppercase();
        let suffix = text
            .chars()
            .last()
            .ok_or_else(|| CoreError::invalid_period(s, "expected <number><D|W|M|Y>"))?;
        let digits = &text[..text.len() - suffix.len_utf8()];
        let unit = match suffix {
            'D' => TimeUnit::Days,
            'W' => TimeUnit::Weeks,
            'M' => TimeUnit::Months,
            'Y' => TimeUnit::Years,
            _ => return Err(CoreError::invalid_period(s, "unknown unit")),
        };
        let length = digits
            .parse::<i32>()
            .map_err(|_| CoreError::invalid_period(s, "length is not an integer"))?;
        Ok(Self { length, unit })
    }
}

impl TryFrom<String> for Period {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

/// A quoted market tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tenor {
    /// Overnight: trade date to the next business day.
    Overnight,
    /// Tom-next: one business day after trade to the following business day.
    TomNext,
    /// Spot-next: spot date to the next business day.
    SpotNext,
    /// The spot date itself.
    Spot,
    /// A term period measured from spot.
    Term(Period),
}

impl Tenor {
    /// Returns the period for term tenors.
    #[must_use]
    pub fn period(&self) -> Option<Period> {
        match self {
            Tenor::Term(p) => Some(*p),
            _ => None,
        }
    }

    /// True for tenors that settle before the spot date.
    #[must_use]
    pub fn is_pre_spot(&self) -> bool {
        matches!(self, Tenor::Overnight | Tenor::TomNext)
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ON" | "O/N" => Ok(Tenor::Overnight),
            "TN" | "T/N" => Ok(Tenor::TomNext),
            "SN" | "S/N" => Ok(Tenor::SpotNext),
            "SP" | "SPOT" => Ok(Tenor::Spot),
            _ => s.parse().map(Tenor::Term),
        }
    }
}

impl TryFrom<String> for Tenor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(t: Tenor) -> Self {
        t.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Overnight => write!(f, "ON"),
            Tenor::TomNext => write!(f, "TN"),
            Tenor::SpotNext => write!(f, "SN"),
            Tenor::Spot => write!(f, "SP"),
            Tenor::Term(p) => write!(f, "{p}"),
        }
    }
}

/// Parses a period, reporting the field name on failure.
pub fn parse_period(field: &str, value: &str) -> CoreResult<Period> {
    value
        .parse()
        .map_err(|_| CoreError::invalid_period(value, format!("{field} is not a period")))
}
