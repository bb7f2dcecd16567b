//! Payment frequency and compounding conventions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Payment frequency of a swap leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Annual payments (1 per year)
    Annual,
    /// Semi-annual payments (2 per year)
    #[default]
    SemiAnnual,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Monthly payments (12 per year)
    Monthly,
    /// Single payment at maturity
    Zero,
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::Zero => 0,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Annual => 12,
            Frequency::SemiAnnual => 6,
            Frequency::Quarterly => 3,
            Frequency::Monthly => 1,
            Frequency::Zero => 0,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::Zero => "Zero Coupon",
        };
        write!(f, "{name}")
    }
}

/// Interest compounding convention used to quote zero rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Compounding {
    /// Simple interest (no compounding)
    Simple,
    /// Annual compounding (1x per year)
    Annual,
    /// Semi-annual compounding (2x per year)
    SemiAnnual,
    /// Quarterly compounding (4x per year)
    Quarterly,
    /// Monthly compounding (12x per year)
    Monthly,
    /// Daily compounding (365x per year)
    Daily,
    /// Continuous compounding
    #[default]
    Continuous,
}

impl Compounding {
    /// Periods per year for discrete compounding, `None` for simple and continuous.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Compounding::Simple | Compounding::Continuous => None,
            Compounding::Annual => Some(1),
            Compounding::SemiAnnual => Some(2),
            Compounding::Quarterly => Some(4),
            Compounding::Monthly => Some(12),
            Compounding::Daily => Some(365),
        }
    }

    /// Discount factor for `rate` over `t` years.
    #[must_use]
    pub fn discount_factor(&self, rate: f64, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        match self {
            Compounding::Continuous => (-rate * t).exp(),
            Compounding::Simple => 1.0 / (1.0 + rate * t),
            _ => {
                let n = f64::from(self.periods_per_year().unwrap_or(1));
                (1.0 + rate / n).powf(-n * t)
            }
        }
    }

    /// Zero rate equivalent to discount factor `df` over `t` years.
    ///
    /// Returns 0 for `t <= 0`.
    #[must_use]
    pub fn zero_rate(&self, df: f64, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        match self {
            Compounding::Continuous => -df.ln() / t,
            Compounding::Simple => (1.0 / df - 1.0) / t,
            _ => {
                let n = f64::from(self.periods_per_year().unwrap_or(1));
                n * (df.powf(-1.0 / (n * t)) - 1.0)
            }
        }
    }
}

impl FromStr for Compounding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "simple" => Ok(Compounding::Simple),
            "annual" | "1" => Ok(Compounding::Annual),
            "semiannual" | "2" => Ok(Compounding::SemiAnnual),
            "quarterly" | "4" => Ok(Compounding::Quarterly),
            "monthly" | "12" => Ok(Compounding::Monthly),
            "daily" | "365" => Ok(Compounding::Daily),
            "continuous" => Ok(Compounding::Continuous),
            _ => Err(CoreError::unknown_convention("compounding", s)),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Simple => "Simple",
            Compounding::Annual => "Annual",
            Compounding::SemiAnnual => "Semi-Annual",
            Compounding::Quarterly => "Quarterly",
            Compounding::Monthly => "Monthly",
            Compounding::Daily => "Daily",
            Compounding::Continuous => "Continuous",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::Quarterly.periods_per_year(), 4);
        assert_eq!(Frequency::SemiAnnual.months_per_period(), 6);
        assert_eq!(Frequency::Zero.months_per_period(), 0);
    }

    #[test]
    fn test_discount_factor_semi_annual() {
        let df = Compounding::SemiAnnual.discount_factor(0.05, 1.0);
        assert_relative_eq!(df, 1.025_f64.powf(-2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_roundtrip_all_compounding() {
        for c in [
            Compounding::Continuous,
            Compounding::Simple,
            Compounding::Annual,
            Compounding::SemiAnnual,
            Compounding::Quarterly,
            Compounding::Monthly,
            Compounding::Daily,
        ] {
            let df = c.discount_factor(0.042, 3.5);
            assert_relative_eq!(c.zero_rate(df, 3.5), 0.042, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_time() {
        assert_eq!(Compounding::Annual.discount_factor(0.05, 0.0), 1.0);
        assert_eq!(Compounding::Annual.zero_rate(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Semi-Annual".parse::<Compounding>().unwrap(), Compounding::SemiAnnual);
        assert_eq!("continuous".parse::<Compounding>().unwrap(), Compounding::Continuous);
        assert!("weekly".parse::<Compounding>().is_err());
    }
}
