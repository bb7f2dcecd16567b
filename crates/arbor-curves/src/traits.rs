//! Core traits for curve queries.
//!
//! Every finalized curve in this crate implements [`Curve`]. Times are year
//! fractions from the curve's reference date on an ACT/365F basis, so a curve
//! and the instruments priced off it agree on where a date sits without
//! sharing a day-count object.

use arbor_core::types::Compounding;
use arbor_core::Date;

use crate::error::CurveResult;

/// Days per year used to turn dates into curve times.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Curve time of `date` measured from `reference`.
#[must_use]
pub fn time_between(reference: Date, date: Date) -> f64 {
    (date - reference) as f64 / DAYS_PER_YEAR
}

/// Trait for curves.
///
/// [`value`](Curve::value) is the curve's native quantity: a discount factor
/// for rate curves, an outright forward for FX curves, an index ratio for
/// inflation curves and a forward price for commodity curves.
/// [`discount_factor`](Curve::discount_factor) is only defined for curves
/// that discount.
pub trait Curve: Send + Sync {
    /// Returns the curve's reference (valuation) date.
    fn reference_date(&self) -> Date;

    /// Returns the curve's native value at time `t`.
    fn value(&self, t: f64) -> CurveResult<f64>;

    /// Returns the discount factor from the reference date to time `t`.
    ///
    /// # Errors
    ///
    /// Fails for curves whose values are not discount factors.
    fn discount_factor(&self, t: f64) -> CurveResult<f64>;

    /// Year fraction from the reference date to `date`.
    fn year_fraction(&self, date: Date) -> f64 {
        time_between(self.reference_date(), date)
    }

    /// Native value at a date.
    fn value_at(&self, date: Date) -> CurveResult<f64> {
        self.value(self.year_fraction(date))
    }

    /// Discount factor at a date.
    fn discount_factor_at(&self, date: Date) -> CurveResult<f64> {
        self.discount_factor(self.year_fraction(date))
    }

    /// Zero rate at time `t` under `compounding`.
    fn zero_rate(&self, t: f64, compounding: Compounding) -> CurveResult<f64> {
        let df = self.discount_factor(t)?;
        Ok(compounding.zero_rate(df, t))
    }

    /// Simply-compounded forward rate between `t1` and `t2`.
    ///
    /// `F(t1, t2) = (DF(t1) / DF(t2) - 1) / (t2 - t1)`
    fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Ok(0.0);
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok((df1 / df2 - 1.0) / (t2 - t1))
    }
}

/// Simple forward between two dates with accrual `tau`.
pub(crate) fn simple_forward(curve: &dyn Curve, start: Date, end: Date, tau: f64) -> CurveResult<f64> {
    let df_start = curve.discount_factor_at(start)?;
    let df_end = curve.discount_factor_at(end)?;
    Ok((df_start / df_end - 1.0) / tau)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FlatCurve {
        date: Date,
        rate: f64,
    }

    impl Curve for FlatCurve {
        fn reference_date(&self) -> Date {
            self.date
        }

        fn value(&self, t: f64) -> CurveResult<f64> {
            self.discount_factor(t)
        }

        fn discount_factor(&self, t: f64) -> CurveResult<f64> {
            Ok((-self.rate * t).exp())
        }
    }

    #[test]
    fn test_default_methods() {
        let date = Date::from_ymd(2024, 1, 2).unwrap();
        let curve = FlatCurve { date, rate: 0.05 };

        assert_relative_eq!(curve.year_fraction(date.add_days(365)), 1.0);
        assert_relative_eq!(
            curve.zero_rate(2.0, Compounding::Continuous).unwrap(),
            0.05,
            epsilon = 1e-12
        );
        let fwd = curve.forward_rate(1.0, 2.0).unwrap();
        assert_relative_eq!(fwd, 0.05_f64.exp() - 1.0, epsilon = 1e-12);
        assert_eq!(curve.forward_rate(2.0, 1.0).unwrap(), 0.0);
    }
}
