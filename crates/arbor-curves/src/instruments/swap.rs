//! Fixed/float interest rate swap, single-curve.

use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::types::Frequency;
use arbor_core::Date;

use super::{annuity, schedule, InstrumentConventions, InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::Curve;

/// A fixed-for-floating swap whose float leg is projected and discounted on
/// the same curve.
///
/// With one curve the float leg telescopes to `DF(start) - DF(end)`, so
///
/// ```text
/// PV = rate × Σ τ_i DF(t_i) - (DF(start) - DF(end))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    id: String,
    start_date: Date,
    maturity: Date,
    fixed_rate: f64,
    fixed_frequency: Frequency,
    fixed_day_count: DayCountConvention,
    fixed_dates: Vec<Date>,
}

impl Swap {
    /// Creates a swap with a 30/360 fixed leg.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        maturity: Date,
        fixed_rate: f64,
        fixed_frequency: Frequency,
    ) -> CurveResult<Self> {
        Ok(Self {
            id: id.into(),
            start_date,
            maturity,
            fixed_rate,
            fixed_frequency,
            fixed_day_count: DayCountConvention::Thirty360,
            fixed_dates: schedule(start_date, maturity, fixed_frequency)?,
        })
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.fixed_day_count = day_count;
        self
    }

    /// Returns the fixed leg frequency.
    #[must_use]
    pub fn fixed_frequency(&self) -> Frequency {
        self.fixed_frequency
    }

    /// Fixed leg annuity `Σ τ_i DF(t_i)`.
    pub fn annuity(&self, curve: &dyn Curve) -> CurveResult<f64> {
        annuity(curve, self.start_date, &self.fixed_dates, self.fixed_day_count)
    }

    /// The fixed rate that prices the swap at par on `curve`.
    pub fn par_rate(&self, curve: &dyn Curve) -> CurveResult<f64> {
        let float = curve.discount_factor_at(self.start_date)? - curve.discount_factor_at(self.maturity)?;
        Ok(float / self.annuity(curve)?)
    }

    pub(crate) fn pv_at_rate(&self, curve: &dyn Curve, rate: f64) -> CurveResult<f64> {
        let float = curve.discount_factor_at(self.start_date)? - curve.discount_factor_at(self.maturity)?;
        Ok(rate * self.annuity(curve)? - float)
    }
}

impl PriceableInstrument for Swap {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Swap
    }

    fn risk_maturity_date(&self) -> Date {
        self.maturity
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        self.fixed_dates.clone()
    }

    fn market_quote(&self) -> f64 {
        self.fixed_rate
    }

    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument> {
        Arc::new(Self {
            fixed_rate: quote,
            ..self.clone()
        })
    }

    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64> {
        self.pv_at_rate(curve, self.fixed_rate)
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            frequency: Some(self.fixed_frequency),
            day_count: Some(self.fixed_day_count),
            ..InstrumentConventions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{date, FlatRateCurve};
    use approx::assert_relative_eq;

    #[test]
    fn test_par_rate_zeroes_pv() {
        let base = date(2024, 1, 2);
        let curve = FlatRateCurve { date: base, rate: 0.035 };
        let swap = Swap::new("USD-IRSwap-5Y", base, date(2029, 1, 2), 0.0, Frequency::Annual).unwrap();
        let par = swap.par_rate(&curve).unwrap();
        assert!(par > 0.03 && par < 0.04);

        let at_par = swap.with_quote(par);
        assert_relative_eq!(at_par.present_value(&curve).unwrap(), 0.0, epsilon = 1e-14);
        assert_eq!(at_par.cash_flow_dates().len(), 5);
    }
}
