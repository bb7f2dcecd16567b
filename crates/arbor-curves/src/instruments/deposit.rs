//! Money market deposit.

use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::Date;

use super::{
    check_period, money_market_closed_form, money_market_pv, InstrumentConventions, InstrumentKind,
    PriceableInstrument,
};
use crate::error::CurveResult;
use crate::traits::Curve;

/// A money market deposit.
///
/// # Pricing Formula
///
/// The present value is zero when:
/// ```text
/// DF(end) = DF(start) / (1 + rate × τ)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    id: String,
    start_date: Date,
    end_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl Deposit {
    /// Creates a deposit accruing ACT/360.
    pub fn new(id: impl Into<String>, start_date: Date, end_date: Date, rate: f64) -> CurveResult<Self> {
        let id = id.into();
        check_period(&id, start_date, end_date)?;
        Ok(Self {
            id,
            start_date,
            end_date,
            rate,
            day_count: DayCountConvention::Act360,
        })
    }

    /// Sets the day count convention.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Returns the start date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the deposit rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Year fraction of the deposit period.
    #[must_use]
    pub fn accrual(&self) -> f64 {
        self.day_count.year_fraction(self.start_date, self.end_date)
    }
}

impl PriceableInstrument for Deposit {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Deposit
    }

    fn risk_maturity_date(&self) -> Date {
        self.end_date
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.start_date, self.end_date]
    }

    fn market_quote(&self) -> f64 {
        self.rate
    }

    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument> {
        Arc::new(Self {
            rate: quote,
            ..self.clone()
        })
    }

    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64> {
        money_market_pv(curve, self.start_date, self.end_date, self.rate, self.accrual())
    }

    fn closed_form_value(&self, curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(money_market_closed_form(curve, self.start_date, self.rate, self.accrual()))
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            day_count: Some(self.day_count),
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
    fn test_pv_zero_at_implied_rate() {
        let start = date(2024, 1, 2);
        let end = date(2024, 4, 2);
        let curve = FlatRateCurve { date: start, rate: 0.04 };
        let tau = f64::from(91) / 360.0;
        let implied = ((0.04 * 91.0 / 365.0_f64).exp() - 1.0) / tau;

        let deposit = Deposit::new("USD-Deposit-3M", start, end, implied).unwrap();
        assert_relative_eq!(deposit.present_value(&curve).unwrap(), 0.0, epsilon = 1e-14);

        let df = deposit.closed_form_value(&curve).unwrap().unwrap();
        assert_relative_eq!(df, curve.discount_factor_at(end).unwrap(), epsilon = 1e-14);
    }

    #[test]
    fn test_with_quote_keeps_dates() {
        let deposit = Deposit::new("D", date(2024, 1, 2), date(2024, 2, 2), 0.05).unwrap();
        let bumped = deposit.with_quote(0.051);
        assert_eq!(bumped.market_quote(), 0.051);
        assert_eq!(bumped.risk_maturity_date(), date(2024, 2, 2));
        assert_eq!(bumped.id(), "D");
    }

    #[test]
    fn test_rejects_inverted_dates() {
        assert!(Deposit::new("D", date(2024, 2, 2), date(2024, 1, 2), 0.05).is_err());
    }
}
