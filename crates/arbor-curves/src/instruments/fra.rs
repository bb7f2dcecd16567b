//! Forward rate agreement.

use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::Date;

use super::{
    check_period, money_market_closed_form, money_market_pv, InstrumentConventions, InstrumentKind,
    PriceableInstrument,
};
use crate::error::CurveResult;
use crate::traits::Curve;

/// A forward rate agreement on a single accrual period.
///
/// PV is `DF(start) - DF(end) × (1 + rate × τ)`, so the pillar sits at the
/// end date.
#[derive(Debug, Clone, PartialEq)]
pub struct Fra {
    id: String,
    start_date: Date,
    end_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl Fra {
    /// Creates a FRA accruing ACT/360.
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

    /// Year fraction of the FRA period.
    #[must_use]
    pub fn accrual(&self) -> f64 {
        self.day_count.year_fraction(self.start_date, self.end_date)
    }
}

impl PriceableInstrument for Fra {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::Fra
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
    fn test_fra_prices_forward() {
        let base = date(2024, 1, 2);
        let curve = FlatRateCurve { date: base, rate: 0.03 };
        let (start, end) = (date(2024, 4, 2), date(2024, 7, 2));
        let fra = Fra::new("EUR-Fra-3M-6M", start, end, 0.0).unwrap();
        let fwd = (curve.discount_factor_at(start).unwrap() / curve.discount_factor_at(end).unwrap()
            - 1.0)
            / fra.accrual();

        let at_market = Fra::new("EUR-Fra-3M-6M", start, end, fwd).unwrap();
        assert_relative_eq!(at_market.present_value(&curve).unwrap(), 0.0, epsilon = 1e-14);
        assert!(fra.present_value(&curve).unwrap() > 0.0);
    }
}
