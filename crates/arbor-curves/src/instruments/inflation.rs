//! Zero-coupon inflation swap.

use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::Date;

use super::{check_period, InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::Curve;

/// Zero-coupon inflation swap on an index-ratio curve.
///
/// ```text
/// PV = I(T) / I(0) - (1 + k)^τ
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCouponInflationSwap {
    id: String,
    start_date: Date,
    maturity: Date,
    fixed_rate: f64,
    day_count: DayCountConvention,
}

impl ZeroCouponInflationSwap {
    /// Creates a swap accruing ACT/365F.
    pub fn new(id: impl Into<String>, start_date: Date, maturity: Date, fixed_rate: f64) -> CurveResult<Self> {
        let id = id.into();
        check_period(&id, start_date, maturity)?;
        Ok(Self {
            id,
            start_date,
            maturity,
            fixed_rate,
            day_count: DayCountConvention::Act365Fixed,
        })
    }

    /// The fixed leg's compounded growth `(1 + k)^τ`.
    #[must_use]
    pub fn fixed_growth(&self) -> f64 {
        let tau = self.day_count.year_fraction(self.start_date, self.maturity);
        (1.0 + self.fixed_rate).powf(tau)
    }
}

impl PriceableInstrument for ZeroCouponInflationSwap {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::ZeroCouponInflationSwap
    }

    fn risk_maturity_date(&self) -> Date {
        self.maturity
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.maturity]
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
        let ratio = if self.start_date == curve.reference_date() {
            curve.value_at(self.maturity)?
        } else {
            curve.value_at(self.maturity)? / curve.value_at(self.start_date)?
        };
        Ok(ratio - self.fixed_growth())
    }

    fn closed_form_value(&self, curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok((self.start_date == curve.reference_date()).then(|| self.fixed_growth()))
    }
}
