//! Cross-currency basis swap.

use std::fmt;
use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::types::Frequency;
use arbor_core::Date;

use super::{schedule, InstrumentConventions, InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::{simple_forward, Curve};

/// The leg of a cross-currency basis swap in the curve's currency, with
/// notional exchanges, projected off a rate curve and discounted on the
/// cross-currency curve being priced.
///
/// ```text
/// PV = -DF_x(t_0) + Σ τ_i (F_i + spread) DF_x(t_i) + DF_x(t_n)
/// ```
///
/// The other leg is worth par in its own currency and does not appear.
#[derive(Clone)]
pub struct XccyBasisSwap {
    id: String,
    start_date: Date,
    maturity: Date,
    spread: f64,
    day_count: DayCountConvention,
    frequency: Frequency,
    dates: Vec<Date>,
    projection: Arc<dyn Curve>,
}

impl XccyBasisSwap {
    /// Creates a cross-currency basis swap.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        maturity: Date,
        spread: f64,
        frequency: Frequency,
        projection: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        Ok(Self {
            id: id.into(),
            start_date,
            maturity,
            spread,
            day_count: DayCountConvention::Act360,
            frequency,
            dates: schedule(start_date, maturity, frequency)?,
            projection,
        })
    }

    /// Sets the floating leg day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// The spread that prices the swap at par when discounted on `curve`.
    ///
    /// ```text
    /// s = (DF(t_0) - DF(t_n) - Σ τ_i F_i DF(t_i)) / Σ τ_i DF(t_i)
    /// ```
    pub fn par_spread(&self, curve: &dyn Curve) -> CurveResult<f64> {
        let (annuity, float) = self.legs(curve)?;
        let exchanges = curve.discount_factor_at(self.start_date)? - curve.discount_factor_at(self.maturity)?;
        Ok((exchanges - float) / annuity)
    }

    /// `(Σ τ_i DF(t_i), Σ τ_i F_i DF(t_i))` discounted on `curve`.
    fn legs(&self, curve: &dyn Curve) -> CurveResult<(f64, f64)> {
        let mut prev = self.start_date;
        let (mut annuity, mut float) = (0.0, 0.0);
        for d in &self.dates {
            let tau = self.day_count.year_fraction(prev, *d);
            let fwd = simple_forward(self.projection.as_ref(), prev, *d, tau)?;
            let df = curve.discount_factor_at(*d)?;
            annuity += tau * df;
            float += tau * fwd * df;
            prev = *d;
        }
        Ok((annuity, float))
    }
}

impl fmt::Debug for XccyBasisSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XccyBasisSwap")
            .field("id", &self.id)
            .field("maturity", &self.maturity)
            .field("spread", &self.spread)
            .finish_non_exhaustive()
    }
}

impl PriceableInstrument for XccyBasisSwap {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::XccyBasisSwap
    }

    fn risk_maturity_date(&self) -> Date {
        self.maturity
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        let mut dates = vec![self.start_date];
        dates.extend_from_slice(&self.dates);
        dates
    }

    fn market_quote(&self) -> f64 {
        self.spread
    }

    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument> {
        Arc::new(Self {
            spread: quote,
            ..self.clone()
        })
    }

    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64> {
        let (annuity, float) = self.legs(curve)?;
        Ok(float + self.spread * annuity - curve.discount_factor_at(self.start_date)?
            + curve.discount_factor_at(self.maturity)?)
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            frequency: Some(self.frequency),
            day_count: Some(self.day_count),
            ..InstrumentConventions::default()
        }
    }

    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        Some(&self.projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::{date, FlatRateCurve};
    use approx::assert_relative_eq;

    #[test]
    fn test_par_when_discounting_on_projection() {
        let base_date = date(2024, 1, 2);
        let proj: Arc<dyn Curve> = Arc::new(FlatRateCurve { date: base_date, rate: 0.025 });
        let swap = XccyBasisSwap::new(
            "EUR-XccySwap-3Y",
            base_date,
            date(2027, 1, 4),
            0.0,
            Frequency::Quarterly,
            Arc::clone(&proj),
        )
        .unwrap();
        assert_relative_eq!(swap.present_value(proj.as_ref()).unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_par_spread_zeroes_pv() {
        let base_date = date(2024, 1, 2);
        let proj: Arc<dyn Curve> = Arc::new(FlatRateCurve { date: base_date, rate: 0.025 });
        let discount = FlatRateCurve { date: base_date, rate: 0.03 };
        let swap = XccyBasisSwap::new(
            "EUR-XccySwap-6M",
            base_date,
            date(2024, 7, 2),
            0.0,
            Frequency::Quarterly,
            proj,
        )
        .unwrap();

        let par = swap.par_spread(&discount).unwrap();
        assert!(par > 0.0);
        let at_par = swap.with_quote(par);
        assert_relative_eq!(at_par.present_value(&discount).unwrap(), 0.0, epsilon = 1e-14);
        assert_eq!(at_par.conventions().frequency, Some(Frequency::Quarterly));
    }
}
