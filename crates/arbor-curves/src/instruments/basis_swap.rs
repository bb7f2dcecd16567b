//! Tenor basis swap.

use std::fmt;
use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::types::Frequency;
use arbor_core::Date;

use super::{schedule, InstrumentConventions, InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::{simple_forward, Curve};

/// Float/float swap exchanging a derived index plus spread against the base
/// index, both discounted on the base curve.
///
/// ```text
/// PV = Σ τ_j (F_derived_j + spread) DF_base(t_j) - Σ τ_i F_base_i DF_base(t_i)
/// ```
///
/// `F_derived` is projected off the curve being priced, `F_base` and
/// `DF_base` off the referenced base curve.
#[derive(Clone)]
pub struct BasisSwap {
    id: String,
    start_date: Date,
    maturity: Date,
    spread: f64,
    day_count: DayCountConvention,
    derived_frequency: Frequency,
    base_frequency: Frequency,
    derived_dates: Vec<Date>,
    base_dates: Vec<Date>,
    base: Arc<dyn Curve>,
}

impl BasisSwap {
    /// Creates a basis swap against a finalized base curve.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        maturity: Date,
        spread: f64,
        derived_frequency: Frequency,
        base_frequency: Frequency,
        base: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        Ok(Self {
            id: id.into(),
            start_date,
            maturity,
            spread,
            day_count: DayCountConvention::Act360,
            derived_frequency,
            base_frequency,
            derived_dates: schedule(start_date, maturity, derived_frequency)?,
            base_dates: schedule(start_date, maturity, base_frequency)?,
            base,
        })
    }

    /// Sets the day count of both legs.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    fn float_leg(
        &self,
        dates: &[Date],
        projection: &dyn Curve,
        spread: f64,
    ) -> CurveResult<f64> {
        let mut prev = self.start_date;
        let mut pv = 0.0;
        for d in dates {
            let tau = self.day_count.year_fraction(prev, *d);
            let fwd = simple_forward(projection, prev, *d, tau)?;
            pv += tau * (fwd + spread) * self.base.discount_factor_at(*d)?;
            prev = *d;
        }
        Ok(pv)
    }
}

impl fmt::Debug for BasisSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasisSwap")
            .field("id", &self.id)
            .field("maturity", &self.maturity)
            .field("spread", &self.spread)
            .finish_non_exhaustive()
    }
}

impl PriceableInstrument for BasisSwap {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::BasisSwap
    }

    fn risk_maturity_date(&self) -> Date {
        self.maturity
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        let mut dates = self.derived_dates.clone();
        dates.extend_from_slice(&self.base_dates);
        dates.sort();
        dates.dedup();
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
        let derived = self.float_leg(&self.derived_dates, curve, self.spread)?;
        let base = self.float_leg(&self.base_dates, self.base.as_ref(), 0.0)?;
        Ok(derived - base)
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            frequency: Some(self.derived_frequency),
            base_frequency: Some(self.base_frequency),
            day_count: Some(self.day_count),
        }
    }

    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        Some(&self.base)
    }
}
