//! Instruments quoted as spreads over a base curve's implied rates.
//!
//! Each one resolves its all-in rate at pricing time as the base curve's
//! implied rate over the same period plus the quoted spread, then prices
//! like its plain counterpart on the curve being built.

use std::fmt;
use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::types::Frequency;
use arbor_core::Date;

use super::{
    check_period, money_market_closed_form, money_market_pv, InstrumentConventions, InstrumentKind,
    PriceableInstrument, Swap,
};
use crate::error::CurveResult;
use crate::traits::{simple_forward, Curve};

/// Deposit quoted as a spread over the base curve's deposit rate.
#[derive(Clone)]
pub struct SpreadDeposit {
    id: String,
    start_date: Date,
    end_date: Date,
    spread: f64,
    day_count: DayCountConvention,
    base: Arc<dyn Curve>,
}

impl SpreadDeposit {
    /// Creates a spread deposit accruing ACT/360.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        end_date: Date,
        spread: f64,
        base: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        let id = id.into();
        check_period(&id, start_date, end_date)?;
        Ok(Self {
            id,
            start_date,
            end_date,
            spread,
            day_count: DayCountConvention::Act360,
            base,
        })
    }

    /// Sets the day count convention.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    fn accrual(&self) -> f64 {
        self.day_count.year_fraction(self.start_date, self.end_date)
    }

    /// Base rate plus spread.
    pub fn all_in_rate(&self) -> CurveResult<f64> {
        let tau = self.accrual();
        Ok(simple_forward(self.base.as_ref(), self.start_date, self.end_date, tau)? + self.spread)
    }
}

/// FRA quoted as a spread over the base curve's forward rate.
#[derive(Clone)]
pub struct SpreadFra {
    id: String,
    start_date: Date,
    end_date: Date,
    spread: f64,
    day_count: DayCountConvention,
    base: Arc<dyn Curve>,
}

impl SpreadFra {
    /// Creates a spread FRA accruing ACT/360.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        end_date: Date,
        spread: f64,
        base: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        let id = id.into();
        check_period(&id, start_date, end_date)?;
        Ok(Self {
            id,
            start_date,
            end_date,
            spread,
            day_count: DayCountConvention::Act360,
            base,
        })
    }

    /// Sets the day count convention.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    fn accrual(&self) -> f64 {
        self.day_count.year_fraction(self.start_date, self.end_date)
    }

    /// Base forward plus spread.
    pub fn all_in_rate(&self) -> CurveResult<f64> {
        let tau = self.accrual();
        Ok(simple_forward(self.base.as_ref(), self.start_date, self.end_date, tau)? + self.spread)
    }
}

/// Swap quoted as a spread over the base curve's par swap rate.
#[derive(Clone)]
pub struct SpreadSwap {
    swap: Swap,
    spread: f64,
    base: Arc<dyn Curve>,
}

impl SpreadSwap {
    /// Creates a spread swap with a 30/360 fixed leg.
    pub fn new(
        id: impl Into<String>,
        start_date: Date,
        maturity: Date,
        spread: f64,
        fixed_frequency: Frequency,
        base: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        Ok(Self {
            swap: Swap::new(id, start_date, maturity, 0.0, fixed_frequency)?,
            spread,
            base,
        })
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.swap = self.swap.with_day_count(day_count);
        self
    }

    /// Base par rate plus spread.
    pub fn all_in_rate(&self) -> CurveResult<f64> {
        Ok(self.swap.par_rate(self.base.as_ref())? + self.spread)
    }
}

macro_rules! spread_debug {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("id", &self.id())
                    .field("maturity", &self.risk_maturity_date())
                    .field("spread", &self.market_quote())
                    .finish_non_exhaustive()
            }
        }
    };
}

spread_debug!(SpreadDeposit);
spread_debug!(SpreadFra);
spread_debug!(SpreadSwap);

impl PriceableInstrument for SpreadDeposit {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::SpreadDeposit
    }

    fn risk_maturity_date(&self) -> Date {
        self.end_date
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.start_date, self.end_date]
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
        money_market_pv(curve, self.start_date, self.end_date, self.all_in_rate()?, self.accrual())
    }

    fn closed_form_value(&self, curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(money_market_closed_form(curve, self.start_date, self.all_in_rate()?, self.accrual()))
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            day_count: Some(self.day_count),
            ..InstrumentConventions::default()
        }
    }

    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        Some(&self.base)
    }
}

impl PriceableInstrument for SpreadFra {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::SpreadFra
    }

    fn risk_maturity_date(&self) -> Date {
        self.end_date
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.start_date, self.end_date]
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
        money_market_pv(curve, self.start_date, self.end_date, self.all_in_rate()?, self.accrual())
    }

    fn closed_form_value(&self, curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(money_market_closed_form(curve, self.start_date, self.all_in_rate()?, self.accrual()))
    }

    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions {
            day_count: Some(self.day_count),
            ..InstrumentConventions::default()
        }
    }

    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        Some(&self.base)
    }
}

impl PriceableInstrument for SpreadSwap {
    fn id(&self) -> &str {
        self.swap.id()
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::SpreadSwap
    }

    fn risk_maturity_date(&self) -> Date {
        self.swap.risk_maturity_date()
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        self.swap.cash_flow_dates()
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
        self.swap.pv_at_rate(curve, self.all_in_rate()?)
    }

    fn conventions(&self) -> InstrumentConventions {
        self.swap.conventions()
    }

    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        Some(&self.base)
    }
}
