//! How a working curve is priced against.

use std::sync::Arc;

use arbor_core::Date;

use crate::error::CurveResult;
use crate::instruments::PriceableInstrument;
use crate::term_curve::TermCurve;
use crate::traits::Curve;

/// Pricing context for the curve under construction.
pub trait BootstrapFrame: Send + Sync {
    /// PV of `instrument` given the working curve.
    fn present_value(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
    ) -> CurveResult<f64>;

    /// Working-curve value at time `t` that zeroes the instrument's PV,
    /// when it has a closed form.
    fn closed_form(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
        t: f64,
    ) -> CurveResult<Option<f64>>;
}

/// The working curve is the pricing curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFrame;

impl BootstrapFrame for DirectFrame {
    fn present_value(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
    ) -> CurveResult<f64> {
        instrument.present_value(working)
    }

    fn closed_form(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
        _t: f64,
    ) -> CurveResult<Option<f64>> {
        instrument.closed_form_value(working)
    }
}

/// `DF_base(t) × exp(-s(t) × t)`.
pub fn spread_discount_factor(base: &dyn Curve, spread: &TermCurve, t: f64) -> CurveResult<f64> {
    Ok(base.discount_factor(t)? * (-spread.value(t)? * t).exp())
}

/// A spread curve over a base curve, seen as a discount curve.
pub struct SpreadView<'a> {
    base: &'a dyn Curve,
    spread: &'a TermCurve,
}

impl<'a> SpreadView<'a> {
    /// Combines a base curve with spreads.
    #[must_use]
    pub fn new(base: &'a dyn Curve, spread: &'a TermCurve) -> Self {
        Self { base, spread }
    }
}

impl Curve for SpreadView<'_> {
    fn reference_date(&self) -> Date {
        self.spread.base_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.discount_factor(t)
    }

    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        spread_discount_factor(self.base, self.spread, t)
    }
}

/// The working curve holds zero-rate spreads over `base`.
#[derive(Clone)]
pub struct SpreadFrame {
    base: Arc<dyn Curve>,
}

impl SpreadFrame {
    /// Creates a spread frame over a finalized base curve.
    #[must_use]
    pub fn new(base: Arc<dyn Curve>) -> Self {
        Self { base }
    }
}

impl BootstrapFrame for SpreadFrame {
    fn present_value(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
    ) -> CurveResult<f64> {
        instrument.present_value(&SpreadView::new(self.base.as_ref(), working))
    }

    fn closed_form(
        &self,
        instrument: &dyn PriceableInstrument,
        working: &TermCurve,
        t: f64,
    ) -> CurveResult<Option<f64>> {
        if t <= 0.0 {
            return Ok(None);
        }
        let view = SpreadView::new(self.base.as_ref(), working);
        match instrument.closed_form_value(&view)? {
            Some(df) if df > 0.0 => {
                let df_base = self.base.discount_factor(t)?;
                Ok(Some(-(df / df_base).ln() / t))
            }
            _ => Ok(None),
        }
    }
}
