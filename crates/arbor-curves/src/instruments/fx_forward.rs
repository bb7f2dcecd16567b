//! FX outright forward.

use std::sync::Arc;

use arbor_core::Date;

use super::{InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::Curve;

/// An FX outright forward for one value date.
///
/// The quote is the forward points (in price units); the pillar value is the
/// outright. Forward-dated points add to spot, while the ON and TN points
/// that settle before spot are rolled backwards and subtract.
#[derive(Debug, Clone, PartialEq)]
pub struct FxForward {
    id: String,
    value_date: Date,
    points: f64,
    outright: f64,
    pre_spot: bool,
}

impl FxForward {
    /// Creates a forward settling after spot: `outright = spot + points`.
    #[must_use]
    pub fn new(id: impl Into<String>, value_date: Date, spot: f64, points: f64) -> Self {
        Self {
            id: id.into(),
            value_date,
            points,
            outright: spot + points,
            pre_spot: false,
        }
    }

    /// Creates a forward settling before spot with an already rolled-back
    /// outright.
    #[must_use]
    pub fn pre_spot(id: impl Into<String>, value_date: Date, outright: f64, points: f64) -> Self {
        Self {
            id: id.into(),
            value_date,
            points,
            outright,
            pre_spot: true,
        }
    }

    /// The outright forward rate.
    #[must_use]
    pub fn outright(&self) -> f64 {
        self.outright
    }

    /// True when the forward settles before spot.
    #[must_use]
    pub fn is_pre_spot(&self) -> bool {
        self.pre_spot
    }
}

impl PriceableInstrument for FxForward {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::FxForward
    }

    fn risk_maturity_date(&self) -> Date {
        self.value_date
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.value_date]
    }

    fn market_quote(&self) -> f64 {
        self.points
    }

    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument> {
        let shift = quote - self.points;
        let outright = if self.pre_spot {
            self.outright - shift
        } else {
            self.outright + shift
        };
        Arc::new(Self {
            points: quote,
            outright,
            ..self.clone()
        })
    }

    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64> {
        Ok(curve.value_at(self.value_date)? - self.outright)
    }

    fn closed_form_value(&self, _curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(Some(self.outright))
    }
}
