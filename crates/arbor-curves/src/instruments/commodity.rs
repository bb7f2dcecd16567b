//! Commodity forward or future.

use std::sync::Arc;

use arbor_core::Date;

use super::{InstrumentKind, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::Curve;

/// A commodity forward quoted as a price for delivery on one date.
///
/// `PV = F(T) - quote`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityForward {
    id: String,
    delivery_date: Date,
    price: f64,
}

impl CommodityForward {
    /// Creates a commodity forward.
    #[must_use]
    pub fn new(id: impl Into<String>, delivery_date: Date, price: f64) -> Self {
        Self {
            id: id.into(),
            delivery_date,
            price,
        }
    }
}

impl PriceableInstrument for CommodityForward {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> InstrumentKind {
        InstrumentKind::CommodityForward
    }

    fn risk_maturity_date(&self) -> Date {
        self.delivery_date
    }

    fn cash_flow_dates(&self) -> Vec<Date> {
        vec![self.delivery_date]
    }

    fn market_quote(&self) -> f64 {
        self.price
    }

    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument> {
        Arc::new(Self {
            price: quote,
            ..self.clone()
        })
    }

    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64> {
        Ok(curve.value_at(self.delivery_date)? - self.price)
    }

    fn closed_form_value(&self, _curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(Some(self.price))
    }
}
