//! The tagged union over every curve family.

use std::sync::Arc;

use arbor_core::Date;

use crate::curves::{
    CommodityCurve, FxCurve, FxDerivedCurve, InflationCurve, InstrumentCurve, RateBasisCurve,
    RateCurve, RateSpreadCurve, XccySpreadCurve,
};
use crate::document::CurveDocument;
use crate::error::CurveResult;
use crate::identifier::CurveIdentifier;
use crate::instruments::PriceableInstrument;
use crate::properties::{CurveProperties, PricingStructureType};
use crate::term_curve::CurvePoint;
use crate::traits::Curve;

/// A finalized curve of any family.
///
/// Cloning shares the underlying curve.
#[derive(Debug, Clone)]
pub enum PricingStructure {
    /// Discount curve.
    Rate(Arc<RateCurve>),
    /// Basis curve over a rate curve.
    RateBasis(Arc<RateBasisCurve>),
    /// Spread curve over a rate curve.
    RateSpread(Arc<RateSpreadCurve>),
    /// Cross-currency spread curve.
    XccySpread(Arc<XccySpreadCurve>),
    /// FX forward curve.
    Fx(Arc<FxCurve>),
    /// Cross FX curve.
    FxDerived(Arc<FxDerivedCurve>),
    /// Inflation index-ratio curve.
    Inflation(Arc<InflationCurve>),
    /// Commodity forward curve.
    Commodity(Arc<CommodityCurve>),
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            PricingStructure::Rate($c) => $body,
            PricingStructure::RateBasis($c) => $body,
            PricingStructure::RateSpread($c) => $body,
            PricingStructure::XccySpread($c) => $body,
            PricingStructure::Fx($c) => $body,
            PricingStructure::FxDerived($c) => $body,
            PricingStructure::Inflation($c) => $body,
            PricingStructure::Commodity($c) => $body,
        }
    };
}

macro_rules! rewrap {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            PricingStructure::Rate($c) => PricingStructure::Rate(Arc::new($body)),
            PricingStructure::RateBasis($c) => PricingStructure::RateBasis(Arc::new($body)),
            PricingStructure::RateSpread($c) => PricingStructure::RateSpread(Arc::new($body)),
            PricingStructure::XccySpread($c) => PricingStructure::XccySpread(Arc::new($body)),
            PricingStructure::Fx($c) => PricingStructure::Fx(Arc::new($body)),
            PricingStructure::FxDerived($c) => PricingStructure::FxDerived(Arc::new($body)),
            PricingStructure::Inflation($c) => PricingStructure::Inflation(Arc::new($body)),
            PricingStructure::Commodity($c) => PricingStructure::Commodity(Arc::new($body)),
        }
    };
}

impl PricingStructure {
    /// The family of the wrapped curve.
    #[must_use]
    pub fn structure_type(&self) -> PricingStructureType {
        match self {
            Self::Rate(_) => PricingStructureType::RateCurve,
            Self::RateBasis(_) => PricingStructureType::RateBasisCurve,
            Self::RateSpread(_) => PricingStructureType::RateSpreadCurve,
            Self::XccySpread(_) => PricingStructureType::XccySpreadCurve,
            Self::Fx(_) => PricingStructureType::FxCurve,
            Self::FxDerived(_) => PricingStructureType::FxDerivedCurve,
            Self::Inflation(_) => PricingStructureType::InflationCurve,
            Self::Commodity(_) => PricingStructureType::CommodityCurve,
        }
    }

    /// The wrapped curve as a query interface.
    #[must_use]
    pub fn as_curve(&self) -> &dyn Curve {
        dispatch!(self, c => &**c as &dyn Curve)
    }

    /// The wrapped rate curve, if this is one.
    #[must_use]
    pub fn as_rate_curve(&self) -> Option<&Arc<RateCurve>> {
        match self {
            Self::Rate(curve) => Some(curve),
            _ => None,
        }
    }

    /// True for families whose values are discount factors.
    #[must_use]
    pub fn discounts(&self) -> bool {
        matches!(
            self,
            Self::Rate(_) | Self::RateBasis(_) | Self::RateSpread(_) | Self::XccySpread(_)
        )
    }

    /// The curve's own pillars: discount factors, spreads, outrights,
    /// index ratios or prices depending on the family.
    pub fn pillars(&self) -> CurveResult<Vec<CurvePoint>> {
        Ok(match self {
            Self::Rate(c) => c.term_curve().points().to_vec(),
            Self::RateBasis(c) => c.spread_curve().points().to_vec(),
            Self::RateSpread(c) => c.spread_curve().points().to_vec(),
            Self::XccySpread(c) => c.spread_curve().points().to_vec(),
            Self::Fx(c) => c.term_curve().points().to_vec(),
            Self::FxDerived(c) => c.to_term_curve()?.points().to_vec(),
            Self::Inflation(c) => c.term_curve().points().to_vec(),
            Self::Commodity(c) => c.term_curve().points().to_vec(),
        })
    }

    /// Rebuilds the wrapped curve from re-quoted instruments.
    pub fn rebuild(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        Ok(rewrap!(self, c => c.rebuild_with(instruments)?))
    }

    /// Exports the curve as a document.
    pub fn to_document(&self) -> CurveResult<CurveDocument> {
        CurveDocument::from_structure(self)
    }
}

impl Curve for PricingStructure {
    fn reference_date(&self) -> Date {
        self.as_curve().reference_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.as_curve().value(t)
    }

    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        self.as_curve().discount_factor(t)
    }
}

impl InstrumentCurve for PricingStructure {
    fn properties(&self) -> &CurveProperties {
        dispatch!(self, c => c.properties())
    }

    fn identifier(&self) -> &CurveIdentifier {
        dispatch!(self, c => c.identifier())
    }

    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
        dispatch!(self, c => c.instruments())
    }

    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        self.rebuild(instruments)
    }
}

macro_rules! from_curve {
    ($($variant:ident($curve:ty)),+ $(,)?) => {
        $(
            impl From<$curve> for PricingStructure {
                fn from(curve: $curve) -> Self {
                    Self::$variant(Arc::new(curve))
                }
            }

            impl From<Arc<$curve>> for PricingStructure {
                fn from(curve: Arc<$curve>) -> Self {
                    Self::$variant(curve)
                }
            }
        )+
    };
}

from_curve!(
    Rate(RateCurve),
    RateBasis(RateBasisCurve),
    RateSpread(RateSpreadCurve),
    XccySpread(XccySpreadCurve),
    Fx(FxCurve),
    FxDerived(FxDerivedCurve),
    Inflation(InflationCurve),
    Commodity(CommodityCurve),
);
