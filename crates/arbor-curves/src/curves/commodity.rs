//! Commodity forward price curve.

use std::fmt;
use std::sync::Arc;

use arbor_core::Date;

use super::{anchored_curve, check_kinds, log_build, working_curve, InstrumentCurve};
use crate::bootstrap::{BootstrapWorkingSet, DirectFrame, NewtonBootstrapper};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{InstrumentKind, PriceableInstrument};
use crate::interpolation::{Algorithm, AlgorithmRegistry};
use crate::properties::CurveProperties;
use crate::term_curve::{CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Forward prices against delivery date.
///
/// With a spot price the curve is anchored there on the base date;
/// without one, the nearest forward is taken as quoted and the rest are
/// solved after it.
#[derive(Clone)]
pub struct CommodityCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    algorithm: Algorithm,
    spot: Option<f64>,
    curve: TermCurve,
    instruments: Vec<Arc<dyn PriceableInstrument>>,
}

impl CommodityCurve {
    /// Bootstraps from commodity forwards.
    pub fn bootstrap(
        properties: CurveProperties,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
        spot: Option<f64>,
        registry: &AlgorithmRegistry,
    ) -> CurveResult<Self> {
        let algorithm = registry.get(properties.algorithm_name())?;
        Self::build(properties, algorithm, spot, instruments)
    }

    fn build(
        properties: CurveProperties,
        algorithm: Algorithm,
        spot: Option<f64>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        check_kinds("CommodityCurve", &instruments, &[InstrumentKind::CommodityForward])?;
        let identifier = properties.identifier()?;
        let working = match spot {
            Some(price) => anchored_curve(&properties, CurveValueKind::Forward, algorithm, price)?,
            None => working_curve(&properties, CurveValueKind::Forward, algorithm)?,
        };
        let output = NewtonBootstrapper::from_properties(&properties)
            .bootstrap(BootstrapWorkingSet::new(working, instruments)?, &DirectFrame)?;
        let curve = Self {
            properties,
            identifier,
            algorithm,
            spot,
            curve: output.curve,
            instruments: output.instruments,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// The spot anchor, if one was given.
    #[must_use]
    pub fn spot(&self) -> Option<f64> {
        self.spot
    }

    /// The price pillars.
    #[must_use]
    pub fn term_curve(&self) -> &TermCurve {
        &self.curve
    }

    /// Forward price for delivery on `date`.
    pub fn forward_price(&self, date: Date) -> CurveResult<f64> {
        self.curve.value_at(date)
    }
}

impl fmt::Debug for CommodityCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommodityCurve")
            .field("id", &self.identifier)
            .field("spot", &self.spot)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

impl Curve for CommodityCurve {
    fn reference_date(&self) -> Date {
        self.curve.base_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.curve.value(t)
    }

    fn discount_factor(&self, _t: f64) -> CurveResult<f64> {
        Err(CurveError::invalid_value("a commodity curve has no discount factors"))
    }
}

impl InstrumentCurve for CommodityCurve {
    fn properties(&self) -> &CurveProperties {
        &self.properties
    }

    fn identifier(&self) -> &CurveIdentifier {
        &self.identifier
    }

    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
        &self.instruments
    }

    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        Self::build(self.properties.clone(), self.algorithm, self.spot, instruments)
    }
}
