//! Forward index-ratio curve.

use std::fmt;
use std::sync::Arc;

use arbor_core::Date;

use super::{anchored_curve, check_kinds, log_build, InstrumentCurve};
use crate::bootstrap::{BootstrapWorkingSet, DirectFrame, NewtonBootstrapper};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{InstrumentKind, PriceableInstrument};
use crate::interpolation::{Algorithm, AlgorithmRegistry};
use crate::properties::CurveProperties;
use crate::term_curve::{CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Forward index ratios `I(T) / I(0)` from zero-coupon inflation swaps.
///
/// Anchored at a ratio of 1 on the base date.
#[derive(Clone)]
pub struct InflationCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    algorithm: Algorithm,
    curve: TermCurve,
    instruments: Vec<Arc<dyn PriceableInstrument>>,
}

impl InflationCurve {
    /// Bootstraps from zero-coupon inflation swaps.
    pub fn bootstrap(
        properties: CurveProperties,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
        registry: &AlgorithmRegistry,
    ) -> CurveResult<Self> {
        let algorithm = registry.get(properties.algorithm_name())?;
        Self::build(properties, algorithm, instruments)
    }

    fn build(
        properties: CurveProperties,
        algorithm: Algorithm,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        check_kinds(
            "InflationCurve",
            &instruments,
            &[InstrumentKind::ZeroCouponInflationSwap],
        )?;
        let identifier = properties.identifier()?;
        let working = anchored_curve(&properties, CurveValueKind::IndexRatio, algorithm, 1.0)?;
        let output = NewtonBootstrapper::from_properties(&properties)
            .bootstrap(BootstrapWorkingSet::new(working, instruments)?, &DirectFrame)?;
        let curve = Self {
            properties,
            identifier,
            algorithm,
            curve: output.curve,
            instruments: output.instruments,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// The ratio pillars.
    #[must_use]
    pub fn term_curve(&self) -> &TermCurve {
        &self.curve
    }

    /// `I(T) / I(0)` for `date`.
    pub fn index_ratio(&self, date: Date) -> CurveResult<f64> {
        self.curve.value_at(date)
    }

    /// Projected index level for `date` given the index at the base date.
    pub fn projected_index(&self, base_index: f64, date: Date) -> CurveResult<f64> {
        Ok(base_index * self.index_ratio(date)?)
    }

    /// Annualized breakeven inflation to `date`: `ratio^(1/t) - 1`.
    pub fn breakeven_rate(&self, date: Date) -> CurveResult<f64> {
        let t = self.year_fraction(date);
        if t <= 0.0 {
            return Err(CurveError::invalid_value(format!(
                "{date} is not after the base date"
            )));
        }
        Ok(self.index_ratio(date)?.powf(1.0 / t) - 1.0)
    }
}

impl fmt::Debug for InflationCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflationCurve")
            .field("id", &self.identifier)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

impl Curve for InflationCurve {
    fn reference_date(&self) -> Date {
        self.curve.base_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.curve.value(t)
    }

    fn discount_factor(&self, _t: f64) -> CurveResult<f64> {
        Err(CurveError::invalid_value("an inflation curve has no discount factors"))
    }
}

impl InstrumentCurve for InflationCurve {
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
        Self::build(self.properties.clone(), self.algorithm, instruments)
    }
}
