//! Single-curve discount curve.

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
use crate::term_curve::{CurvePoint, CurveValueKind, TermCurve};
use crate::traits::Curve;

const ACCEPTED: [InstrumentKind; 3] = [InstrumentKind::Deposit, InstrumentKind::Fra, InstrumentKind::Swap];

/// A discount curve bootstrapped from deposits, FRAs and swaps.
///
/// Bootstrapped curves are anchored at `DF = 1` on the base date. A curve
/// may also be seeded with externally supplied `(date, DF)` pillars, in
/// which case instruments must mature after the last of them or before the
/// first.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use arbor_core::prelude::*;
/// use arbor_curves::prelude::*;
///
/// let base = Date::from_ymd(2024, 1, 15).unwrap();
/// let props = CurveProperties::new(PricingStructureType::RateCurve, base)
///     .with_currency(Currency::USD)
///     .with_index("SOFR", None);
/// let instruments: Vec<Arc<dyn PriceableInstrument>> = vec![
///     Arc::new(Deposit::new("USD-Deposit-3M", base, base.add_months(3).unwrap(), 0.05).unwrap()),
///     Arc::new(Swap::new("USD-IRSwap-2Y", base, base.add_years(2).unwrap(), 0.045, Frequency::SemiAnnual).unwrap()),
/// ];
/// let curve = RateCurve::bootstrap(props, instruments, &AlgorithmRegistry::standard()).unwrap();
/// assert!(curve.repricing_report().unwrap().all_passed());
/// ```
#[derive(Clone)]
pub struct RateCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    algorithm: Algorithm,
    curve: TermCurve,
    supplied: Vec<CurvePoint>,
    instruments: Vec<Arc<dyn PriceableInstrument>>,
}

impl RateCurve {
    /// Bootstraps from instruments.
    pub fn bootstrap(
        properties: CurveProperties,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
        registry: &AlgorithmRegistry,
    ) -> CurveResult<Self> {
        let algorithm = registry.get(properties.algorithm_name())?;
        Self::build(properties, algorithm, Vec::new(), instruments)
    }

    /// Builds from supplied `(date, discount factor)` pillars only.
    pub fn from_pillars(
        properties: CurveProperties,
        registry: &AlgorithmRegistry,
        pillars: Vec<(Date, f64)>,
    ) -> CurveResult<Self> {
        Self::with_pillars(properties, registry, pillars, Vec::new())
    }

    /// Bootstraps instruments around supplied `(date, discount factor)`
    /// pillars.
    pub fn with_pillars(
        properties: CurveProperties,
        registry: &AlgorithmRegistry,
        pillars: Vec<(Date, f64)>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        let algorithm = registry.get(properties.algorithm_name())?;
        let base = properties.require_base_date()?;
        let mut supplied: Vec<CurvePoint> = pillars
            .into_iter()
            .map(|(date, df)| CurvePoint::at_date(base, date, df))
            .collect();
        supplied.sort_by(|a, b| a.time.total_cmp(&b.time));
        if supplied.is_empty() {
            return Err(CurveError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }
        Self::build(properties, algorithm, supplied, instruments)
    }

    fn build(
        properties: CurveProperties,
        algorithm: Algorithm,
        supplied: Vec<CurvePoint>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        check_kinds("RateCurve", &instruments, &ACCEPTED)?;
        let identifier = properties.identifier()?;
        let working = if supplied.is_empty() {
            anchored_curve(&properties, CurveValueKind::DiscountFactor, algorithm, 1.0)?
        } else {
            let mut curve = working_curve(&properties, CurveValueKind::DiscountFactor, algorithm)?;
            for point in &supplied {
                curve.add_point(point.clone())?;
            }
            curve
        };

        let output = NewtonBootstrapper::from_properties(&properties)
            .bootstrap(BootstrapWorkingSet::new(working, instruments)?, &DirectFrame)?;

        let curve = Self {
            properties,
            identifier,
            algorithm,
            curve: output.curve,
            supplied,
            instruments: output.instruments,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// The finalized pillars.
    #[must_use]
    pub fn term_curve(&self) -> &TermCurve {
        &self.curve
    }

    /// The interpolation algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The pillars that were supplied rather than solved.
    #[must_use]
    pub fn supplied_pillars(&self) -> &[CurvePoint] {
        &self.supplied
    }

    /// Zero rate to `date` under the configured compounding frequency.
    pub fn zero_rate_at(&self, date: Date) -> CurveResult<f64> {
        self.zero_rate(self.year_fraction(date), self.properties.compounding_frequency)
    }

    /// Simple forward rate between two dates.
    pub fn forward_rate_between(&self, start: Date, end: Date) -> CurveResult<f64> {
        self.forward_rate(self.year_fraction(start), self.year_fraction(end))
    }
}

impl fmt::Debug for RateCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateCurve")
            .field("id", &self.identifier)
            .field("curve", &self.curve)
            .field("instruments", &self.instruments.len())
            .finish_non_exhaustive()
    }
}

impl Curve for RateCurve {
    fn reference_date(&self) -> Date {
        self.curve.base_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.curve.value(t)
    }

    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        self.curve.discount_factor(t)
    }
}

impl InstrumentCurve for RateCurve {
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
        Self::build(
            self.properties.clone(),
            self.algorithm,
            self.supplied.clone(),
            instruments,
        )
    }
}
