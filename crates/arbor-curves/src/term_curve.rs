//! The curve primitive: ordered pillars plus an interpolation strategy.

use std::fmt;
use std::sync::Arc;

use arbor_core::types::Currency;
use arbor_core::Date;
use arbor_math::interpolation::Interpolator;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::interpolation::{Algorithm, ExtrapolationMethod, InterpolationMethod, ValueSpace};
use crate::traits::{time_between, Curve};

/// What a curve's pillar values are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveValueKind {
    /// Discount factors.
    DiscountFactor,
    /// Continuously compounded zero rates.
    ZeroRate,
    /// Zero-rate spreads over a base curve.
    Spread,
    /// Forward prices or outright FX rates.
    Forward,
    /// Index ratios `I(T) / I(0)`.
    IndexRatio,
}

impl CurveValueKind {
    /// Lower bound for solved pillar values, if the kind has one.
    #[must_use]
    pub fn floor(self) -> Option<f64> {
        match self {
            Self::DiscountFactor | Self::Forward | Self::IndexRatio => Some(0.0),
            Self::ZeroRate | Self::Spread => None,
        }
    }
}

/// A single curve pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Time from the base date in years.
    pub time: f64,
    /// Pillar value.
    pub value: f64,
    /// Pillar date, when known.
    pub date: Option<Date>,
    /// Instrument that produced the pillar.
    pub instrument_id: Option<String>,
}

impl CurvePoint {
    /// Creates a pillar at a date.
    #[must_use]
    pub fn at_date(base_date: Date, date: Date, value: f64) -> Self {
        Self {
            time: time_between(base_date, date),
            value,
            date: Some(date),
            instrument_id: None,
        }
    }

    /// Creates a pillar at a time.
    #[must_use]
    pub fn at_time(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            date: None,
            instrument_id: None,
        }
    }

    /// Tags the pillar with its source instrument.
    #[must_use]
    pub fn with_instrument(mut self, id: impl Into<String>) -> Self {
        self.instrument_id = Some(id.into());
        self
    }
}

/// Descriptive data carried by a curve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveMetadata {
    /// Curve name.
    pub name: String,
    /// Currency of the curve.
    pub currency: Option<Currency>,
    /// Index name.
    pub index: Option<String>,
    /// Algorithm name.
    pub algorithm: String,
}

/// Ordered pillars with an interpolation and extrapolation strategy.
///
/// Built empty or from supplied pillars, mutated while bootstrapping and
/// frozen by [`finalize`](TermCurve::finalize). Querying a stored time
/// returns the stored value unchanged.
#[derive(Clone)]
pub struct TermCurve {
    base_date: Date,
    kind: CurveValueKind,
    metadata: CurveMetadata,
    algorithm: Algorithm,
    points: Vec<CurvePoint>,
    step_dates: Vec<Date>,
    step_times: Vec<f64>,
    finalized: bool,
    interpolator: Option<Arc<dyn Interpolator>>,
}

impl TermCurve {
    /// Creates an empty curve.
    #[must_use]
    pub fn new(base_date: Date, kind: CurveValueKind) -> Self {
        Self {
            base_date,
            kind,
            metadata: CurveMetadata::default(),
            algorithm: Algorithm::new(InterpolationMethod::LogLinear, ValueSpace::Native),
            points: Vec::new(),
            step_dates: Vec::new(),
            step_times: Vec::new(),
            finalized: false,
            interpolator: None,
        }
    }

    /// Sets the interpolation algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> CurveResult<Self> {
        if algorithm.space == ValueSpace::ZeroRate && self.kind != CurveValueKind::DiscountFactor
        {
            return Err(CurveError::invalid_config(
                "Algorithm",
                format!("zero-rate interpolation needs discount factors, not {:?}", self.kind),
            ));
        }
        self.algorithm = algorithm;
        self.refresh()?;
        Ok(self)
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: CurveMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the decision dates used by gap-step interpolation.
    pub fn with_step_dates(mut self, dates: Vec<Date>) -> CurveResult<Self> {
        self.step_times = dates.iter().map(|d| time_between(self.base_date, *d)).collect();
        self.step_dates = dates;
        self.refresh()?;
        Ok(self)
    }

    /// Creates a finalized curve from supplied pillars.
    pub fn from_points(
        base_date: Date,
        kind: CurveValueKind,
        algorithm: Algorithm,
        points: Vec<CurvePoint>,
    ) -> CurveResult<Self> {
        let mut curve = Self::new(base_date, kind).with_algorithm(algorithm)?;
        for point in points {
            curve.add_point(point)?;
        }
        curve.finalize()?;
        Ok(curve)
    }

    /// Appends a pillar after the last one.
    pub fn add_point(&mut self, point: CurvePoint) -> CurveResult<()> {
        self.ensure_mutable()?;
        if let Some(last) = self.points.last() {
            if point.time <= last.time {
                return Err(CurveError::ordering(format!(
                    "pillar at t={:.6} does not follow t={:.6}",
                    point.time, last.time
                )));
            }
        }
        self.points.push(point);
        self.refresh()
    }

    /// Inserts a pillar at its ordered position.
    pub(crate) fn insert_point(&mut self, point: CurvePoint) -> CurveResult<()> {
        self.ensure_mutable()?;
        match self
            .points
            .binary_search_by(|p| p.time.total_cmp(&point.time))
        {
            Ok(_) => Err(CurveError::ordering(format!(
                "duplicate pillar at t={:.6}",
                point.time
            ))),
            Err(i) => {
                self.points.insert(i, point);
                self.refresh()
            }
        }
    }

    /// Overwrites the value of the last pillar.
    pub(crate) fn set_last_value(&mut self, value: f64) -> CurveResult<()> {
        self.ensure_mutable()?;
        match self.points.last_mut() {
            Some(last) => last.value = value,
            None => return Err(CurveError::InsufficientData { required: 1, actual: 0 }),
        }
        self.refresh()
    }

    /// Freezes the curve.
    pub fn finalize(&mut self) -> CurveResult<()> {
        if self.points.len() < 2 {
            return Err(CurveError::InsufficientData {
                required: 2,
                actual: self.points.len(),
            });
        }
        self.finalized = true;
        Ok(())
    }

    /// True once the curve has been finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The base date.
    #[must_use]
    pub fn base_date(&self) -> Date {
        self.base_date
    }

    /// The value kind.
    #[must_use]
    pub fn kind(&self) -> CurveValueKind {
        self.kind
    }

    /// The metadata.
    #[must_use]
    pub fn metadata(&self) -> &CurveMetadata {
        &self.metadata
    }

    /// The algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The interpolation method.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.algorithm.interpolation
    }

    /// The extrapolation method.
    #[must_use]
    pub fn extrapolation(&self) -> ExtrapolationMethod {
        self.algorithm.extrapolation
    }

    /// The pillars in time order.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// The gap-step decision dates.
    #[must_use]
    pub fn step_dates(&self) -> &[Date] {
        &self.step_dates
    }

    /// Number of pillars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the curve has no pillars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pillar times.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Value at time `t`.
    pub fn value(&self, t: f64) -> CurveResult<f64> {
        if t.is_nan() {
            return Err(CurveError::invalid_value("query time is NaN"));
        }
        if let Ok(i) = self.points.binary_search_by(|p| p.time.total_cmp(&t)) {
            return Ok(self.points[i].value);
        }
        let Some(interpolator) = &self.interpolator else {
            return Err(CurveError::InsufficientData {
                required: 2,
                actual: self.points.len(),
            });
        };
        let y = self
            .algorithm
            .extrapolation
            .to_math()
            .value(interpolator.as_ref(), t)?;
        Ok(match self.algorithm.space {
            ValueSpace::Native => y,
            ValueSpace::ZeroRate => (-y * t).exp(),
        })
    }

    /// Value at a date.
    pub fn value_at(&self, date: Date) -> CurveResult<f64> {
        self.value(time_between(self.base_date, date))
    }

    /// Discount factor at time `t`.
    ///
    /// # Errors
    ///
    /// Fails for spread, forward and index-ratio curves.
    pub fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        match self.kind {
            CurveValueKind::DiscountFactor => self.value(t),
            CurveValueKind::ZeroRate => Ok((-self.value(t)? * t).exp()),
            other => Err(CurveError::invalid_value(format!(
                "{other:?} curve has no discount factors"
            ))),
        }
    }

    fn ensure_mutable(&self) -> CurveResult<()> {
        if self.finalized {
            return Err(CurveError::Finalized {
                name: self.metadata.name.clone(),
            });
        }
        Ok(())
    }

    /// Rebuilds the interpolator after a pillar change.
    fn refresh(&mut self) -> CurveResult<()> {
        if self.points.len() < 2 {
            self.interpolator = None;
            return Ok(());
        }
        let xs = self.times();
        let ys = match self.algorithm.space {
            ValueSpace::Native => self.points.iter().map(|p| p.value).collect(),
            ValueSpace::ZeroRate => self.zero_space_values()?,
        };
        self.interpolator = Some(self.algorithm.interpolation.build(xs, ys, &self.step_times)?);
        Ok(())
    }

    /// Zero rates at the pillars; a pillar at t <= 0 takes its neighbour's rate.
    fn zero_space_values(&self) -> CurveResult<Vec<f64>> {
        let mut zeros = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if p.value <= 0.0 {
                return Err(CurveError::invalid_value(format!(
                    "discount factor {} at t={:.6} is not positive",
                    p.value, p.time
                )));
            }
            zeros.push((p.time > 0.0).then(|| -p.value.ln() / p.time));
        }
        let first_known = zeros.iter().flatten().next().copied().unwrap_or(0.0);
        Ok(zeros.into_iter().map(|z| z.unwrap_or(first_known)).collect())
    }
}

impl fmt::Debug for TermCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermCurve")
            .field("base_date", &self.base_date)
            .field("kind", &self.kind)
            .field("metadata", &self.metadata)
            .field("algorithm", &self.algorithm)
            .field("points", &self.points.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl Curve for TermCurve {
    fn reference_date(&self) -> Date {
        self.base_date
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        TermCurve::value(self, t)
    }

    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        TermCurve::discount_factor(self, t)
    }
}
