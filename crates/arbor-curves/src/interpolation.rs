//! Interpolation settings and the algorithm registry.
//!
//! A curve's *algorithm* names how its pillars are joined:
//!
//! | Name | Interpolation | Space | Extrapolation |
//! |------|---------------|-------|---------------|
//! | `LinearZero` | linear | zero rate | flat |
//! | `LogLinearDiscount` | log-linear | native | flat |
//! | `FlatForward` | flat | native | flat |
//! | `LinearForward` | linear | native | flat |
//! | `GapStep` | gap-step | native | flat |
//!
//! The registry is an ordinary value; callers build one (usually with
//! [`AlgorithmRegistry::standard`]), register their own entries and pass it
//! by reference to the curve constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arbor_math::extrapolation::ExtrapolationMethod as MathExtrapolation;
use arbor_math::interpolation::{
    FlatInterpolator, GapStepInterpolator, Interpolator, LinearInterpolator,
    LogLinearInterpolator,
};
use arbor_math::MathResult;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Interpolation methods for curve pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Linear in value.
    #[default]
    Linear,
    /// Linear in log(value).
    LogLinear,
    /// Piecewise constant, taking the next pillar's value.
    Flat,
    /// Log-linear with the forward held until a decision date.
    GapStep,
}

impl InterpolationMethod {
    /// Builds an interpolator over the given points.
    ///
    /// `step_points` are only used by [`InterpolationMethod::GapStep`].
    pub fn build(
        self,
        xs: Vec<f64>,
        ys: Vec<f64>,
        step_points: &[f64],
    ) -> MathResult<Arc<dyn Interpolator>> {
        Ok(match self {
            Self::Linear => Arc::new(LinearInterpolator::new(xs, ys)?),
            Self::LogLinear => Arc::new(LogLinearInterpolator::new(xs, ys)?),
            Self::Flat => Arc::new(FlatInterpolator::new(xs, ys)?),
            Self::GapStep => Arc::new(GapStepInterpolator::new(xs, ys, step_points)?),
        })
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::LogLinear => "LogLinear",
            Self::Flat => "Flat",
            Self::GapStep => "GapStep",
        };
        write!(f, "{name}")
    }
}

impl FromStr for InterpolationMethod {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "linear" => Ok(Self::Linear),
            "loglinear" => Ok(Self::LogLinear),
            "flat" => Ok(Self::Flat),
            "gapstep" => Ok(Self::GapStep),
            _ => Err(CurveError::invalid_config(
                "Interpolation",
                format!("unknown interpolation method '{s}'"),
            )),
        }
    }
}

/// Extrapolation beyond the first and last pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExtrapolationMethod {
    /// Out-of-range queries fail.
    None,
    /// Boundary value held constant.
    #[default]
    Flat,
    /// Boundary slope continued.
    Linear,
}

impl ExtrapolationMethod {
    /// The numerical policy implementing this method.
    #[must_use]
    pub fn to_math(self) -> MathExtrapolation {
        match self {
            Self::None => MathExtrapolation::None,
            Self::Flat => MathExtrapolation::Flat,
            Self::Linear => MathExtrapolation::Linear,
        }
    }
}

/// The quantity an algorithm interpolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueSpace {
    /// The curve's stored values.
    #[default]
    Native,
    /// Continuously compounded zero rates derived from discount factors.
    ZeroRate,
}

/// A named way of joining curve pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Algorithm {
    /// Interpolation between pillars.
    pub interpolation: InterpolationMethod,
    /// Space the interpolation works in.
    pub space: ValueSpace,
    /// Extrapolation beyond the pillars.
    pub extrapolation: ExtrapolationMethod,
}

impl Algorithm {
    /// Creates an algorithm with flat extrapolation.
    #[must_use]
    pub fn new(interpolation: InterpolationMethod, space: ValueSpace) -> Self {
        Self {
            interpolation,
            space,
            extrapolation: ExtrapolationMethod::Flat,
        }
    }

    /// Sets the extrapolation method.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: ExtrapolationMethod) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Linear spreads with flat extrapolation, used by every spread curve.
    #[must_use]
    pub fn spread() -> Self {
        Self::new(InterpolationMethod::Linear, ValueSpace::Native)
    }
}

/// Named algorithms available to curve constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<String, Algorithm>,
}

impl AlgorithmRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithms: BTreeMap::new(),
        }
    }

    /// The registry with the standard algorithms.
    #[must_use]
    pub fn standard() -> Self {
        use InterpolationMethod as I;

        Self::new()
            .with("LinearZero", Algorithm::new(I::Linear, ValueSpace::ZeroRate))
            .with("LogLinearDiscount", Algorithm::new(I::LogLinear, ValueSpace::Native))
            .with("FlatForward", Algorithm::new(I::Flat, ValueSpace::Native))
            .with("LinearForward", Algorithm::new(I::Linear, ValueSpace::Native))
            .with("GapStep", Algorithm::new(I::GapStep, ValueSpace::Native))
    }

    /// Adds or replaces an algorithm.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, algorithm: Algorithm) -> Self {
        self.register(name, algorithm);
        self
    }

    /// Adds or replaces an algorithm in place.
    pub fn register(&mut self, name: impl Into<String>, algorithm: Algorithm) {
        self.algorithms.insert(name.into(), algorithm);
    }

    /// Looks up an algorithm by name.
    pub fn get(&self, name: &str) -> CurveResult<Algorithm> {
        self.algorithms.get(name).copied().ok_or_else(|| {
            CurveError::invalid_config("Algorithm", format!("unknown algorithm '{name}'"))
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = AlgorithmRegistry::standard();
        let alg = registry.get("LinearZero").unwrap();
        assert_eq!(alg.interpolation, InterpolationMethod::Linear);
        assert_eq!(alg.space, ValueSpace::ZeroRate);
        assert_eq!(registry.names().count(), 5);
        assert!(matches!(
            registry.get("CubicSpline"),
            Err(CurveError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = AlgorithmRegistry::standard();
        registry.register(
            "StrictLogLinear",
            Algorithm::new(InterpolationMethod::LogLinear, ValueSpace::Native)
                .with_extrapolation(ExtrapolationMethod::None),
        );
        assert_eq!(
            registry.get("StrictLogLinear").unwrap().extrapolation,
            ExtrapolationMethod::None
        );
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("log-linear".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::LogLinear);
        assert_eq!("GapStep".parse::<InterpolationMethod>().unwrap(), InterpolationMethod::GapStep);
        assert!("spline".parse::<InterpolationMethod>().is_err());
    }
}
