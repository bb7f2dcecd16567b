//! SABR smile as a strike interpolator.

use arbor_math::interpolation::Interpolator;
use arbor_math::{MathError, MathResult};

use super::implied_vol::hagan_volatility;
use super::params::SabrParameters;
use crate::error::{VolError, VolResult};

/// Relative strike bump for the central-difference derivative.
const STRIKE_BUMP: f64 = 1e-6;

/// Volatility by strike from a SABR parameter set.
///
/// Implements [`Interpolator`] over strike, so it combines with
/// [`ExtrapolationMethod`](arbor_math::extrapolation::ExtrapolationMethod)
/// like any pillar interpolator. The range is unbounded unless restricted
/// with [`with_strike_range`](Self::with_strike_range).
///
/// # Example
///
/// ```rust
/// use arbor_math::extrapolation::ExtrapolationMethod;
/// use arbor_math::interpolation::Interpolator;
/// use arbor_vol::sabr::{SabrParameters, SabrSmileInterpolator};
///
/// let params = SabrParameters::new(0.035, 0.5, -0.3, 0.4).unwrap();
/// let smile = SabrSmileInterpolator::new(params, 0.03, 1.0)
///     .unwrap()
///     .with_strike_range(0.02, 0.04)
///     .unwrap();
///
/// let edge = smile.interpolate(0.04).unwrap();
/// assert_eq!(ExtrapolationMethod::Flat.value(&smile, 0.08).unwrap(), edge);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SabrSmileInterpolator {
    params: SabrParameters,
    forward: f64,
    expiry: f64,
    min_strike: f64,
    max_strike: f64,
}

impl SabrSmileInterpolator {
    /// Creates an interpolator for one forward and expiry.
    pub fn new(params: SabrParameters, forward: f64, expiry: f64) -> VolResult<Self> {
        params.validate()?;
        if !(forward > 0.0 && forward.is_finite()) {
            return Err(VolError::invalid_parameter("forward", forward, "must be positive"));
        }
        if !(expiry >= 0.0 && expiry.is_finite()) {
            return Err(VolError::invalid_parameter("expiry", expiry, "must be non-negative"));
        }
        Ok(Self {
            params,
            forward,
            expiry,
            min_strike: f64::MIN_POSITIVE,
            max_strike: f64::MAX,
        })
    }

    /// Restricts the strikes answered directly; queries outside are left to
    /// the extrapolation policy.
    pub fn with_strike_range(mut self, min_strike: f64, max_strike: f64) -> VolResult<Self> {
        if !(min_strike > 0.0 && min_strike <= max_strike) {
            return Err(VolError::invalid_input(format!(
                "invalid strike range [{min_strike}, {max_strike}]"
            )));
        }
        self.min_strike = min_strike;
        self.max_strike = max_strike;
        Ok(self)
    }

    /// The parameters in use.
    pub fn parameters(&self) -> &SabrParameters {
        &self.params
    }

    fn vol(&self, strike: f64) -> f64 {
        let p = &self.params;
        hagan_volatility(p.alpha(), p.beta(), p.rho(), p.nu(), self.forward, self.expiry, strike)
    }
}

impl Interpolator for SabrSmileInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        if !self.in_range(x) {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_strike,
                max: self.max_strike,
            });
        }
        Ok(self.vol(x))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        if x <= 0.0 || x.is_nan() {
            return Err(MathError::invalid_input(format!("strike {x} must be positive")));
        }
        let h = x * STRIKE_BUMP;
        Ok((self.vol(x + h) - self.vol(x - h)) / (2.0 * h))
    }

    fn min_x(&self) -> f64 {
        self.min_strike
    }

    fn max_x(&self) -> f64 {
        self.max_strike
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn smile() -> SabrSmileInterpolator {
        let params = SabrParameters::new(0.035, 0.5, -0.3, 0.4).unwrap();
        SabrSmileInterpolator::new(params, 0.03, 1.0).unwrap()
    }

    #[test]
    fn test_matches_closed_form() {
        let s = smile();
        let direct = s.parameters().volatility(0.03, 1.0, 0.025).unwrap();
        assert_eq!(s.interpolate(0.025).unwrap(), direct);
    }

    #[test]
    fn test_range_and_extrapolation() {
        let s = smile().with_strike_range(0.02, 0.04).unwrap();
        assert!(matches!(
            s.interpolate(0.01),
            Err(MathError::ExtrapolationNotAllowed { .. })
        ));
        assert!(smile().with_strike_range(0.04, 0.02).is_err());
        assert!(smile().interpolate(0.001).is_ok());
    }

    #[test]
    fn test_derivative_sign() {
        let s = smile();
        let d = s.derivative(0.03).unwrap();
        assert!(d < 0.0);
        let fd = (s.interpolate(0.0301).unwrap() - s.interpolate(0.0299).unwrap()) / 0.0002;
        assert_relative_eq!(d, fd, max_relative = 1e-3);
    }
}
