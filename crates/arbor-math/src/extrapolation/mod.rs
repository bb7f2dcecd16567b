//! Extrapolation beyond the first and last pillar.
//!
//! - [`FlatExtrapolator`]: the boundary pillar's value, unchanged
//! - [`LinearExtrapolator`]: boundary value continued with the boundary slope
//!
//! [`ExtrapolationMethod`] combines an [`Interpolator`] with one of these so
//! that a single call answers any query point:
//!
//! ```rust
//! use arbor_math::extrapolation::ExtrapolationMethod;
//! use arbor_math::interpolation::LinearInterpolator;
//!
//! let interp = LinearInterpolator::new(vec![1.0, 2.0], vec![10.0, 20.0]).unwrap();
//! assert_eq!(ExtrapolationMethod::Flat.value(&interp, 0.0).unwrap(), 10.0);
//! assert_eq!(ExtrapolationMethod::Linear.value(&interp, 3.0).unwrap(), 30.0);
//! assert!(ExtrapolationMethod::None.value(&interp, 3.0).is_err());
//! ```

mod flat;
mod linear;

pub use flat::FlatExtrapolator;
pub use linear::LinearExtrapolator;

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Trait for extrapolation methods.
pub trait Extrapolator: Send + Sync {
    /// Extrapolates to `x` from the nearest boundary pillar.
    ///
    /// # Arguments
    ///
    /// * `x` - Target point outside the pillar range
    /// * `boundary_x` - Abscissa of the nearest boundary pillar
    /// * `boundary_value` - Value at that pillar
    /// * `boundary_slope` - Derivative at that pillar
    fn extrapolate(&self, x: f64, boundary_x: f64, boundary_value: f64, boundary_slope: f64)
        -> f64;

    /// Returns the name of the extrapolation method.
    fn name(&self) -> &'static str;
}

/// Extrapolation policy applied outside `[min_x, max_x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
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
    /// The extrapolator for this method, `None` when extrapolation is disabled.
    #[must_use]
    pub fn extrapolator(&self) -> Option<&'static dyn Extrapolator> {
        match self {
            Self::None => None,
            Self::Flat => Some(&FlatExtrapolator),
            Self::Linear => Some(&LinearExtrapolator),
        }
    }

    /// Evaluates `interp` at `x`, extrapolating outside the pillar range.
    pub fn value(&self, interp: &dyn Interpolator, x: f64) -> MathResult<f64> {
        if x.is_nan() {
            return Err(MathError::invalid_input("query point is NaN"));
        }
        if interp.in_range(x) {
            return interp.interpolate(x);
        }
        let Some(extrapolator) = self.extrapolator() else {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: interp.min_x(),
                max: interp.max_x(),
            });
        };
        let boundary = if x < interp.min_x() {
            interp.min_x()
        } else {
            interp.max_x()
        };
        let value = interp.interpolate(boundary)?;
        let slope = match self {
            Self::Linear => interp.derivative(boundary)?,
            _ => 0.0,
        };
        Ok(extrapolator.extrapolate(x, boundary, value, slope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::LogLinearInterpolator;

    #[test]
    fn test_flat_returns_boundary_unchanged() {
        let ys = vec![0.999_123_456_789, 0.95, 0.901_234_567_891];
        let interp = LogLinearInterpolator::new(vec![0.1, 1.0, 2.0], ys.clone()).unwrap();
        assert_eq!(ExtrapolationMethod::Flat.value(&interp, 0.0).unwrap(), ys[0]);
        assert_eq!(ExtrapolationMethod::Flat.value(&interp, 50.0).unwrap(), ys[2]);
    }

    #[test]
    fn test_names() {
        assert_eq!(ExtrapolationMethod::Flat.extrapolator().unwrap().name(), "Flat");
        assert_eq!(ExtrapolationMethod::Linear.extrapolator().unwrap().name(), "Linear");
        assert!(ExtrapolationMethod::None.extrapolator().is_none());
    }
}
