//! Log-linear interpolation.

use super::{Interpolator, Location, PointSet};
use crate::error::{MathError, MathResult};

/// Linear interpolation of `ln(y)`.
///
/// On discount factors this is the piecewise-flat forward rate curve:
/// positivity is preserved and the instantaneous forward is constant on
/// each segment.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    points: PointSet,
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Fails if any y value is not strictly positive, or for the reasons
    /// listed on [`LinearInterpolator::new`](super::LinearInterpolator::new).
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if let Some(bad) = ys.iter().find(|y| **y <= 0.0) {
            return Err(MathError::invalid_input(format!(
                "log-linear interpolation requires positive values, got {bad}"
            )));
        }
        let points = PointSet::new(xs, ys)?;
        let log_ys = points.ys.iter().map(|y| y.ln()).collect();
        Ok(Self { points, log_ys })
    }

    fn log_slope(&self, i: usize) -> f64 {
        (self.log_ys[i + 1] - self.log_ys[i]) / (self.points.xs[i + 1] - self.points.xs[i])
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        match self.points.locate(x)? {
            Location::Pillar(i) => Ok(self.points.ys[i]),
            Location::Segment(i) => {
                let log_y = self.log_ys[i] + self.log_slope(i) * (x - self.points.xs[i]);
                Ok(log_y.exp())
            }
        }
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        let location = self.points.locate(x)?;
        let y = self.interpolate(x)?;
        Ok(y * self.log_slope(self.points.segment_of(location)))
    }

    fn min_x(&self) -> f64 {
        self.points.min_x()
    }

    fn max_x(&self) -> f64 {
        self.points.max_x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_forward_between_pillars() {
        let r = 0.05_f64;
        let xs = vec![0.0, 1.0, 2.0];
        let ys: Vec<f64> = xs.iter().map(|t| (-r * t).exp()).collect();
        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        for t in [0.25, 0.5, 1.3, 1.9] {
            assert_relative_eq!(interp.interpolate(t).unwrap(), (-r * t).exp(), epsilon = 1e-14);
            let fwd = -interp.derivative(t).unwrap() / interp.interpolate(t).unwrap();
            assert_relative_eq!(fwd, r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, -0.5]).is_err());
    }
}
