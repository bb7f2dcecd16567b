//! Piecewise-constant (step) interpolation.

use super::{Interpolator, Location, PointSet};
use crate::error::MathResult;

/// Step interpolation: on `(x[i], x[i+1]]` the value is `y[i+1]`.
///
/// Each pillar's value applies backward to the previous pillar, which is
/// how period-quoted forwards (futures strips, index fixings per period)
/// are usually laid out.
#[derive(Debug, Clone)]
pub struct FlatInterpolator {
    points: PointSet,
}

impl FlatInterpolator {
    /// Creates a new step interpolator.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        Ok(Self {
            points: PointSet::new(xs, ys)?,
        })
    }
}

impl Interpolator for FlatInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        match self.points.locate(x)? {
            Location::Pillar(i) => Ok(self.points.ys[i]),
            Location::Segment(i) => Ok(self.points.ys[i + 1]),
        }
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        self.points.locate(x)?;
        Ok(0.0)
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

    #[test]
    fn test_backward_flat() {
        let interp = FlatInterpolator::new(vec![0.0, 1.0, 2.0], vec![10.0, 20.0, 30.0]).unwrap();
        assert_eq!(interp.interpolate(0.0).unwrap(), 10.0);
        assert_eq!(interp.interpolate(0.01).unwrap(), 20.0);
        assert_eq!(interp.interpolate(1.0).unwrap(), 20.0);
        assert_eq!(interp.interpolate(1.5).unwrap(), 30.0);
        assert_eq!(interp.derivative(1.5).unwrap(), 0.0);
    }
}
