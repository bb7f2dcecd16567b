//! Linear interpolation.

use super::{Interpolator, Location, PointSet};
use crate::error::MathResult;

/// Linear interpolation between consecutive pillars.
///
/// # Example
///
/// ```rust
/// use arbor_math::interpolation::{LinearInterpolator, Interpolator};
///
/// let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).unwrap();
/// assert_eq!(interp.interpolate(1.5).unwrap(), 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    points: PointSet,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` for fewer than 2 points,
    /// `InvalidInput` for unequal lengths and `UnsortedPillars` for
    /// non-increasing xs.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        Ok(Self {
            points: PointSet::new(xs, ys)?,
        })
    }

    fn slope(&self, i: usize) -> f64 {
        let xs = &self.points.xs;
        let ys = &self.points.ys;
        (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i])
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        match self.points.locate(x)? {
            Location::Pillar(i) => Ok(self.points.ys[i]),
            Location::Segment(i) => {
                let x0 = self.points.xs[i];
                let x1 = self.points.xs[i + 1];
                let y0 = self.points.ys[i];
                let y1 = self.points.ys[i + 1];
                let t = (x - x0) / (x1 - x0);
                Ok(y0 + t * (y1 - y0))
            }
        }
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        let location = self.points.locate(x)?;
        Ok(self.slope(self.points.segment_of(location)))
    }

    fn min_x(&self) -> f64 {
        self.points.min_x()
    }

    fn max_x(&self) -> f64 {
        self.points.max_x()
    }
}
