//! Interpolation over strictly ordered point sets.
//!
//! # Available Methods
//!
//! | Method | Interpolated quantity | Typical use |
//! |--------|-----------------------|-------------|
//! | [`LinearInterpolator`] | value | zero rates, spreads, vol axes |
//! | [`LogLinearInterpolator`] | ln(value) | discount factors (piecewise flat forwards) |
//! | [`FlatInterpolator`] | step, value of the next pillar | forward curves quoted per period |
//! | [`GapStepInterpolator`] | ln(value), forward held until a decision date | overnight-indexed short ends |
//!
//! Every interpolator requires at least two pillars with strictly increasing
//! abscissae and returns the stored ordinate unchanged when queried exactly at
//! a pillar. Queries outside `[min_x, max_x]` fail with
//! [`MathError::ExtrapolationNotAllowed`]; continuation beyond the pillars is
//! the job of [`ExtrapolationMethod`](crate::extrapolation::ExtrapolationMethod).

mod flat;
mod gap_step;
mod linear;
mod log_linear;

pub use flat::FlatInterpolator;
pub use gap_step::GapStepInterpolator;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    ///
    /// At a pillar the derivative of the segment to its right is returned
    /// (to its left for the last pillar).
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Where a query falls relative to the pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location {
    /// Exactly on pillar `i`.
    Pillar(usize),
    /// Strictly inside segment `(xs[i], xs[i + 1])`.
    Segment(usize),
}

/// Validated abscissae/ordinates shared by the interpolators.
#[derive(Debug, Clone)]
pub(crate) struct PointSet {
    pub(crate) xs: Vec<f64>,
    pub(crate) ys: Vec<f64>,
}

impl PointSet {
    pub(crate) fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() < 2 {
            return Err(MathError::insufficient_data(2, xs.len()));
        }
        if xs.len() != ys.len() {
            return Err(MathError::invalid_input(format!(
                "xs and ys must have same length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(MathError::invalid_input("points must be finite"));
        }
        MathError::check_increasing(&xs)?;
        Ok(Self { xs, ys })
    }

    pub(crate) fn len(&self) -> usize {
        self.xs.len()
    }

    pub(crate) fn min_x(&self) -> f64 {
        self.xs[0]
    }

    pub(crate) fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    /// Locates `x`, rejecting points outside the pillar range.
    pub(crate) fn locate(&self, x: f64) -> MathResult<Location> {
        if x.is_nan() || x < self.min_x() || x > self.max_x() {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }
        match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => Ok(Location::Pillar(i)),
            Err(i) => Ok(Location::Segment(i - 1)),
        }
    }

    /// Segment used for derivatives at `location`.
    pub(crate) fn segment_of(&self, location: Location) -> usize {
        match location {
            Location::Pillar(i) => i.min(self.len() - 2),
            Location::Segment(i) => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_set_validation() {
        assert_eq!(
            PointSet::new(vec![1.0], vec![1.0]).unwrap_err(),
            MathError::insufficient_data(2, 1)
        );
        assert!(PointSet::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(PointSet::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(PointSet::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_locate() {
        let ps = PointSet::new(vec![0.0, 1.0, 2.0], vec![0.0; 3]).unwrap();
        assert_eq!(ps.locate(1.0).unwrap(), Location::Pillar(1));
        assert_eq!(ps.locate(1.5).unwrap(), Location::Segment(1));
        assert_eq!(ps.locate(0.0).unwrap(), Location::Pillar(0));
        assert_eq!(ps.segment_of(Location::Pillar(2)), 1);
        assert!(ps.locate(2.5).is_err());
        assert!(ps.locate(f64::NAN).is_err());
    }
}
