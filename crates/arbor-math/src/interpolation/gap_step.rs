//! Central-bank "gap-step" interpolation.
//!
//! Overnight-indexed rates only move on policy decision dates. Between two
//! pillars the interpolated log-value therefore keeps the slope (the
//! overnight forward) of the previous segment up to the first decision date
//! inside the segment, and from that date uses the single slope that lands
//! exactly on the next pillar:
//!
//! ```text
//! ln y
//!  │            pillar i+1
//!  │           ●
//!  │         ╱   slope solved to hit the pillar
//!  │   ●───●     slope carried from segment i-1
//!  │ pillar i  decision date
//!  └──────────────────────────── x
//! ```
//!
//! Segments without a decision date, and the first segment (which has no
//! previous slope to carry), are plain log-linear. When several decision
//! dates fall inside one segment only the first produces a step; the
//! pillars do not carry enough information to place more.

use super::{Interpolator, Location, PointSet};
use crate::error::{MathError, MathResult};

#[derive(Debug, Clone, Copy)]
struct Piece {
    /// Decision date inside the segment and the log-value reached there.
    step: Option<(f64, f64)>,
    slope_before: f64,
    slope_after: f64,
}

/// Log-value interpolation that steps the forward at decision dates.
#[derive(Debug, Clone)]
pub struct GapStepInterpolator {
    points: PointSet,
    log_ys: Vec<f64>,
    pieces: Vec<Piece>,
}

impl GapStepInterpolator {
    /// Creates a gap-step interpolator.
    ///
    /// `step_points` are the decision dates expressed on the same axis as
    /// `xs`; they need not be sorted and may lie outside the pillar range.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, step_points: &[f64]) -> MathResult<Self> {
        if let Some(bad) = ys.iter().find(|y| **y <= 0.0) {
            return Err(MathError::invalid_input(format!(
                "gap-step interpolation requires positive values, got {bad}"
            )));
        }
        let points = PointSet::new(xs, ys)?;
        let log_ys: Vec<f64> = points.ys.iter().map(|y| y.ln()).collect();

        let mut steps: Vec<f64> = step_points.iter().copied().filter(|s| s.is_finite()).collect();
        steps.sort_by(f64::total_cmp);

        let mut pieces: Vec<Piece> = Vec::with_capacity(points.len() - 1);
        for i in 0..points.len() - 1 {
            let (x0, x1) = (points.xs[i], points.xs[i + 1]);
            let (l0, l1) = (log_ys[i], log_ys[i + 1]);
            let plain = (l1 - l0) / (x1 - x0);
            let inside = steps.iter().copied().find(|s| *s > x0 && *s < x1);

            let piece = match (inside, pieces.last()) {
                (Some(m), Some(prev)) => {
                    let carried = prev.slope_after;
                    let l_m = l0 + carried * (m - x0);
                    Piece {
                        step: Some((m, l_m)),
                        slope_before: carried,
                        slope_after: (l1 - l_m) / (x1 - m),
                    }
                }
                _ => Piece {
                    step: None,
                    slope_before: plain,
                    slope_after: plain,
                },
            };
            pieces.push(piece);
        }

        Ok(Self {
            points,
            log_ys,
            pieces,
        })
    }

    fn log_value(&self, i: usize, x: f64) -> f64 {
        let piece = self.pieces[i];
        match piece.step {
            Some((m, l_m)) if x > m => l_m + piece.slope_after * (x - m),
            _ => self.log_ys[i] + piece.slope_before * (x - self.points.xs[i]),
        }
    }

    fn log_slope(&self, i: usize, x: f64) -> f64 {
        let piece = self.pieces[i];
        match piece.step {
            Some((m, _)) if x >= m => piece.slope_after,
            _ => piece.slope_before,
        }
    }
}

impl Interpolator for GapStepInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        match self.points.locate(x)? {
            Location::Pillar(i) => Ok(self.points.ys[i]),
            Location::Segment(i) => Ok(self.log_value(i, x).exp()),
        }
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        let location = self.points.locate(x)?;
        let i = self.points.segment_of(location);
        Ok(self.interpolate(x)? * self.log_slope(i, x))
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

    fn forward(interp: &GapStepInterpolator, x: f64) -> f64 {
        -interp.derivative(x).unwrap() / interp.interpolate(x).unwrap()
    }

    #[test]
    fn test_no_steps_is_log_linear() {
        let xs = vec![0.0, 0.5, 1.0];
        let ys = vec![1.0, 0.99, 0.975];
        let gap = GapStepInterpolator::new(xs.clone(), ys.clone(), &[]).unwrap();
        let log_lin = super::super::LogLinearInterpolator::new(xs, ys).unwrap();
        for x in [0.1, 0.4, 0.75, 0.99] {
            assert_relative_eq!(
                gap.interpolate(x).unwrap(),
                log_lin.interpolate(x).unwrap(),
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_forward_held_until_decision_date() {
        // 4% for the first half year, then pillar at 1y implies a higher average
        let xs = vec![0.0, 0.5, 1.0];
        let ys = vec![1.0, (-0.04_f64 * 0.5).exp(), (-0.045_f64).exp()];
        let gap = GapStepInterpolator::new(xs, ys.clone(), &[0.75]).unwrap();

        assert_relative_eq!(forward(&gap, 0.6), 0.04, epsilon = 1e-12);
        assert_relative_eq!(forward(&gap, 0.7), 0.04, epsilon = 1e-12);
        // after the step: 0.045 = 0.5*0.04 + 0.25*0.04 + 0.25*f  =>  f = 0.06
        assert_relative_eq!(forward(&gap, 0.9), 0.06, epsilon = 1e-12);
        assert_eq!(gap.interpolate(1.0).unwrap(), ys[2]);
    }

    #[test]
    fn test_first_segment_has_no_carry() {
        let xs = vec![0.0, 1.0];
        let ys = vec![1.0, (-0.03_f64).exp()];
        let gap = GapStepInterpolator::new(xs, ys, &[0.5]).unwrap();
        assert_relative_eq!(forward(&gap, 0.25), 0.03, epsilon = 1e-12);
        assert_relative_eq!(forward(&gap, 0.75), 0.03, epsilon = 1e-12);
    }
}
