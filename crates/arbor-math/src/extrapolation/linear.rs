//! Linear extrapolation.

use super::Extrapolator;

/// Continues the boundary slope.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearExtrapolator;

impl Extrapolator for LinearExtrapolator {
    fn extrapolate(&self, x: f64, boundary_x: f64, boundary_value: f64, boundary_slope: f64) -> f64 {
        boundary_value + boundary_slope * (x - boundary_x)
    }

    fn name(&self) -> &'static str {
        "Linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_both_directions() {
        assert_relative_eq!(LinearExtrapolator.extrapolate(12.0, 10.0, 0.04, 0.001), 0.042);
        assert_relative_eq!(LinearExtrapolator.extrapolate(0.0, 1.0, 0.03, 0.01), 0.02);
    }
}
