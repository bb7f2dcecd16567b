//! Flat extrapolation.

use super::Extrapolator;

/// Holds the boundary pillar's value constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatExtrapolator;

impl Extrapolator for FlatExtrapolator {
    fn extrapolate(
        &self,
        _x: f64,
        _boundary_x: f64,
        boundary_value: f64,
        _boundary_slope: f64,
    ) -> f64 {
        boundary_value
    }

    fn name(&self) -> &'static str {
        "Flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_ignores_slope() {
        assert_eq!(FlatExtrapolator.extrapolate(30.0, 10.0, 0.04, 0.5), 0.04);
        assert_eq!(FlatExtrapolator.extrapolate(-1.0, 0.0, 0.02, -3.0), 0.02);
    }
}
