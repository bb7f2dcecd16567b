//! Expiry × strike volatility surface.

use arbor_core::types::Period;
use serde::{Deserialize, Serialize};

use crate::cube::{VolAxis, VolatilityCube};
use crate::error::{VolError, VolResult};
use crate::point::{VolCoordinate, VolatilityPoint};

/// A volatility surface over expiry and strike.
///
/// Thin wrapper over a [`VolatilityCube`] whose tenor axis is absent.
/// Serializes as its list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VolatilityPoint>", into = "Vec<VolatilityPoint>")]
pub struct VolatilitySurface {
    cube: VolatilityCube,
}

impl VolatilitySurface {
    /// Builds a surface from a complete expiry × strike grid.
    ///
    /// Points may carry a tenor as long as all of them share it.
    pub fn new(points: Vec<VolatilityPoint>) -> VolResult<Self> {
        let cube = VolatilityCube::new(points)?;
        if !cube.is_absent(VolAxis::Tenor) {
            return Err(VolError::shape_mismatch(format!(
                "surface points span {} tenors",
                cube.tenors().len()
            )));
        }
        Ok(Self { cube })
    }

    /// Builds a surface from expiry and strike headers and one row of
    /// volatilities per expiry.
    pub fn from_matrix(expiries: &[Period], strikes: &[f64], values: &[Vec<f64>]) -> VolResult<Self> {
        Ok(Self {
            cube: VolatilityCube::from_matrix(expiries, &[], strikes, values)?,
        })
    }

    /// The volatility at an expiry and strike.
    pub fn value(&self, expiry: Period, strike: f64) -> VolResult<f64> {
        self.cube
            .value(&VolCoordinate::new().with_expiry(expiry).with_strike(strike))
    }

    /// The volatility at an expiry in years and a strike.
    pub fn value_at(&self, expiry: f64, strike: f64) -> VolResult<f64> {
        self.cube.value_at(expiry, 0.0, strike)
    }

    /// The strike slice at an expiry in years, as `(strikes, vols)`.
    pub fn smile(&self, expiry: f64) -> VolResult<(Vec<f64>, Vec<f64>)> {
        self.cube.smile(expiry, 0.0)
    }

    /// Expiry pillars in years.
    pub fn expiries(&self) -> &[f64] {
        self.cube.expiries()
    }

    /// Strike pillars.
    pub fn strikes(&self) -> &[f64] {
        self.cube.strikes()
    }

    /// The points the surface was built from.
    pub fn points(&self) -> &[VolatilityPoint] {
        self.cube.points()
    }

    /// The underlying cube.
    pub fn cube(&self) -> &VolatilityCube {
        &self.cube
    }
}

impl TryFrom<Vec<VolatilityPoint>> for VolatilitySurface {
    type Error = VolError;

    fn try_from(points: Vec<VolatilityPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<VolatilitySurface> for Vec<VolatilityPoint> {
    fn from(surface: VolatilitySurface) -> Self {
        surface.cube.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn equity_surface() -> VolatilitySurface {
        VolatilitySurface::from_matrix(
            &[Period::months(3), Period::years(1), Period::years(2)],
            &[80.0, 100.0, 120.0],
            &[
                vec![0.32, 0.25, 0.22],
                vec![0.29, 0.24, 0.21],
                vec![0.27, 0.23, 0.21],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pillars_and_interpolation() {
        let surface = equity_surface();
        assert_eq!(surface.value(Period::years(1), 100.0).unwrap(), 0.24);
        assert_relative_eq!(surface.value_at(1.5, 110.0).unwrap(), 0.2225, epsilon = 1e-14);
        // Flat below the first expiry and beyond the last strike
        assert_eq!(surface.value(Period::days(7), 150.0).unwrap(), 0.22);
    }

    #[test]
    fn test_rejects_tenor_axis() {
        let points = vec![
            VolatilityPoint::swaption(Period::years(1), Period::years(2), 0.02, 0.2),
            VolatilityPoint::swaption(Period::years(1), Period::years(5), 0.02, 0.19),
        ];
        assert!(matches!(
            VolatilitySurface::new(points),
            Err(VolError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_points_round_trip() {
        let surface = equity_surface();
        let json = serde_json::to_string(&surface).unwrap();
        let back: VolatilitySurface = serde_json::from_str(&json).unwrap();
        assert_eq!(back, surface);
        assert_eq!(back.points().len(), 9);
    }
}
