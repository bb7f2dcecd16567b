//! Expiry × tenor × strike volatility cube.
//!
//! A cube is a complete grid of [`VolatilityPoint`]s. Each axis is inferred
//! from the distinct coordinates of the points:
//!
//! | Distinct coordinates | Axis |
//! |----------------------|------|
//! | none (unset on every point) | absent, unit length |
//! | one | absent, unit length |
//! | two or more | present, sorted ascending |
//!
//! Queries resolve strike first, then tenor, then expiry, each by linear
//! interpolation with the boundary value held flat outside the pillars.
//! Absent axes ignore the query coordinate. A query on a stored coordinate
//! returns the stored volatility unchanged.

use std::fmt;

use arbor_core::types::Period;
use arbor_math::extrapolation::ExtrapolationMethod;
use arbor_math::interpolation::LinearInterpolator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VolError, VolResult};
use crate::point::{VolCoordinate, VolatilityPoint};

/// One of the three cube axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolAxis {
    /// Option expiry, in years.
    Expiry,
    /// Underlying tenor, in years.
    Tenor,
    /// Absolute strike.
    Strike,
}

impl VolAxis {
    /// All axes in storage order.
    pub const ALL: [VolAxis; 3] = [VolAxis::Expiry, VolAxis::Tenor, VolAxis::Strike];

    fn coordinate(self, c: &VolCoordinate) -> Option<f64> {
        match self {
            VolAxis::Expiry => c.expiry_years(),
            VolAxis::Tenor => c.tenor_years(),
            VolAxis::Strike => c.strike,
        }
    }
}

impl fmt::Display for VolAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VolAxis::Expiry => "expiry",
            VolAxis::Tenor => "tenor",
            VolAxis::Strike => "strike",
        };
        f.write_str(name)
    }
}

/// A volatility cube over up to three axes.
///
/// # Example
///
/// ```rust
/// use arbor_core::types::Period;
/// use arbor_vol::prelude::*;
///
/// let points = vec![
///     VolatilityPoint::option(Period::months(6), 0.9, 0.25),
///     VolatilityPoint::option(Period::months(6), 1.1, 0.21),
///     VolatilityPoint::option(Period::years(1), 0.9, 0.23),
///     VolatilityPoint::option(Period::years(1), 1.1, 0.20),
/// ];
/// let cube = VolatilityCube::new(points).unwrap();
/// assert!(cube.is_absent(VolAxis::Tenor));
///
/// // Below the lowest strike the lowest-strike value is returned
/// let v = cube.value_at(1.0, 0.0, 0.5).unwrap();
/// assert_eq!(v, 0.23);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VolatilityPoint>", into = "Vec<VolatilityPoint>")]
pub struct VolatilityCube {
    points: Vec<VolatilityPoint>,
    expiries: Vec<f64>,
    tenors: Vec<f64>,
    strikes: Vec<f64>,
    /// Row-major over (expiry, tenor, strike).
    values: Vec<f64>,
}

impl VolatilityCube {
    /// Builds a cube from a complete grid of points.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` for an empty point set
    /// - `ShapeMismatch` when an axis is set on some points only, when two
    ///   points share a coordinate, or when the points do not cover every
    ///   (expiry, tenor, strike) combination
    /// - `InvalidInput` for non-finite coordinates or volatilities
    pub fn new(points: Vec<VolatilityPoint>) -> VolResult<Self> {
        if points.is_empty() {
            return Err(VolError::insufficient_data(1, 0));
        }
        for p in &points {
            if !p.volatility.is_finite() {
                return Err(VolError::invalid_input(format!(
                    "non-finite volatility at {}",
                    p.coordinate
                )));
            }
        }

        let expiries = axis_pillars(&points, VolAxis::Expiry)?;
        let tenors = axis_pillars(&points, VolAxis::Tenor)?;
        let strikes = axis_pillars(&points, VolAxis::Strike)?;

        let (nt, ns) = (tenors.len(), strikes.len());
        let mut grid: Vec<Option<f64>> = vec![None; expiries.len() * nt * ns];
        for p in &points {
            let i = pillar_index(&expiries, VolAxis::Expiry, &p.coordinate);
            let j = pillar_index(&tenors, VolAxis::Tenor, &p.coordinate);
            let k = pillar_index(&strikes, VolAxis::Strike, &p.coordinate);
            let slot = &mut grid[(i * nt + j) * ns + k];
            if slot.is_some() {
                return Err(VolError::shape_mismatch(format!(
                    "duplicate point at {}",
                    p.coordinate
                )));
            }
            *slot = Some(p.volatility);
        }

        let values = grid.into_iter().collect::<Option<Vec<f64>>>().ok_or_else(|| {
            VolError::shape_mismatch(format!(
                "{} points do not form a complete {}x{}x{} grid",
                points.len(),
                expiries.len(),
                nt,
                ns
            ))
        })?;

        debug!(
            expiries = expiries.len(),
            tenors = nt,
            strikes = ns,
            "built volatility cube"
        );

        Ok(Self {
            points,
            expiries,
            tenors,
            strikes,
            values,
        })
    }

    /// Builds a cube from coordinate headers and a value matrix.
    ///
    /// `values` holds one row per (expiry, tenor) pair, expiry-major, and one
    /// column per strike. An empty header marks the axis as absent, in which
    /// case it contributes a single row (or column).
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the matrix dimensions disagree with the headers,
    /// plus any error of [`VolatilityCube::new`].
    pub fn from_matrix(
        expiries: &[Period],
        tenors: &[Period],
        strikes: &[f64],
        values: &[Vec<f64>],
    ) -> VolResult<Self> {
        let expiry_axis = header(expiries);
        let tenor_axis = header(tenors);
        let strike_axis = header(strikes);

        let rows = expiry_axis.len() * tenor_axis.len();
        if values.len() != rows {
            return Err(VolError::shape_mismatch(format!(
                "{} value rows for {} (expiry, tenor) pairs",
                values.len(),
                rows
            )));
        }

        let mut points = Vec::with_capacity(rows * strike_axis.len());
        for (i, expiry) in expiry_axis.iter().enumerate() {
            for (j, tenor) in tenor_axis.iter().enumerate() {
                let row = &values[i * tenor_axis.len() + j];
                if row.len() != strike_axis.len() {
                    return Err(VolError::shape_mismatch(format!(
                        "row {} has {} values for {} strikes",
                        i * tenor_axis.len() + j,
                        row.len(),
                        strike_axis.len()
                    )));
                }
                for (strike, vol) in strike_axis.iter().zip(row) {
                    let coordinate = VolCoordinate {
                        expiry: *expiry,
                        tenor: *tenor,
                        strike: *strike,
                    };
                    points.push(VolatilityPoint::new(coordinate, *vol));
                }
            }
        }
        Self::new(points)
    }

    /// The volatility at a coordinate.
    ///
    /// Coordinates on absent axes are ignored; a present axis must be set.
    pub fn value(&self, coordinate: &VolCoordinate) -> VolResult<f64> {
        let expiry = self.query(VolAxis::Expiry, coordinate)?;
        let tenor = self.query(VolAxis::Tenor, coordinate)?;
        let strike = self.query(VolAxis::Strike, coordinate)?;
        self.value_at(expiry, tenor, strike)
    }

    /// The volatility at an expiry and tenor in years and an absolute strike.
    pub fn value_at(&self, expiry: f64, tenor: f64, strike: f64) -> VolResult<f64> {
        let by_expiry = (0..self.expiries.len())
            .map(|i| {
                let by_tenor = (0..self.tenors.len())
                    .map(|j| interpolate_axis(&self.strikes, strike, self.row(i, j).to_vec()))
                    .collect::<VolResult<Vec<f64>>>()?;
                interpolate_axis(&self.tenors, tenor, by_tenor)
            })
            .collect::<VolResult<Vec<f64>>>()?;
        interpolate_axis(&self.expiries, expiry, by_expiry)
    }

    /// The strike slice at an expiry and tenor in years, as `(strikes, vols)`.
    ///
    /// Pairs with [`SabrCalibrationEngine::full`](crate::sabr::SabrCalibrationEngine::full).
    pub fn smile(&self, expiry: f64, tenor: f64) -> VolResult<(Vec<f64>, Vec<f64>)> {
        let vols = self
            .strikes
            .iter()
            .map(|k| self.value_at(expiry, tenor, *k))
            .collect::<VolResult<Vec<f64>>>()?;
        Ok((self.strikes.clone(), vols))
    }

    /// The points the cube was built from.
    pub fn points(&self) -> &[VolatilityPoint] {
        &self.points
    }

    /// Expiry pillars in years.
    pub fn expiries(&self) -> &[f64] {
        &self.expiries
    }

    /// Tenor pillars in years.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Strike pillars.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Pillars of one axis.
    pub fn pillars(&self, axis: VolAxis) -> &[f64] {
        match axis {
            VolAxis::Expiry => &self.expiries,
            VolAxis::Tenor => &self.tenors,
            VolAxis::Strike => &self.strikes,
        }
    }

    /// True when the axis was materialized with unit length.
    pub fn is_absent(&self, axis: VolAxis) -> bool {
        self.pillars(axis).len() == 1
    }

    /// The axes with unit length.
    pub fn absent_axes(&self) -> Vec<VolAxis> {
        VolAxis::ALL
            .into_iter()
            .filter(|a| self.is_absent(*a))
            .collect()
    }

    /// Number of present axes.
    pub fn rank(&self) -> usize {
        3 - self.absent_axes().len()
    }

    /// Number of stored volatilities.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed cube.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn row(&self, i: usize, j: usize) -> &[f64] {
        let ns = self.strikes.len();
        let start = (i * self.tenors.len() + j) * ns;
        &self.values[start..start + ns]
    }

    fn query(&self, axis: VolAxis, coordinate: &VolCoordinate) -> VolResult<f64> {
        if self.is_absent(axis) {
            return Ok(self.pillars(axis)[0]);
        }
        axis.coordinate(coordinate).ok_or_else(|| {
            VolError::invalid_input(format!("{coordinate} has no {axis} for a cube spanning it"))
        })
    }
}

impl TryFrom<Vec<VolatilityPoint>> for VolatilityCube {
    type Error = VolError;

    fn try_from(points: Vec<VolatilityPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<VolatilityCube> for Vec<VolatilityPoint> {
    fn from(cube: VolatilityCube) -> Self {
        cube.points
    }
}

/// Linear interpolation on one axis, flat beyond the pillars.
pub(crate) fn interpolate_axis(pillars: &[f64], x: f64, values: Vec<f64>) -> VolResult<f64> {
    if pillars.len() == 1 {
        return values
            .first()
            .copied()
            .ok_or_else(|| VolError::insufficient_data(1, 0));
    }
    let interp = LinearInterpolator::new(pillars.to_vec(), values)?;
    Ok(ExtrapolationMethod::Flat.value(&interp, x)?)
}

fn header<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.iter().copied().map(Some).collect()
    }
}

/// Distinct sorted coordinates of an axis; `[0.0]` when the axis is unset.
fn axis_pillars(points: &[VolatilityPoint], axis: VolAxis) -> VolResult<Vec<f64>> {
    let coords: Vec<Option<f64>> = points.iter().map(|p| axis.coordinate(&p.coordinate)).collect();
    let set = coords.iter().filter(|c| c.is_some()).count();
    if set == 0 {
        return Ok(vec![0.0]);
    }
    if set != coords.len() {
        return Err(VolError::shape_mismatch(format!(
            "{axis} is set on {set} of {} points",
            coords.len()
        )));
    }

    let mut pillars: Vec<f64> = coords.into_iter().flatten().collect();
    if let Some(bad) = pillars.iter().find(|x| !x.is_finite()) {
        return Err(VolError::invalid_input(format!("non-finite {axis} coordinate {bad}")));
    }
    pillars.sort_by(f64::total_cmp);
    pillars.dedup();
    Ok(pillars)
}

fn pillar_index(pillars: &[f64], axis: VolAxis, coordinate: &VolCoordinate) -> usize {
    match axis.coordinate(coordinate) {
        Some(x) => pillars.partition_point(|p| *p < x),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn swaption_grid() -> VolatilityCube {
        VolatilityCube::from_matrix(
            &[Period::months(6), Period::years(1)],
            &[Period::years(2), Period::years(5)],
            &[0.01, 0.03],
            &[
                vec![0.30, 0.20],
                vec![0.28, 0.18],
                vec![0.26, 0.16],
                vec![0.24, 0.14],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_axis_inference() {
        let cube = swaption_grid();
        assert_eq!(cube.rank(), 3);
        assert_eq!(cube.expiries(), &[0.5, 1.0]);
        assert_eq!(cube.tenors(), &[2.0, 5.0]);
        assert_eq!(cube.len(), 8);

        // A tenor shared by every point collapses the axis
        let points = vec![
            VolatilityPoint::swaption(Period::years(1), Period::years(10), 0.02, 0.2),
            VolatilityPoint::swaption(Period::years(1), Period::years(10), 0.04, 0.18),
        ];
        let cube = VolatilityCube::new(points).unwrap();
        assert_eq!(cube.absent_axes(), vec![VolAxis::Expiry, VolAxis::Tenor]);
        assert_eq!(cube.rank(), 1);
        assert_relative_eq!(cube.value_at(7.0, 0.0, 0.03).unwrap(), 0.19, epsilon = 1e-15);
    }

    #[test]
    fn test_trilinear_midpoint() {
        let cube = swaption_grid();
        // Average of all eight corners
        let v = cube.value_at(0.75, 3.5, 0.02).unwrap();
        assert_relative_eq!(v, 0.22, epsilon = 1e-14);
    }

    #[test]
    fn test_precedence_on_a_slice() {
        let cube = swaption_grid();
        let v = cube.value_at(1.0, 3.5, 0.01).unwrap();
        assert_relative_eq!(v, 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_flat_on_every_axis() {
        let cube = swaption_grid();
        assert_eq!(cube.value_at(0.1, 2.0, 0.01).unwrap(), 0.30);
        assert_eq!(cube.value_at(0.5, 30.0, 0.01).unwrap(), 0.28);
        assert_eq!(cube.value_at(0.5, 2.0, 0.5).unwrap(), 0.20);
        assert_eq!(cube.value_at(9.0, 9.0, 9.0).unwrap(), 0.14);
    }

    #[test]
    fn test_matrix_shape_errors() {
        let err = VolatilityCube::from_matrix(
            &[Period::months(6), Period::years(1)],
            &[],
            &[0.01, 0.03],
            &[vec![0.3, 0.2]],
        )
        .unwrap_err();
        assert!(matches!(err, VolError::ShapeMismatch { .. }));

        let err = VolatilityCube::from_matrix(&[Period::months(6)], &[], &[0.01, 0.03], &[vec![0.3]])
            .unwrap_err();
        assert!(matches!(err, VolError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_incomplete_and_duplicate_points() {
        let mut points = vec![
            VolatilityPoint::option(Period::months(6), 0.9, 0.25),
            VolatilityPoint::option(Period::months(6), 1.1, 0.21),
            VolatilityPoint::option(Period::years(1), 0.9, 0.23),
        ];
        let err = VolatilityCube::new(points.clone()).unwrap_err();
        assert!(matches!(err, VolError::ShapeMismatch { .. }));

        points.push(VolatilityPoint::option(Period::months(6), 0.9, 0.26));
        let err = VolatilityCube::new(points).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_partially_set_axis() {
        let points = vec![
            VolatilityPoint::option(Period::months(6), 0.9, 0.25),
            VolatilityPoint::swaption(Period::months(6), Period::years(2), 1.1, 0.21),
        ];
        let err = VolatilityCube::new(points).unwrap_err();
        assert_eq!(err.to_string(), "Shape mismatch: tenor is set on 1 of 2 points");
    }

    #[test]
    fn test_query_needs_present_axes() {
        let cube = swaption_grid();
        let coord = VolCoordinate::new().with_expiry(Period::years(1)).with_strike(0.01);
        assert!(matches!(cube.value(&coord), Err(VolError::InvalidInput { .. })));
        assert!(VolatilityCube::new(vec![]).is_err());
    }

    #[test]
    fn test_smile_slice() {
        let cube = swaption_grid();
        let (strikes, vols) = cube.smile(0.5, 5.0).unwrap();
        assert_eq!(strikes, vec![0.01, 0.03]);
        assert_eq!(vols, vec![0.28, 0.18]);
    }
}
