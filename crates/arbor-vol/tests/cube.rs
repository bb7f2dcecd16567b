//! Swaption cube: 2 expiries × 4 tenors × 3 strikes.

use arbor_core::types::Period;
use arbor_vol::prelude::*;
use proptest::prelude::*;

const STRIKES: [f64; 3] = [0.25, 0.5, 0.75];

fn expiries() -> Vec<Period> {
    vec![Period::months(6), Period::years(1)]
}

fn tenors() -> Vec<Period> {
    vec![Period::years(1), Period::years(2), Period::years(5), Period::years(10)]
}

fn stored(i: usize, j: usize, l: usize) -> f64 {
    0.30 - 0.02 * i as f64 - 0.01 * j as f64 - 0.04 * l as f64 + 0.001 * (i * j * l) as f64
}

fn matrix() -> Vec<Vec<f64>> {
    let mut rows = Vec::new();
    for i in 0..2 {
        for j in 0..4 {
            rows.push((0..3).map(|l| stored(i, j, l)).collect());
        }
    }
    rows
}

fn cube() -> VolatilityCube {
    VolatilityCube::from_matrix(&expiries(), &tenors(), &STRIKES, &matrix()).unwrap()
}

fn coordinate(expiry: Period, tenor: Period, strike: f64) -> VolCoordinate {
    VolCoordinate::new()
        .with_expiry(expiry)
        .with_tenor(tenor)
        .with_strike(strike)
}

#[test]
fn stored_coordinate_is_exact() {
    let cube = cube();
    assert_eq!(cube.rank(), 3);
    assert_eq!(cube.len(), 24);

    let v = cube
        .value(&coordinate(Period::years(1), Period::years(2), 0.25))
        .unwrap();
    assert_eq!(v, stored(1, 1, 0));
}

#[test]
fn expiry_below_minimum_returns_minimum_expiry() {
    let cube = cube();
    for tenor in tenors() {
        for strike in STRIKES {
            let short = cube.value(&coordinate(Period::months(3), tenor, strike)).unwrap();
            let first = cube.value(&coordinate(Period::months(6), tenor, strike)).unwrap();
            assert_eq!(short, first);
        }
    }
    // Off-pillar tenor and strike too
    let short = cube.value_at(0.25, 3.0, 0.4).unwrap();
    let first = cube.value_at(0.5, 3.0, 0.4).unwrap();
    assert_eq!(short, first);
}

#[test]
fn strike_above_maximum_is_flat() {
    let cube = cube();
    let top = cube.value(&coordinate(Period::years(1), Period::years(5), 0.75)).unwrap();
    let beyond = cube.value(&coordinate(Period::years(1), Period::years(5), 1.5)).unwrap();
    assert_eq!(beyond, top);
}

#[test]
fn point_order_does_not_matter() {
    let mut points = cube().points().to_vec();
    points.reverse();
    let shuffled = VolatilityCube::new(points).unwrap();
    for (a, b) in [(0.3, 7.0, 0.3), (0.75, 1.5, 0.6), (2.0, 0.5, 0.1)]
        .iter()
        .map(|(e, t, k)| (cube().value_at(*e, *t, *k).unwrap(), shuffled.value_at(*e, *t, *k).unwrap()))
    {
        assert_eq!(a, b);
    }
}

#[test]
fn serde_round_trip_rebuilds_the_grid() {
    let cube = cube();
    let json = serde_json::to_string(&cube).unwrap();
    let back: VolatilityCube = serde_json::from_str(&json).unwrap();
    assert_eq!(back.expiries(), cube.expiries());
    assert_eq!(back.tenors(), cube.tenors());
    assert_eq!(back.strikes(), cube.strikes());
    for (p, q) in back.points().iter().zip(cube.points()) {
        assert_eq!(p.coordinate, q.coordinate);
        approx::assert_relative_eq!(p.volatility, q.volatility, max_relative = 1e-15);
    }
}

#[test]
fn incomplete_grid_is_a_shape_mismatch() {
    let mut points = cube().points().to_vec();
    points.remove(5);
    assert!(matches!(
        VolatilityCube::new(points),
        Err(VolError::ShapeMismatch { .. })
    ));

    let mut rows = matrix();
    rows[3].push(0.1);
    assert!(matches!(
        VolatilityCube::from_matrix(&expiries(), &tenors(), &STRIKES, &rows),
        Err(VolError::ShapeMismatch { .. })
    ));
}

#[test]
fn smile_slice_feeds_calibration() {
    let cube = cube();
    let (strikes, vols) = cube.smile(1.0, 5.0).unwrap();
    assert_eq!(strikes, STRIKES.to_vec());
    let expected: Vec<f64> = (0..3).map(|l| stored(1, 2, l)).collect();
    assert_eq!(vols, expected);
}

fn grid_bounds() -> (f64, f64) {
    let all: Vec<f64> = matrix().into_iter().flatten().collect();
    let lo = all.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

proptest! {
    #[test]
    fn stored_values_are_exact(i in 0usize..2, j in 0usize..4, l in 0usize..3) {
        let c = coordinate(expiries()[i], tenors()[j], STRIKES[l]);
        prop_assert_eq!(cube().value(&c).unwrap(), stored(i, j, l));
    }

    #[test]
    fn flat_beyond_every_axis(
        e in 0.0f64..3.0,
        t in 0.0f64..20.0,
        below in 0.0f64..0.25,
        above in 0.0f64..5.0,
    ) {
        let cube = cube();
        prop_assert_eq!(
            cube.value_at(e, t, 0.25 - below).unwrap(),
            cube.value_at(e, t, 0.25).unwrap()
        );
        prop_assert_eq!(
            cube.value_at(e, t, 0.75 + above).unwrap(),
            cube.value_at(e, t, 0.75).unwrap()
        );
        prop_assert_eq!(
            cube.value_at(e, 10.0 + above, 0.5).unwrap(),
            cube.value_at(e, 10.0, 0.5).unwrap()
        );
        prop_assert_eq!(
            cube.value_at(1.0 + above, t, 0.5).unwrap(),
            cube.value_at(1.0, t, 0.5).unwrap()
        );
    }

    #[test]
    fn interpolated_values_stay_within_the_grid(
        e in 0.0f64..2.0,
        t in 0.0f64..15.0,
        k in 0.0f64..1.0,
    ) {
        let (lo, hi) = grid_bounds();
        let v = cube().value_at(e, t, k).unwrap();
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }
}
