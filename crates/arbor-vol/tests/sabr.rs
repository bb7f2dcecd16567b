//! SABR calibration against smiles generated by known parameters.

use approx::assert_relative_eq;
use arbor_math::extrapolation::ExtrapolationMethod;
use arbor_math::interpolation::Interpolator;
use arbor_vol::prelude::*;

const FORWARD: f64 = 0.03;
const EXPIRY: f64 = 1.0;
const STRIKES: [f64; 7] = [0.015, 0.02, 0.025, 0.03, 0.035, 0.04, 0.05];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn true_params() -> SabrParameters {
    SabrParameters::new(0.035, 0.5, -0.3, 0.4).unwrap()
}

fn market_vols(params: &SabrParameters) -> Vec<f64> {
    STRIKES
        .iter()
        .map(|k| params.volatility(FORWARD, EXPIRY, *k).unwrap())
        .collect()
}

fn calibrated_engine() -> SabrCalibrationEngine {
    let settings = SabrCalibrationSettings::new(0.5).unwrap();
    let mut engine = SabrCalibrationEngine::full(
        settings,
        STRIKES.to_vec(),
        market_vols(&true_params()),
        FORWARD,
        EXPIRY,
    )
    .unwrap();
    engine.calibrate().unwrap();
    engine
}

#[test]
fn full_calibration_fits_the_smile() {
    init_tracing();
    let engine = calibrated_engine();
    assert_eq!(engine.state(), CalibrationState::Calibrated);
    assert_eq!(engine.kind(), CalibrationKind::Full);

    let market = market_vols(&true_params());
    for (k, v) in STRIKES.iter().zip(&market) {
        assert_relative_eq!(engine.volatility(*k).unwrap(), *v, epsilon = 1e-5);
    }
    assert!(engine.calibration_error().unwrap() < 1e-10);

    let fitted = engine.parameters().unwrap();
    assert!(fitted.is_calibrated());
    assert_eq!(fitted.beta(), 0.5);
    assert_relative_eq!(fitted.rho(), -0.3, epsilon = 1e-2);
    assert_relative_eq!(fitted.nu(), 0.4, epsilon = 1e-2);
    assert_relative_eq!(fitted.alpha(), 0.035, max_relative = 1e-2);
}

#[test]
fn atm_only_calibration_recovers_full_alpha() {
    init_tracing();
    let full = calibrated_engine();
    let guess = full.initial_guess().unwrap();

    let settings = SabrCalibrationSettings::new(0.5).unwrap();
    let mut atm = SabrCalibrationEngine::atm(
        settings,
        full.nu().unwrap(),
        full.rho().unwrap(),
        guess.atm_volatility,
        FORWARD,
        EXPIRY,
    )
    .unwrap();
    assert!(atm.alpha().is_err());
    atm.calibrate().unwrap();

    assert_eq!(atm.kind(), CalibrationKind::AtmOnly);
    assert_relative_eq!(atm.alpha().unwrap(), full.alpha().unwrap(), max_relative = 1e-12);
}

#[test]
fn atm_only_reproduces_the_atm_volatility() {
    let settings = SabrCalibrationSettings::new(0.7).unwrap();
    for (nu, rho, atm_vol) in [(0.0, 0.0, 0.15), (0.6, 0.4, 0.35), (1.2, -0.7, 0.5)] {
        let mut engine =
            SabrCalibrationEngine::atm(settings, nu, rho, atm_vol, FORWARD, 5.0).unwrap();
        let params = engine.calibrate().unwrap();
        assert_relative_eq!(
            params.volatility(FORWARD, 5.0, FORWARD).unwrap(),
            atm_vol,
            max_relative = 1e-10
        );
    }
}

#[test]
fn interpolated_calibration_uses_grid_neighbours() {
    let settings = SabrCalibrationSettings::new(0.5).unwrap();
    let fitted = calibrated_engine();
    let uncalibrated = SabrCalibrationEngine::full(
        settings,
        STRIKES.to_vec(),
        market_vols(&true_params()),
        FORWARD,
        EXPIRY,
    )
    .unwrap();

    let grid = vec![
        SabrGridNode::from_engine(1.0, 5.0, &fitted),
        SabrGridNode::from_engine(2.0, 5.0, &uncalibrated),
        SabrGridNode::new(3.0, 5.0, 0.2, -0.1),
    ];
    assert_eq!(grid[1].nu_rho, None);

    let mut engine =
        SabrCalibrationEngine::interpolated(settings, &grid, 0.21, FORWARD, 2.0, 5.0).unwrap();
    let params = engine.calibrate().unwrap();
    assert_eq!(engine.kind(), CalibrationKind::Interpolated);

    let fitted = fitted.parameters().unwrap();
    assert_relative_eq!(params.nu(), 0.5 * (fitted.nu() + 0.2), epsilon = 1e-14);
    assert_relative_eq!(params.rho(), 0.5 * (fitted.rho() - 0.1), epsilon = 1e-14);
    assert_relative_eq!(
        params.volatility(FORWARD, 2.0, FORWARD).unwrap(),
        0.21,
        max_relative = 1e-10
    );
}

#[test]
fn smile_interpolator_is_flat_outside_calibrated_strikes() {
    let engine = calibrated_engine();
    let smile = engine.smile_interpolator().unwrap();
    assert_eq!(smile.min_x(), 0.015);
    assert_eq!(smile.max_x(), 0.05);

    let inside = smile.interpolate(0.0275).unwrap();
    assert_eq!(inside, engine.volatility(0.0275).unwrap());

    let edge = smile.interpolate(0.05).unwrap();
    assert_eq!(ExtrapolationMethod::Flat.value(&smile, 0.08).unwrap(), edge);
}

#[test]
fn getters_are_gated_until_calibrated() {
    let settings = SabrCalibrationSettings::new(0.5).unwrap();
    let mut engine = SabrCalibrationEngine::full(
        settings,
        STRIKES.to_vec(),
        market_vols(&true_params()),
        FORWARD,
        EXPIRY,
    )
    .unwrap();
    assert_eq!(engine.state(), CalibrationState::Uninitialized);
    for result in [engine.alpha(), engine.rho(), engine.nu(), engine.beta()] {
        assert!(matches!(result, Err(VolError::InvalidState { .. })));
    }
    assert!(engine.volatility(0.03).is_err());

    engine.compute_initial_guess().unwrap();
    assert_eq!(engine.state(), CalibrationState::GuessComputed);
    assert!(engine.parameters().is_err());

    let first = engine.calibrate().unwrap();
    assert_eq!(engine.calibrate().unwrap(), first);
}

#[test]
fn exhausted_iterations_report_non_convergence() {
    let settings = SabrCalibrationSettings::new(0.5)
        .unwrap()
        .with_simplex(arbor_math::optimization::NelderMeadConfig {
            max_iter: 2,
            ..Default::default()
        })
        .with_enhanced_search(50, 2);
    let mut engine = SabrCalibrationEngine::full(
        settings,
        STRIKES.to_vec(),
        market_vols(&true_params()),
        FORWARD,
        EXPIRY,
    )
    .unwrap();

    match engine.calibrate() {
        Err(VolError::NonConvergence { iterations, residual }) => {
            assert_eq!(iterations, 6);
            assert!(residual > 0.0);
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
    assert_eq!(engine.state(), CalibrationState::GuessComputed);
}
