//! SABR smile model and calibration.
//!
//! | Calibration | Inputs | Solves |
//! |-------------|--------|--------|
//! | [`SabrCalibrationEngine::full`] | strikes, vols, forward, expiry | alpha, rho, nu |
//! | [`SabrCalibrationEngine::atm`] | nu, rho, ATM vol, forward, expiry | alpha |
//! | [`SabrCalibrationEngine::interpolated`] | grid of fitted (nu, rho), ATM vol | alpha |
//!
//! Beta is fixed by [`SabrCalibrationSettings`]. In every mode alpha is the
//! root of the ATM condition, a cubic in alpha, so the fitted smile passes
//! through the ATM volatility.

mod calibration;
mod implied_vol;
mod interpolator;
mod params;

pub use calibration::{
    CalibrationKind, CalibrationState, InitialGuess, SabrCalibrationEngine,
    SabrCalibrationSettings, SabrGridNode,
};
pub use implied_vol::sabr_volatility;
pub use interpolator::SabrSmileInterpolator;
pub use params::SabrParameters;
