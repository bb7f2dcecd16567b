//! SABR parameter set.

use serde::{Deserialize, Serialize};

use super::implied_vol::sabr_volatility;
use crate::error::{VolError, VolResult};

/// SABR model parameters.
///
/// ```text
/// dF = α · F^β · dW₁
/// dα = ν · α · dW₂
/// dW₁·dW₂ = ρ dt
/// ```
///
/// Beta is a market convention supplied by the caller; alpha, rho and nu are
/// fitted. The `calibrated` flag is set only on parameters produced by a
/// successful [`SabrCalibrationEngine`](super::SabrCalibrationEngine) run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SabrParameters {
    alpha: f64,
    beta: f64,
    rho: f64,
    nu: f64,
    #[serde(default)]
    calibrated: bool,
}

impl SabrParameters {
    /// Creates a validated parameter set.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` unless `alpha > 0`, `0 <= beta <= 1`,
    /// `-1 < rho < 1` and `nu >= 0`.
    pub fn new(alpha: f64, beta: f64, rho: f64, nu: f64) -> VolResult<Self> {
        let params = Self {
            alpha,
            beta,
            rho,
            nu,
            calibrated: false,
        };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn calibrated(alpha: f64, beta: f64, rho: f64, nu: f64) -> VolResult<Self> {
        Ok(Self {
            calibrated: true,
            ..Self::new(alpha, beta, rho, nu)?
        })
    }

    /// Checks the parameter domains.
    pub fn validate(&self) -> VolResult<()> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(VolError::invalid_parameter("alpha", self.alpha, "must be positive"));
        }
        validate_beta(self.beta)?;
        validate_rho(self.rho)?;
        validate_nu(self.nu)
    }

    /// ATM volatility level.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// CEV exponent.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Forward/volatility correlation.
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Volatility of volatility.
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// True for parameters produced by a calibration.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Hagan lognormal implied volatility for a strike.
    pub fn volatility(&self, forward: f64, expiry: f64, strike: f64) -> VolResult<f64> {
        sabr_volatility(self, forward, expiry, strike)
    }
}

pub(crate) fn validate_beta(beta: f64) -> VolResult<()> {
    if (0.0..=1.0).contains(&beta) {
        Ok(())
    } else {
        Err(VolError::invalid_parameter("beta", beta, "must be in [0, 1]"))
    }
}

pub(crate) fn validate_rho(rho: f64) -> VolResult<()> {
    if rho.abs() < 1.0 {
        Ok(())
    } else {
        Err(VolError::invalid_parameter("rho", rho, "must be in (-1, 1)"))
    }
}

pub(crate) fn validate_nu(nu: f64) -> VolResult<()> {
    if nu >= 0.0 && nu.is_finite() {
        Ok(())
    } else {
        Err(VolError::invalid_parameter("nu", nu, "must be non-negative"))
    }
}
