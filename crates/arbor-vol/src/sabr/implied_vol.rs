//! Hagan lognormal implied volatility.
//!
//! ```text
//!                      α                                     z
//! σ(K) = ─────────────────────────────────────────────── · ──── · [1 + C·T]
//!        (FK)^((1-β)/2) · [1 + (1-β)²L²/24 + (1-β)⁴L⁴/1920]   x(z)
//!
//! L    = ln(F/K)
//! z    = (ν/α) (FK)^((1-β)/2) L
//! x(z) = ln[(sqrt(1 - 2ρz + z²) + z - ρ) / (1 - ρ)]
//! C    = (1-β)²α² / (24 (FK)^(1-β)) + ρβνα / (4 (FK)^((1-β)/2)) + ν²(2 - 3ρ²)/24
//! ```
//!
//! Reference: Hagan, Kumar, Lesniewski, Woodward, "Managing Smile Risk" (2002).

use super::params::SabrParameters;
use crate::error::{VolError, VolResult};

/// Below this |z| the ratio z/x(z) is replaced by its limit 1.
const Z_EPSILON: f64 = 1e-12;

/// Hagan implied volatility for validated parameters and market inputs.
///
/// # Errors
///
/// `InvalidParameter` for a non-positive forward or strike or a negative expiry.
///
/// # Example
///
/// ```rust
/// use arbor_vol::sabr::{sabr_volatility, SabrParameters};
///
/// // Lognormal dynamics without vol of vol: flat smile at alpha
/// let params = SabrParameters::new(0.2, 1.0, 0.0, 0.0).unwrap();
/// let vol = sabr_volatility(&params, 100.0, 1.0, 120.0).unwrap();
/// assert!((vol - 0.2).abs() < 1e-15);
/// ```
pub fn sabr_volatility(
    params: &SabrParameters,
    forward: f64,
    expiry: f64,
    strike: f64,
) -> VolResult<f64> {
    if !(forward > 0.0 && forward.is_finite()) {
        return Err(VolError::invalid_parameter("forward", forward, "must be positive"));
    }
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(VolError::invalid_parameter("strike", strike, "must be positive"));
    }
    if !(expiry >= 0.0 && expiry.is_finite()) {
        return Err(VolError::invalid_parameter("expiry", expiry, "must be non-negative"));
    }
    Ok(hagan_volatility(
        params.alpha(),
        params.beta(),
        params.rho(),
        params.nu(),
        forward,
        expiry,
        strike,
    ))
}

/// Unchecked Hagan formula, used inside the calibration loop.
pub(crate) fn hagan_volatility(
    alpha: f64,
    beta: f64,
    rho: f64,
    nu: f64,
    forward: f64,
    expiry: f64,
    strike: f64,
) -> f64 {
    let one_b = 1.0 - beta;
    let fk = forward * strike;
    let fk_half = fk.powf(0.5 * one_b);
    let lm = (forward / strike).ln();

    let z = nu / alpha * fk_half * lm;
    let ratio = if z.abs() < Z_EPSILON {
        1.0
    } else {
        let x = (((1.0 - 2.0 * rho * z + z * z).sqrt() + z - rho) / (1.0 - rho)).ln();
        z / x
    };

    let one_b2 = one_b * one_b;
    let lm2 = lm * lm;
    let denominator = fk_half * (1.0 + one_b2 * lm2 / 24.0 + one_b2 * one_b2 * lm2 * lm2 / 1920.0);

    let correction = one_b2 * alpha * alpha / (24.0 * fk_half * fk_half)
        + rho * beta * nu * alpha / (4.0 * fk_half)
        + nu * nu * (2.0 - 3.0 * rho * rho) / 24.0;

    alpha / denominator * ratio * (1.0 + correction * expiry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> SabrParameters {
        SabrParameters::new(0.035, 0.5, -0.3, 0.4).unwrap()
    }

    #[test]
    fn test_atm_closed_form() {
        let (f, t): (f64, f64) = (0.03, 2.0);
        let p = params();
        let f_pow = f.powf(0.5);
        let expected = p.alpha() / f_pow
            * (1.0
                + (0.25 * p.alpha() * p.alpha() / (24.0 * f)
                    + p.rho() * 0.5 * p.nu() * p.alpha() / (4.0 * f_pow)
                    + p.nu() * p.nu() * (2.0 - 3.0 * p.rho() * p.rho()) / 24.0)
                    * t);
        assert_relative_eq!(sabr_volatility(&p, f, t, f).unwrap(), expected, max_relative = 1e-14);
    }

    #[test]
    fn test_continuous_through_atm() {
        let p = params();
        let atm = sabr_volatility(&p, 0.03, 1.0, 0.03).unwrap();
        let near = sabr_volatility(&p, 0.03, 1.0, 0.03 * (1.0 + 1e-9)).unwrap();
        assert_relative_eq!(atm, near, max_relative = 1e-7);
    }

    #[test]
    fn test_negative_rho_skews_down() {
        let p = params();
        let low = sabr_volatility(&p, 0.03, 1.0, 0.02).unwrap();
        let high = sabr_volatility(&p, 0.03, 1.0, 0.04).unwrap();
        assert!(low > high);
    }

    #[test]
    fn test_rejects_bad_market_inputs() {
        let p = params();
        assert!(sabr_volatility(&p, 0.0, 1.0, 0.03).is_err());
        assert!(sabr_volatility(&p, 0.03, 1.0, -0.01).is_err());
        assert!(sabr_volatility(&p, 0.03, -1.0, 0.03).is_err());
    }
}
