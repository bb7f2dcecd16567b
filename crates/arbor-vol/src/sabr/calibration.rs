//! SABR calibration engine.
//!
//! The full fit runs Nelder-Mead in transformed coordinates
//!
//! ```text
//! rho = cos(theta)      nu = mu²
//! ```
//!
//! which keep rho in [-1, 1] and nu non-negative without constraints. At
//! every trial point alpha is re-solved from the ATM condition, so the
//! simplex only searches the two-dimensional (theta, mu) plane. The
//! objective is the sum of squared differences between model and market
//! volatilities.
//!
//! When the simplex started from the closed-form guess fails to converge, an
//! enhanced search scores a Halton sequence over (nu, rho) and restarts the
//! simplex from the best few points.

use std::fmt;

use arbor_math::optimization::{halton_2d, nelder_mead_2d, NelderMeadConfig, NelderMeadResult};
use arbor_math::solvers::{brent, SolverConfig};
use tracing::{debug, info, warn};

use super::implied_vol::hagan_volatility;
use super::interpolator::SabrSmileInterpolator;
use super::params::{validate_beta, validate_nu, validate_rho, SabrParameters};
use crate::cube::interpolate_axis;
use crate::error::{VolError, VolResult};

/// Growth factor of the alpha bracket.
const ALPHA_MULTIPLIER: f64 = 2.0;

/// Magnitude of the initial rho guess.
const MID_RHO: f64 = 0.5;

/// Lower end of the alpha bracket.
const MINIMUM_ALPHA: f64 = 1e-5;

/// Shift applied to rho when cos(theta) lands on +-1.
const RHO_PERTURBATION: f64 = 0.01;

/// Upper-bound doublings tried before giving up on an alpha bracket.
const MAX_BRACKET_EXPANSIONS: u32 = 50;

/// Initial simplex edge in both theta and mu.
const SIMPLEX_STEP: f64 = 0.1;

/// Configuration shared by all calibration modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SabrCalibrationSettings {
    /// CEV exponent held fixed during calibration.
    pub beta: f64,
    /// Nelder-Mead limits for the (theta, mu) fit.
    pub simplex: NelderMeadConfig,
    /// Brent settings for the ATM alpha equation.
    pub alpha_solver: SolverConfig,
    /// Halton points scored by the enhanced calibration.
    pub sequence_length: usize,
    /// Restarts attempted by the enhanced calibration.
    pub candidates: usize,
}

impl Default for SabrCalibrationSettings {
    fn default() -> Self {
        Self {
            beta: 0.5,
            simplex: NelderMeadConfig {
                max_iter: 1000,
                ..NelderMeadConfig::default()
            },
            alpha_solver: SolverConfig::new(1e-14, 200),
            sequence_length: 1500,
            candidates: 5,
        }
    }
}

impl SabrCalibrationSettings {
    /// Default settings with the given beta.
    pub fn new(beta: f64) -> VolResult<Self> {
        validate_beta(beta)?;
        Ok(Self {
            beta,
            ..Self::default()
        })
    }

    /// Sets the simplex limits.
    #[must_use]
    pub fn with_simplex(mut self, simplex: NelderMeadConfig) -> Self {
        self.simplex = simplex;
        self
    }

    /// Sets the ATM alpha solver.
    #[must_use]
    pub fn with_alpha_solver(mut self, alpha_solver: SolverConfig) -> Self {
        self.alpha_solver = alpha_solver;
        self
    }

    /// Sets the enhanced-calibration search size.
    #[must_use]
    pub fn with_enhanced_search(mut self, sequence_length: usize, candidates: usize) -> Self {
        self.sequence_length = sequence_length;
        self.candidates = candidates;
        self
    }
}

/// Lifecycle of a [`SabrCalibrationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalibrationState {
    /// Constructed, nothing computed.
    Uninitialized,
    /// ATM slope and (theta, mu) starting point available.
    GuessComputed,
    /// Parameters available.
    Calibrated,
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibrationState::Uninitialized => "uninitialized",
            CalibrationState::GuessComputed => "guess computed",
            CalibrationState::Calibrated => "calibrated",
        };
        f.write_str(name)
    }
}

/// Which problem an engine solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationKind {
    /// Alpha, rho and nu fitted to a smile.
    Full,
    /// Alpha solved from supplied rho and nu.
    AtmOnly,
    /// Alpha solved from rho and nu interpolated off a grid of fitted engines.
    Interpolated,
}

/// Closed-form starting point of the full fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialGuess {
    /// Index of the strike closest to the forward in log-moneyness.
    pub atm_index: usize,
    /// Market volatility at that strike.
    pub atm_volatility: f64,
    /// Central difference of volatility against log-moneyness at the ATM strike.
    pub atm_slope: f64,
    /// Starting theta, `acos(rho0)`.
    pub theta: f64,
    /// Starting mu, `sqrt(nu0)`.
    pub mu: f64,
}

/// Fitted (nu, rho) at one expiry and tenor, input to interpolated calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SabrGridNode {
    /// Expiry in years.
    pub expiry: f64,
    /// Tenor in years.
    pub tenor: f64,
    /// Fitted `(nu, rho)`, `None` where the fit is missing.
    pub nu_rho: Option<(f64, f64)>,
}

impl SabrGridNode {
    /// A node with known parameters.
    #[must_use]
    pub fn new(expiry: f64, tenor: f64, nu: f64, rho: f64) -> Self {
        Self {
            expiry,
            tenor,
            nu_rho: Some((nu, rho)),
        }
    }

    /// A node whose parameters are filled from its expiry neighbours.
    #[must_use]
    pub fn missing(expiry: f64, tenor: f64) -> Self {
        Self {
            expiry,
            tenor,
            nu_rho: None,
        }
    }

    /// A node taken from an engine; missing unless the engine is calibrated.
    #[must_use]
    pub fn from_engine(expiry: f64, tenor: f64, engine: &SabrCalibrationEngine) -> Self {
        Self {
            expiry,
            tenor,
            nu_rho: engine.parameters.map(|p| (p.nu(), p.rho())),
        }
    }
}

#[derive(Debug, Clone)]
enum Inputs {
    Smile { strikes: Vec<f64>, vols: Vec<f64> },
    Atm { nu: f64, rho: f64, atm_vol: f64 },
}

/// Calibrates SABR parameters for a single expiry (and tenor).
///
/// # Example
///
/// ```rust
/// use arbor_vol::sabr::{CalibrationState, SabrCalibrationEngine, SabrCalibrationSettings};
///
/// let settings = SabrCalibrationSettings::new(0.5).unwrap();
/// let mut engine = SabrCalibrationEngine::atm(settings, 0.4, -0.3, 0.20, 0.03, 1.0).unwrap();
/// assert!(engine.alpha().is_err());
///
/// let params = engine.calibrate().unwrap();
/// assert_eq!(engine.state(), CalibrationState::Calibrated);
/// let atm = params.volatility(0.03, 1.0, 0.03).unwrap();
/// assert!((atm - 0.20).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct SabrCalibrationEngine {
    settings: SabrCalibrationSettings,
    kind: CalibrationKind,
    forward: f64,
    expiry: f64,
    inputs: Inputs,
    state: CalibrationState,
    guess: Option<InitialGuess>,
    parameters: Option<SabrParameters>,
    calibration_error: f64,
    iterations: u32,
}

impl SabrCalibrationEngine {
    /// An engine fitting alpha, rho and nu to a smile.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` when strikes and volatilities differ in length
    /// - `InsufficientData` for fewer than three strikes
    /// - `InvalidInput` for strikes that are not strictly increasing
    /// - `InvalidParameter` for non-positive strikes, volatilities, forward
    ///   or expiry
    pub fn full(
        settings: SabrCalibrationSettings,
        strikes: Vec<f64>,
        vols: Vec<f64>,
        forward: f64,
        expiry: f64,
    ) -> VolResult<Self> {
        validate_market(&settings, forward, expiry)?;
        if strikes.len() != vols.len() {
            return Err(VolError::shape_mismatch(format!(
                "{} strikes for {} volatilities",
                strikes.len(),
                vols.len()
            )));
        }
        if strikes.len() < 3 {
            return Err(VolError::insufficient_data(3, strikes.len()));
        }
        for k in &strikes {
            positive("strike", *k)?;
        }
        for v in &vols {
            positive("volatility", *v)?;
        }
        if strikes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(VolError::invalid_input("strikes must be strictly increasing"));
        }
        Ok(Self::with_inputs(
            settings,
            CalibrationKind::Full,
            forward,
            expiry,
            Inputs::Smile { strikes, vols },
        ))
    }

    /// An engine solving alpha from given nu, rho and ATM volatility.
    pub fn atm(
        settings: SabrCalibrationSettings,
        nu: f64,
        rho: f64,
        atm_vol: f64,
        forward: f64,
        expiry: f64,
    ) -> VolResult<Self> {
        validate_market(&settings, forward, expiry)?;
        validate_nu(nu)?;
        validate_rho(rho)?;
        positive("atm_vol", atm_vol)?;
        Ok(Self::with_inputs(
            settings,
            CalibrationKind::AtmOnly,
            forward,
            expiry,
            Inputs::Atm { nu, rho, atm_vol },
        ))
    }

    /// An engine taking nu and rho from a complete expiry × tenor grid.
    ///
    /// Missing nodes are filled per tenor by linear interpolation in expiry,
    /// flat beyond the known expiries. Nu and rho at `(expiry, tenor)` are
    /// then interpolated bilinearly, flat outside the grid, and alpha is
    /// solved ATM-only.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the nodes do not form a complete grid and
    /// `InvalidInput` when a tenor has no known node.
    pub fn interpolated(
        settings: SabrCalibrationSettings,
        grid: &[SabrGridNode],
        atm_vol: f64,
        forward: f64,
        expiry: f64,
        tenor: f64,
    ) -> VolResult<Self> {
        validate_market(&settings, forward, expiry)?;
        positive("atm_vol", atm_vol)?;
        let (nu, rho) = interpolate_nu_rho(grid, expiry, tenor)?;
        debug!(expiry, tenor, nu, rho, "interpolated SABR nu and rho");
        Ok(Self::with_inputs(
            settings,
            CalibrationKind::Interpolated,
            forward,
            expiry,
            Inputs::Atm { nu, rho, atm_vol },
        ))
    }

    fn with_inputs(
        settings: SabrCalibrationSettings,
        kind: CalibrationKind,
        forward: f64,
        expiry: f64,
        inputs: Inputs,
    ) -> Self {
        Self {
            settings,
            kind,
            forward,
            expiry,
            inputs,
            state: CalibrationState::Uninitialized,
            guess: None,
            parameters: None,
            calibration_error: 0.0,
            iterations: 0,
        }
    }

    /// Computes the ATM slope and the (theta, mu) starting point.
    ///
    /// Moves the engine to [`CalibrationState::GuessComputed`]. Only full
    /// calibration has a guess.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the strike closest to the forward is the first
    /// or last strike, or when the engine has no smile.
    pub fn compute_initial_guess(&mut self) -> VolResult<InitialGuess> {
        if let Some(guess) = self.guess {
            return Ok(guess);
        }
        let Inputs::Smile { strikes, vols } = &self.inputs else {
            return Err(VolError::invalid_input(
                "an initial guess needs a strike/volatility smile",
            ));
        };

        let lm: Vec<f64> = strikes.iter().map(|k| (k / self.forward).ln()).collect();
        let mut atm = 0;
        for (i, x) in lm.iter().enumerate() {
            if x.abs() < lm[atm].abs() {
                atm = i;
            }
        }
        if atm == 0 || atm == lm.len() - 1 {
            return Err(VolError::invalid_input(format!(
                "ATM strike {} is at the edge of the strike range",
                strikes[atm]
            )));
        }

        let atm_volatility = vols[atm];
        let atm_slope = (vols[atm + 1] - vols[atm - 1]) / (lm[atm + 1] - lm[atm - 1]);
        let rho = MID_RHO * sign(atm_slope);
        let nu = 4.0 * (atm_slope.abs() + rho * (1.0 - self.settings.beta) * atm_volatility).abs();

        let guess = InitialGuess {
            atm_index: atm,
            atm_volatility,
            atm_slope,
            theta: rho.acos(),
            mu: nu.sqrt(),
        };
        debug!(
            atm_index = atm,
            atm_slope,
            theta = guess.theta,
            mu = guess.mu,
            "SABR initial guess"
        );
        self.guess = Some(guess);
        self.state = CalibrationState::GuessComputed;
        Ok(guess)
    }

    /// Runs the calibration for this engine's kind.
    ///
    /// Computes the initial guess first when needed. Calling again on a
    /// calibrated engine returns the stored parameters.
    ///
    /// # Errors
    ///
    /// `NonConvergence` when neither the guessed start nor any enhanced
    /// restart converges, and `Math` when the ATM alpha cannot be bracketed
    /// in ATM-only modes.
    pub fn calibrate(&mut self) -> VolResult<SabrParameters> {
        if let Some(params) = self.parameters {
            return Ok(params);
        }

        let beta = self.settings.beta;
        let (params, error, iterations) = match self.inputs {
            Inputs::Atm { nu, rho, atm_vol } => {
                let alpha = solve_atm_alpha(
                    beta,
                    rho,
                    nu,
                    atm_vol,
                    self.forward,
                    self.expiry,
                    &self.settings.alpha_solver,
                )?;
                (SabrParameters::calibrated(alpha, beta, rho, nu)?, 0.0, 0)
            }
            Inputs::Smile { .. } => self.calibrate_smile()?,
        };

        info!(
            kind = ?self.kind,
            alpha = params.alpha(),
            rho = params.rho(),
            nu = params.nu(),
            error,
            iterations,
            "SABR calibrated"
        );
        self.parameters = Some(params);
        self.calibration_error = error;
        self.iterations = iterations;
        self.state = CalibrationState::Calibrated;
        Ok(params)
    }

    fn calibrate_smile(&mut self) -> VolResult<(SabrParameters, f64, u32)> {
        let guess = self.compute_initial_guess()?;
        let Inputs::Smile { strikes, vols } = &self.inputs else {
            return Err(VolError::invalid_input("full calibration needs a smile"));
        };
        let fit = SmileFit {
            strikes,
            vols,
            forward: self.forward,
            expiry: self.expiry,
            beta: self.settings.beta,
            atm_vol: guess.atm_volatility,
            settings: &self.settings,
        };
        let (best, iterations) = fit.run(guess.theta, guess.mu)?;
        let (rho, nu) = from_optimizer(best.x, best.y);
        let alpha = fit.alpha(rho, nu);
        Ok((
            SabrParameters::calibrated(alpha, self.settings.beta, rho, nu)?,
            best.fval,
            iterations,
        ))
    }

    /// Current state.
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Which calibration this engine runs.
    pub fn kind(&self) -> CalibrationKind {
        self.kind
    }

    /// The settings in use.
    pub fn settings(&self) -> &SabrCalibrationSettings {
        &self.settings
    }

    /// Forward of the underlying.
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// Exercise time in years.
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// The closed-form starting point.
    pub fn initial_guess(&self) -> VolResult<InitialGuess> {
        self.guess
            .ok_or_else(|| self.state_error(CalibrationState::GuessComputed))
    }

    /// The calibrated parameters.
    pub fn parameters(&self) -> VolResult<SabrParameters> {
        self.parameters
            .ok_or_else(|| self.state_error(CalibrationState::Calibrated))
    }

    /// Calibrated alpha.
    pub fn alpha(&self) -> VolResult<f64> {
        self.parameters().map(|p| p.alpha())
    }

    /// Beta used by the calibration.
    pub fn beta(&self) -> VolResult<f64> {
        self.parameters().map(|p| p.beta())
    }

    /// Calibrated rho.
    pub fn rho(&self) -> VolResult<f64> {
        self.parameters().map(|p| p.rho())
    }

    /// Calibrated nu.
    pub fn nu(&self) -> VolResult<f64> {
        self.parameters().map(|p| p.nu())
    }

    /// Sum of squared volatility errors of the fit; zero for ATM-only modes.
    pub fn calibration_error(&self) -> VolResult<f64> {
        self.parameters().map(|_| self.calibration_error)
    }

    /// Simplex iterations across all attempts; zero for ATM-only modes.
    pub fn iterations(&self) -> VolResult<u32> {
        self.parameters().map(|_| self.iterations)
    }

    /// Model volatility at a strike.
    pub fn volatility(&self, strike: f64) -> VolResult<f64> {
        self.parameters()?.volatility(self.forward, self.expiry, strike)
    }

    /// The calibrated smile as a strike interpolator.
    ///
    /// A full calibration limits the range to the calibrated strikes.
    pub fn smile_interpolator(&self) -> VolResult<SabrSmileInterpolator> {
        let interp = SabrSmileInterpolator::new(self.parameters()?, self.forward, self.expiry)?;
        match &self.inputs {
            Inputs::Smile { strikes, .. } => match (strikes.first(), strikes.last()) {
                (Some(lo), Some(hi)) => interp.with_strike_range(*lo, *hi),
                _ => Ok(interp),
            },
            Inputs::Atm { .. } => Ok(interp),
        }
    }

    fn state_error(&self, required: CalibrationState) -> VolError {
        VolError::InvalidState {
            state: self.state.to_string(),
            required: required.to_string(),
        }
    }
}

/// One full fit over borrowed market data.
struct SmileFit<'a> {
    strikes: &'a [f64],
    vols: &'a [f64],
    forward: f64,
    expiry: f64,
    beta: f64,
    atm_vol: f64,
    settings: &'a SabrCalibrationSettings,
}

impl SmileFit<'_> {
    /// ATM alpha, falling back to the lognormal approximation when no root
    /// is bracketed.
    fn alpha(&self, rho: f64, nu: f64) -> f64 {
        solve_atm_alpha(
            self.beta,
            rho,
            nu,
            self.atm_vol,
            self.forward,
            self.expiry,
            &self.settings.alpha_solver,
        )
        .unwrap_or_else(|_| self.atm_vol * self.forward.powf(1.0 - self.beta))
    }

    fn residual(&self, alpha: f64, rho: f64, nu: f64) -> f64 {
        self.strikes
            .iter()
            .zip(self.vols)
            .map(|(k, v)| {
                let model =
                    hagan_volatility(alpha, self.beta, rho, nu, self.forward, self.expiry, *k);
                (model - v).powi(2)
            })
            .sum()
    }

    fn objective(&self, theta: f64, mu: f64) -> f64 {
        let (rho, nu) = from_optimizer(theta, mu);
        self.residual(self.alpha(rho, nu), rho, nu)
    }

    fn minimize(&self, theta: f64, mu: f64) -> NelderMeadResult {
        nelder_mead_2d(
            |t, m| self.objective(t, m),
            theta,
            mu,
            SIMPLEX_STEP,
            SIMPLEX_STEP,
            &self.settings.simplex,
        )
    }

    /// Lowest-residual Halton points as `(residual, rho, nu)`.
    fn candidates(&self) -> Vec<(f64, f64, f64)> {
        let mut scored: Vec<(f64, f64, f64)> = halton_2d(self.settings.sequence_length)
            .into_iter()
            .filter_map(|(u, v)| {
                let (nu, rho) = (u, 2.0 * v - 1.0);
                let r = self.residual(self.alpha(rho, nu), rho, nu);
                r.is_finite().then_some((r, rho, nu))
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.dedup_by(|a, b| a.0 == b.0);
        scored.truncate(self.settings.candidates);
        scored
    }

    /// Converged simplex result and total iterations.
    fn run(&self, theta: f64, mu: f64) -> VolResult<(NelderMeadResult, u32)> {
        let first = self.minimize(theta, mu);
        let mut iterations = first.iterations;
        if first.converged {
            return Ok((first, iterations));
        }

        warn!(
            iterations,
            residual = first.fval,
            "SABR fit did not converge from the initial guess, trying Halton restarts"
        );
        let mut best = first.fval;
        for (score, rho, nu) in self.candidates() {
            debug!(score, rho, nu, "SABR restart");
            let attempt = self.minimize(rho.acos(), nu.sqrt());
            iterations += attempt.iterations;
            if attempt.converged {
                return Ok((attempt, iterations));
            }
            best = best.min(attempt.fval);
        }
        Err(VolError::NonConvergence {
            iterations,
            residual: best,
        })
    }
}

/// Maps simplex coordinates to `(rho, nu)`, keeping rho off +-1.
fn from_optimizer(theta: f64, mu: f64) -> (f64, f64) {
    let mut rho = theta.cos();
    if rho.abs() == 1.0 {
        rho -= sign(rho) * RHO_PERTURBATION;
    }
    (rho, mu * mu)
}

/// Solves the ATM condition for alpha with Brent:
///
/// ```text
/// (1-β)²T/(24F^(2-2β)) α³ + ρβνT/(4F^(1-β)) α² + (1 + ν²(2-3ρ²)T/24) α - σ_atm F^(1-β) = 0
/// ```
fn solve_atm_alpha(
    beta: f64,
    rho: f64,
    nu: f64,
    atm_vol: f64,
    forward: f64,
    expiry: f64,
    config: &SolverConfig,
) -> VolResult<f64> {
    let one_b = 1.0 - beta;
    let f_pow = forward.powf(one_b);
    let c3 = one_b * one_b * expiry / (24.0 * f_pow * f_pow);
    let c2 = rho * beta * nu * expiry / (4.0 * f_pow);
    let c1 = 1.0 + nu * nu * (2.0 - 3.0 * rho * rho) * expiry / 24.0;
    let c0 = -atm_vol * f_pow;
    let cubic = |a: f64| ((c3 * a + c2) * a + c1) * a + c0;

    let approx = atm_vol * f_pow;
    let lower = MINIMUM_ALPHA.min(approx / ALPHA_MULTIPLIER);
    let mut upper = ALPHA_MULTIPLIER * approx;
    let f_lower = cubic(lower);
    for _ in 0..MAX_BRACKET_EXPANSIONS {
        if f_lower * cubic(upper) <= 0.0 {
            break;
        }
        upper *= ALPHA_MULTIPLIER;
    }
    Ok(brent(cubic, lower, upper, config)?.root)
}

/// Nu and rho at `(expiry, tenor)` from a grid of nodes.
fn interpolate_nu_rho(grid: &[SabrGridNode], expiry: f64, tenor: f64) -> VolResult<(f64, f64)> {
    if grid.is_empty() {
        return Err(VolError::insufficient_data(1, 0));
    }
    let expiries = distinct(grid.iter().map(|n| n.expiry));
    let tenors = distinct(grid.iter().map(|n| n.tenor));
    let (ne, nt) = (expiries.len(), tenors.len());

    let mut table: Vec<Option<Option<(f64, f64)>>> = vec![None; ne * nt];
    for node in grid {
        let i = expiries.partition_point(|e| *e < node.expiry);
        let j = tenors.partition_point(|t| *t < node.tenor);
        let slot = &mut table[i * nt + j];
        if slot.is_some() {
            return Err(VolError::shape_mismatch(format!(
                "duplicate SABR node at expiry {} tenor {}",
                node.expiry, node.tenor
            )));
        }
        *slot = Some(node.nu_rho);
    }
    let table = table.into_iter().collect::<Option<Vec<_>>>().ok_or_else(|| {
        VolError::shape_mismatch(format!(
            "{} SABR nodes do not cover a {ne}x{nt} expiry/tenor grid",
            grid.len()
        ))
    })?;

    // Fill each tenor column in expiry, then evaluate the column at `expiry`
    let mut nu_by_tenor = Vec::with_capacity(nt);
    let mut rho_by_tenor = Vec::with_capacity(nt);
    for j in 0..nt {
        let known: Vec<(f64, f64, f64)> = (0..ne)
            .filter_map(|i| table[i * nt + j].map(|(nu, rho)| (expiries[i], nu, rho)))
            .collect();
        if known.is_empty() {
            return Err(VolError::invalid_input(format!(
                "no calibrated SABR node for tenor {}",
                tenors[j]
            )));
        }
        let xs: Vec<f64> = known.iter().map(|k| k.0).collect();
        let nus: Vec<f64> = (0..ne)
            .map(|i| match table[i * nt + j] {
                Some((nu, _)) => Ok(nu),
                None => interpolate_axis(&xs, expiries[i], known.iter().map(|k| k.1).collect()),
            })
            .collect::<VolResult<_>>()?;
        let rhos: Vec<f64> = (0..ne)
            .map(|i| match table[i * nt + j] {
                Some((_, rho)) => Ok(rho),
                None => interpolate_axis(&xs, expiries[i], known.iter().map(|k| k.2).collect()),
            })
            .collect::<VolResult<_>>()?;
        nu_by_tenor.push(interpolate_axis(&expiries, expiry, nus)?);
        rho_by_tenor.push(interpolate_axis(&expiries, expiry, rhos)?);
    }

    Ok((
        interpolate_axis(&tenors, tenor, nu_by_tenor)?,
        interpolate_axis(&tenors, tenor, rho_by_tenor)?,
    ))
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn positive(name: &'static str, value: f64) -> VolResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(VolError::invalid_parameter(name, value, "must be positive"))
    }
}

fn validate_market(settings: &SabrCalibrationSettings, forward: f64, expiry: f64) -> VolResult<()> {
    validate_beta(settings.beta)?;
    positive("forward", forward)?;
    positive("expiry", expiry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const F: f64 = 0.03;
    const T: f64 = 1.0;
    const STRIKES: [f64; 7] = [0.015, 0.02, 0.025, 0.03, 0.035, 0.04, 0.05];

    fn market_smile(alpha: f64, rho: f64, nu: f64) -> Vec<f64> {
        STRIKES
            .iter()
            .map(|k| hagan_volatility(alpha, 0.5, rho, nu, F, T, *k))
            .collect()
    }

    fn settings() -> SabrCalibrationSettings {
        SabrCalibrationSettings::new(0.5).unwrap()
    }

    #[test]
    fn test_atm_cubic_matches_hagan_at_the_money() {
        let alpha = solve_atm_alpha(0.5, -0.3, 0.4, 0.2, F, T, &settings().alpha_solver).unwrap();
        let atm = hagan_volatility(alpha, 0.5, -0.3, 0.4, F, T, F);
        assert_relative_eq!(atm, 0.2, max_relative = 1e-12);
    }

    #[test]
    fn test_initial_guess() {
        let vols = market_smile(0.035, -0.3, 0.4);
        let mut engine =
            SabrCalibrationEngine::full(settings(), STRIKES.to_vec(), vols.clone(), F, T).unwrap();
        assert!(engine.initial_guess().is_err());

        let guess = engine.compute_initial_guess().unwrap();
        assert_eq!(engine.state(), CalibrationState::GuessComputed);
        assert_eq!(guess.atm_index, 3);
        assert_eq!(guess.atm_volatility, vols[3]);

        let lm = |k: f64| (k / F).ln();
        let slope = (vols[4] - vols[2]) / (lm(0.035) - lm(0.025));
        assert_relative_eq!(guess.atm_slope, slope, max_relative = 1e-14);
        assert!(slope < 0.0);
        assert_relative_eq!(guess.theta, (-0.5_f64).acos());
        let nu0 = 4.0 * (slope.abs() - 0.5 * 0.5 * vols[3]).abs();
        assert_relative_eq!(guess.mu, nu0.sqrt(), max_relative = 1e-14);

        // Guarded getters stay closed until calibration
        assert!(matches!(engine.alpha(), Err(VolError::InvalidState { .. })));
    }

    #[test]
    fn test_flat_smile_starts_at_zero_rho() {
        let mut engine =
            SabrCalibrationEngine::full(settings(), STRIKES.to_vec(), vec![0.2; 7], F, T).unwrap();
        let guess = engine.compute_initial_guess().unwrap();
        assert_eq!(guess.atm_slope, 0.0);
        assert_relative_eq!(guess.theta, std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_atm_at_edge_rejected() {
        let strikes = vec![0.03, 0.035, 0.04];
        let mut engine =
            SabrCalibrationEngine::full(settings(), strikes, vec![0.2, 0.19, 0.18], F, T).unwrap();
        assert!(matches!(
            engine.compute_initial_guess(),
            Err(VolError::InvalidInput { .. })
        ));
        assert_eq!(engine.state(), CalibrationState::Uninitialized);
    }

    #[test]
    fn test_full_constructor_validation() {
        let err = SabrCalibrationEngine::full(settings(), vec![0.02, 0.03], vec![0.2, 0.2], F, T)
            .unwrap_err();
        assert_eq!(err, VolError::insufficient_data(3, 2));

        let err =
            SabrCalibrationEngine::full(settings(), vec![0.02, 0.03, 0.04], vec![0.2], F, T).unwrap_err();
        assert!(matches!(err, VolError::ShapeMismatch { .. }));

        let err = SabrCalibrationEngine::full(
            settings(),
            vec![0.02, 0.04, 0.03],
            vec![0.2, 0.2, 0.2],
            F,
            T,
        )
        .unwrap_err();
        assert!(matches!(err, VolError::InvalidInput { .. }));

        assert!(SabrCalibrationEngine::atm(settings(), 0.4, -1.0, 0.2, F, T).is_err());
        assert!(SabrCalibrationEngine::atm(settings(), 0.4, 0.0, 0.2, -F, T).is_err());
    }

    #[test]
    fn test_atm_engine_has_no_guess() {
        let mut engine = SabrCalibrationEngine::atm(settings(), 0.4, -0.3, 0.2, F, T).unwrap();
        assert!(engine.compute_initial_guess().is_err());
        engine.calibrate().unwrap();
        assert_eq!(engine.calibration_error().unwrap(), 0.0);
        assert_eq!(engine.iterations().unwrap(), 0);
        assert!(engine.parameters().unwrap().is_calibrated());
    }

    #[test]
    fn test_rho_kept_off_the_boundary() {
        let (rho, nu) = from_optimizer(0.0, 0.5);
        assert_relative_eq!(rho, 0.99);
        assert_eq!(nu, 0.25);
        let (rho, _) = from_optimizer(std::f64::consts::PI, 0.5);
        assert_relative_eq!(rho, -0.99);
    }

    #[test]
    fn test_halton_candidates_sorted() {
        let vols = market_smile(0.035, -0.3, 0.4);
        let s = settings();
        let fit = SmileFit {
            strikes: &STRIKES,
            vols: &vols,
            forward: F,
            expiry: T,
            beta: 0.5,
            atm_vol: vols[3],
            settings: &s,
        };
        let candidates = fit.candidates();
        assert_eq!(candidates.len(), 5);
        assert!(candidates.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(candidates.iter().all(|c| c.1 > -1.0 && c.1 < 1.0 && c.2 >= 0.0));
    }

    #[test]
    fn test_grid_fill_and_bilinear() {
        let grid = vec![
            SabrGridNode::new(1.0, 2.0, 0.4, -0.2),
            SabrGridNode::new(1.0, 10.0, 0.3, -0.4),
            SabrGridNode::missing(2.0, 2.0),
            SabrGridNode::new(2.0, 10.0, 0.2, -0.3),
            SabrGridNode::new(3.0, 2.0, 0.2, 0.0),
            SabrGridNode::new(3.0, 10.0, 0.1, -0.2),
        ];
        // (2, 2) filled from its column: nu 0.3, rho -0.1
        let (nu, rho) = interpolate_nu_rho(&grid, 2.0, 2.0).unwrap();
        assert_relative_eq!(nu, 0.3, epsilon = 1e-15);
        assert_relative_eq!(rho, -0.1, epsilon = 1e-15);

        let (nu, rho) = interpolate_nu_rho(&grid, 2.0, 6.0).unwrap();
        assert_relative_eq!(nu, 0.25, epsilon = 1e-15);
        assert_relative_eq!(rho, -0.2, epsilon = 1e-15);

        // Flat outside the grid
        let (nu, _) = interpolate_nu_rho(&grid, 0.25, 30.0).unwrap();
        assert_relative_eq!(nu, 0.3);

        let mut incomplete = grid.clone();
        incomplete.pop();
        assert!(matches!(
            interpolate_nu_rho(&incomplete, 1.0, 2.0),
            Err(VolError::ShapeMismatch { .. })
        ));

        let empty_column = vec![SabrGridNode::missing(1.0, 2.0), SabrGridNode::missing(2.0, 2.0)];
        assert!(matches!(
            interpolate_nu_rho(&empty_column, 1.0, 2.0),
            Err(VolError::InvalidInput { .. })
        ));
    }
}
