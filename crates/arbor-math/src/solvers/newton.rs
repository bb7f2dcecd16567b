//! Newton-Raphson root-finding.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Newton-Raphson with an analytic derivative.
///
/// Iterates `x_{n+1} = x_n - f(x_n) / f'(x_n)` and stops when the residual or
/// the step falls below the tolerance.
///
/// # Example
///
/// ```rust
/// use arbor_math::solvers::{newton_raphson, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
/// let df = |x: f64| 2.0 * x;
///
/// let result = newton_raphson(f, df, 1.5, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton_raphson<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    let mut x = initial_guess;

    for iteration in 0..config.max_iterations {
        let fx = f(x);
        if fx.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        let dfx = df(x);
        if dfx.abs() < 1e-15 {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;

        if step.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual: f(x),
            });
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        f(x).abs(),
    ))
}

/// Settings for [`newton_bumped`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BumpedNewton {
    /// Relative bump used for the forward-difference derivative.
    pub bump: f64,
    /// Values at or below the floor are never tried; a step that would cross
    /// it is halved toward it instead.
    pub floor: Option<f64>,
}

impl Default for BumpedNewton {
    fn default() -> Self {
        Self {
            bump: 1e-8,
            floor: None,
        }
    }
}

impl BumpedNewton {
    /// Sets the lower bound of the search domain.
    #[must_use]
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Sets the relative bump size.
    #[must_use]
    pub fn with_bump(mut self, bump: f64) -> Self {
        self.bump = bump;
        self
    }
}

/// Newton-Raphson with a one-sided bumped derivative over a fallible objective.
///
/// Convergence is declared only when `|f(x)| <= tolerance`; a small step
/// alone is not enough. The objective may carry state (for instance a
/// partially built curve); on success its last evaluation was at the
/// returned root.
///
/// # Errors
///
/// Propagates errors from `f`, and fails with `DivisionByZero` on a flat
/// derivative, `InvalidInput` on a non-finite residual and
/// `ConvergenceFailed` when the iteration cap is exhausted.
pub fn newton_bumped<F, E>(
    mut f: F,
    initial_guess: f64,
    settings: &BumpedNewton,
    config: &SolverConfig,
) -> Result<SolverResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let mut x = initial_guess;
    let mut fx = f(x)?;

    for iteration in 0..config.max_iterations {
        if !fx.is_finite() {
            return Err(MathError::invalid_input(format!("objective is {fx} at {x}")).into());
        }
        if fx.abs() <= config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        let h = settings.bump * x.abs().max(1.0);
        let slope = (f(x + h)? - fx) / h;
        if !slope.is_finite() || slope == 0.0 {
            return Err(MathError::DivisionByZero { value: slope }.into());
        }

        let mut next = x - fx / slope;
        if let Some(floor) = settings.floor {
            if next <= floor {
                next = 0.5 * (x + floor);
            }
        }

        x = next;
        fx = f(x)?;
    }

    if fx.abs() <= config.tolerance {
        return Ok(SolverResult {
            root: x,
            iterations: config.max_iterations,
            residual: fx,
        });
    }
    Err(MathError::convergence_failed(config.max_iterations, fx.abs()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_newton_sqrt2() {
        let result =
            newton_raphson(|x| x * x - 2.0, |x| 2.0 * x, 1.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_newton_zero_derivative() {
        let err = newton_raphson(|x| x * x + 1.0, |_| 0.0, 0.0, &SolverConfig::default());
        assert!(matches!(err, Err(MathError::DivisionByZero { .. })));
    }

    #[test]
    fn test_bumped_tracks_last_evaluation() {
        let mut last = f64::NAN;
        let result = newton_bumped::<_, MathError>(
            |x| {
                last = x;
                Ok((-0.05 * x).exp() - 0.9)
            },
            1.0,
            &BumpedNewton::default(),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(result.root, -(0.9_f64).ln() / 0.05, epsilon = 1e-8);
        assert_eq!(last, result.root);
        assert!(result.residual.abs() <= 1e-10);
    }

    #[test]
    fn test_bumped_respects_floor() {
        // Root at 0.2; a wild first step would go negative without the floor
        let mut tried = Vec::new();
        let result = newton_bumped::<_, MathError>(
            |x| {
                tried.push(x);
                Ok(1.0 / x - 5.0)
            },
            1.0,
            &BumpedNewton::default().with_floor(0.0),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(result.root, 0.2, epsilon = 1e-9);
        assert!(tried.iter().all(|x| *x > 0.0));
    }

    #[test]
    fn test_bumped_cap_is_hard_failure() {
        let result = newton_bumped::<_, MathError>(
            |x| Ok(x * x + 1.0),
            3.0,
            &BumpedNewton::default(),
            &SolverConfig::new(1e-12, 5),
        );
        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { iterations: 5, .. })
        ));
    }

    #[test]
    fn test_bumped_propagates_objective_error() {
        let result = newton_bumped::<_, MathError>(
            |_| Err(MathError::invalid_input("boom")),
            1.0,
            &BumpedNewton::default(),
            &SolverConfig::default(),
        );
        assert_eq!(result.unwrap_err(), MathError::invalid_input("boom"));
    }
}
