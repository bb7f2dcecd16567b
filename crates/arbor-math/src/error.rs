//! Errors raised by interpolators, extrapolators and solvers.

use thiserror::Error;

/// Result alias used across `arbor-math`.
pub type MathResult<T> = Result<T, MathError>;

/// Numerical failures.
///
/// Curve and volatility crates wrap this with `#[from]`; the bootstrapper
/// maps `ConvergenceFailed` and `DivisionByZero` onto its own
/// non-convergence error so the instrument id is reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// A root search or simplex ran out of iterations.
    #[error("Convergence failed after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailed {
        /// Iterations performed.
        iterations: u32,
        /// Residual at the last iterate.
        residual: f64,
    },

    /// The objective does not change sign over the bracket.
    #[error("Invalid bracket: f({a}) = {fa:.2e} and f({b}) = {fb:.2e} have same sign")]
    InvalidBracket {
        /// Left end.
        a: f64,
        /// Right end.
        b: f64,
        /// Objective at `a`.
        fa: f64,
        /// Objective at `b`.
        fb: f64,
    },

    /// A Newton step hit a zero (or vanishing) slope.
    #[error("Zero derivative: slope {value:.2e}")]
    DivisionByZero {
        /// The offending slope.
        value: f64,
    },

    /// Query outside the pillar range with extrapolation disabled.
    #[error("Extrapolation not allowed: {x} is outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// Query abscissa.
        x: f64,
        /// First pillar.
        min: f64,
        /// Last pillar.
        max: f64,
    },

    /// Too few pillars.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum pillar count.
        required: usize,
        /// Pillars supplied.
        actual: usize,
    },

    /// Pillar abscissae are not strictly increasing.
    #[error("Unsorted pillars: x[{index}] = {value} does not exceed {previous}")]
    UnsortedPillars {
        /// Position of the first offending pillar.
        index: usize,
        /// Abscissa before it.
        previous: f64,
        /// Its abscissa.
        value: f64,
    },

    /// Anything else the caller got wrong.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
}

impl MathError {
    /// Iteration cap reached.
    #[must_use]
    pub fn convergence_failed(iterations: u32, residual: f64) -> Self {
        Self::ConvergenceFailed {
            iterations,
            residual,
        }
    }

    /// Free-form input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Fewer than `required` pillars.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// First position where `xs` fails to increase, if any.
    pub(crate) fn check_increasing(xs: &[f64]) -> MathResult<()> {
        match xs.windows(2).position(|w| w[1] <= w[0]) {
            Some(i) => Err(Self::UnsortedPillars {
                index: i + 1,
                previous: xs[i],
                value: xs[i + 1],
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::convergence_failed(100, 1e-6);
        assert!(err.to_string().contains("100 iterations"));
        let err = MathError::insufficient_data(2, 1);
        assert_eq!(err.to_string(), "Insufficient data: need at least 2, got 1");
    }

    #[test]
    fn test_unsorted_pillars() {
        assert!(MathError::check_increasing(&[0.0, 1.0, 2.0]).is_ok());
        assert_eq!(
            MathError::check_increasing(&[0.0, 1.0, 1.0]),
            Err(MathError::UnsortedPillars {
                index: 2,
                previous: 1.0,
                value: 1.0
            })
        );
    }
}
