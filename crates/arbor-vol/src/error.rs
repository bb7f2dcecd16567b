//! Error types for volatility structures and SABR calibration.

use arbor_core::CoreError;
use arbor_math::MathError;
use thiserror::Error;

/// A specialized Result type for volatility operations.
pub type VolResult<T> = Result<T, VolError>;

/// Errors raised while building, querying or calibrating volatility structures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolError {
    /// Coordinate headers, value rows or point sets with inconsistent dimensions.
    #[error("Shape mismatch: {reason}")]
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Not enough points or strikes for the requested operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required.
        required: usize,
        /// Number available.
        actual: usize,
    },

    /// A model parameter or market input outside its domain.
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Accepted domain.
        reason: String,
    },

    /// A query that does not fit the structure.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// The SABR fit exhausted its iteration budget.
    #[error("SABR calibration did not converge after {iterations} iterations (error: {residual:.2e})")]
    NonConvergence {
        /// Simplex iterations used across all attempts.
        iterations: u32,
        /// Best objective value reached.
        residual: f64,
    },

    /// An engine queried before reaching the required state.
    #[error("Engine is {state}, expected {required}")]
    InvalidState {
        /// Current state.
        state: String,
        /// Required state.
        required: String,
    },

    /// Numerical failure in interpolation or root finding.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Failure in date or period handling.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl VolError {
    /// Creates a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}
