//! Error types for curve construction and lookup.

use arbor_core::CoreError;
use arbor_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// The pillar solver hit its iteration cap or a flat/non-finite objective.
    #[error("Bootstrap did not converge for {instrument} after {iterations} iterations (residual: {residual:.2e})")]
    NonConvergence {
        /// Identifier of the instrument being solved.
        instrument: String,
        /// Iterations performed.
        iterations: u32,
        /// Last absolute residual.
        residual: f64,
    },

    /// Duplicate or overlapping pillars that the build policy cannot resolve.
    #[error("Ordering error: {reason}")]
    Ordering {
        /// Description of the conflict.
        reason: String,
    },

    /// A referenced curve is absent, not finalized or inconsistent.
    #[error("Missing dependency {reference}: {reason}")]
    MissingDependency {
        /// The referenced curve.
        reference: String,
        /// Why it cannot be used.
        reason: String,
    },

    /// Raw arrays with inconsistent dimensions.
    #[error("Shape mismatch: {reason}")]
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Not enough pillars to interpolate.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Points available.
        actual: usize,
    },

    /// Invalid instrument definition.
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// Description of what's wrong with the instrument.
        reason: String,
    },

    /// Invalid value (NaN, Inf, or domain error).
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of why value is invalid.
        reason: String,
    },

    /// Invalid or incomplete configuration.
    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig {
        /// Property key.
        key: String,
        /// Description of the problem.
        reason: String,
    },

    /// The curve has been finalized and can no longer be modified.
    #[error("Curve {name} is finalized")]
    Finalized {
        /// Curve name.
        name: String,
    },

    /// Curve not found in a store.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Identifier of the missing curve.
        name: String,
    },

    /// Document (de)serialization failed.
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// Numerical error from the math layer.
    #[error("Math error: {0}")]
    Math(MathError),

    /// Date, period or convention error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CurveError {
    /// Creates a non-convergence error.
    #[must_use]
    pub fn non_convergence(instrument: impl Into<String>, iterations: u32, residual: f64) -> Self {
        Self::NonConvergence {
            instrument: instrument.into(),
            iterations,
            residual,
        }
    }

    /// Creates an ordering error.
    #[must_use]
    pub fn ordering(reason: impl Into<String>) -> Self {
        Self::Ordering {
            reason: reason.into(),
        }
    }

    /// Creates a missing dependency error.
    #[must_use]
    pub fn missing_dependency(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingDependency {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Creates a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Creates an invalid instrument error.
    #[must_use]
    pub fn invalid_instrument(reason: impl Into<String>) -> Self {
        Self::InvalidInstrument {
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }
}

impl From<MathError> for CurveError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData { required, actual } => {
                Self::InsufficientData { required, actual }
            }
            other => Self::Math(other),
        }
    }
}

impl From<serde_json::Error> for CurveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CurveError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_convergence_display() {
        let err = CurveError::non_convergence("USD-IRSwap-10Y", 100, 1e-6);
        let msg = err.to_string();
        assert!(msg.contains("USD-IRSwap-10Y"));
        assert!(msg.contains("100 iterations"));
    }

    #[test]
    fn test_math_insufficient_data_maps_through() {
        let err: CurveError = MathError::insufficient_data(2, 1).into();
        assert_eq!(
            err,
            CurveError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
        let err: CurveError = MathError::invalid_input("bad").into();
        assert!(matches!(err, CurveError::Math(_)));
    }
}
