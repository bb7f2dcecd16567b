//! Root-finding algorithms.
//!
//! - [`newton_raphson`]: quadratic convergence when the derivative is known
//! - [`newton_bumped`]: Newton-Raphson with a one-sided bumped derivative over
//!   a fallible, stateful objective (the bootstrapper's pricing function)
//! - [`brent`]: bracketing method, guaranteed to converge on a sign change
//!
//! All solvers are bounded by [`SolverConfig::max_iterations`] and fail with
//! [`MathError::ConvergenceFailed`](crate::MathError::ConvergenceFailed) when
//! the cap is reached; no best-effort root is returned.

mod brent;
mod newton;

pub use brent::brent;
pub use newton::{newton_bumped, newton_raphson, BumpedNewton};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance on the absolute residual.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a successful root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Iterations used.
    pub iterations: u32,
    /// Function value at the root.
    pub residual: f64,
}
