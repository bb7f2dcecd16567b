//! Derivative-free optimization.
//!
//! - [`nelder_mead_2d`]: simplex minimization of a two-parameter objective,
//!   used by smile calibration
//! - [`halton`]: low-discrepancy points for seeding multi-start searches

mod halton;
mod nelder_mead;

pub use halton::{halton, halton_2d};
pub use nelder_mead::{nelder_mead_2d, NelderMeadConfig, NelderMeadResult};
