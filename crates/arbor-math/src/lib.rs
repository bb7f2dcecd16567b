//! # Arbor Math
//!
//! Numerical building blocks for curve construction and smile calibration.
//!
//! - **Interpolation**: linear, log-linear, flat (step) and gap-step interpolators
//!   over strictly ordered point sets
//! - **Extrapolation**: flat and linear continuation beyond the boundary pillars
//! - **Solvers**: Newton-Raphson (analytic and bumped derivative) and Brent
//! - **Optimization**: two-dimensional Nelder-Mead and Halton low-discrepancy sequences
//!
//! ## Example
//!
//! ```rust
//! use arbor_math::interpolation::{Interpolator, LinearInterpolator};
//! use arbor_math::extrapolation::ExtrapolationMethod;
//!
//! let interp = LinearInterpolator::new(vec![1.0, 2.0], vec![0.02, 0.03]).unwrap();
//! assert!((interp.interpolate(1.5).unwrap() - 0.025).abs() < 1e-15);
//! assert_eq!(ExtrapolationMethod::Flat.value(&interp, 5.0).unwrap(), 0.03);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod extrapolation;
pub mod interpolation;
pub mod optimization;
pub mod solvers;

pub use error::{MathError, MathResult};
