//! # Arbor Vol
//!
//! Volatility structures and smile calibration.
//!
//! | Type | Axes | Use |
//! |------|------|-----|
//! | [`VolatilityCube`](cube::VolatilityCube) | expiry × tenor × strike | swaption cubes, any rank 1-3 |
//! | [`VolatilitySurface`](surface::VolatilitySurface) | expiry × strike | caplet/option surfaces |
//! | [`SabrCalibrationEngine`](sabr::SabrCalibrationEngine) | strike | smile fit for one expiry/tenor |
//!
//! Cubes interpolate linearly on strike, then tenor, then expiry and hold the
//! boundary value flat beyond the outermost pillar of every axis. An axis on
//! which all points share one coordinate is treated as absent.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_core::types::Period;
//! use arbor_vol::prelude::*;
//!
//! let cube = VolatilityCube::from_matrix(
//!     &[Period::months(6), Period::years(1)],
//!     &[],
//!     &[0.02, 0.03],
//!     &[vec![0.22, 0.20], vec![0.21, 0.19]],
//! )
//! .unwrap();
//!
//! let coord = VolCoordinate::new().with_expiry(Period::years(1)).with_strike(0.03);
//! assert_eq!(cube.value(&coord).unwrap(), 0.19);
//! assert_eq!(cube.rank(), 2);
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
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

pub mod cube;
pub mod error;
pub mod point;
pub mod sabr;
pub mod surface;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cube::{VolAxis, VolatilityCube};
    pub use crate::error::{VolError, VolResult};
    pub use crate::point::{VolCoordinate, VolatilityPoint};
    pub use crate::sabr::{
        sabr_volatility, CalibrationKind, CalibrationState, InitialGuess, SabrCalibrationEngine,
        SabrCalibrationSettings, SabrGridNode, SabrParameters, SabrSmileInterpolator,
    };
    pub use crate::surface::VolatilitySurface;
}

pub use cube::VolatilityCube;
pub use error::{VolError, VolResult};
pub use surface::VolatilitySurface;
