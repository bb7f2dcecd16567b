//! Newton-Raphson pillar bootstrap.
//!
//! A bootstrap consumes a [`BootstrapWorkingSet`] (the instruments and the
//! curve to populate) and a [`BootstrapFrame`] that says how the working
//! curve is turned into something instruments can be priced off:
//!
//! - [`DirectFrame`]: the working curve is the pricing curve
//! - [`SpreadFrame`]: the working curve holds zero-rate spreads `s(t)` over
//!   a finalized base curve, `DF(t) = DF_base(t) × exp(-s(t) × t)`
//!
//! Pillars are solved one instrument at a time in maturity order; see
//! [`NewtonBootstrapper::bootstrap`].

mod frame;
mod newton;
mod working_set;

pub use frame::{spread_discount_factor, BootstrapFrame, DirectFrame, SpreadFrame, SpreadView};
pub use newton::{BootstrapOutput, NewtonBootstrapper};
pub use working_set::BootstrapWorkingSet;

use serde::{Deserialize, Serialize};

/// What to do with instruments that share a maturity date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DuplicatePolicy {
    /// Fail with an ordering error.
    #[default]
    Reject,
    /// Keep the instrument supplied last.
    LastQuoteWins,
}

impl DuplicatePolicy {
    /// The policy selected by the `OptimizeBuild` flag.
    #[must_use]
    pub fn from_optimize_build(optimize: bool) -> Self {
        if optimize {
            Self::LastQuoteWins
        } else {
            Self::Reject
        }
    }
}
