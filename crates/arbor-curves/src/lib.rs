//! # Arbor Curves
//!
//! Curve bootstrapping for rates, spreads, FX, inflation and commodities.
//!
//! - **Curve primitive**: [`TermCurve`](term_curve::TermCurve), ordered pillars with a
//!   named interpolation [`Algorithm`](interpolation::Algorithm)
//! - **Instruments**: deposits, FRAs, swaps, basis and cross-currency swaps, spread
//!   instruments, FX forwards, inflation swaps and commodity forwards behind
//!   [`PriceableInstrument`](instruments::PriceableInstrument)
//! - **Bootstrap**: sequential Newton-Raphson over a
//!   [`BootstrapWorkingSet`](bootstrap::BootstrapWorkingSet), directly or as spreads over
//!   a base curve
//! - **Curve family**: [`RateCurve`](curves::RateCurve) and the curves derived from it,
//!   [`FxCurve`](curves::FxCurve), [`InflationCurve`](curves::InflationCurve) and
//!   [`CommodityCurve`](curves::CommodityCurve), unified by
//!   [`PricingStructure`](structure::PricingStructure)
//! - **Configuration**: [`CurveProperties`](properties::CurveProperties) from TOML or a
//!   string property bag
//! - **Documents and storage**: JSON [`CurveDocument`](document::CurveDocument)s and a
//!   [`CurveStore`](store::CurveStore) keyed by
//!   [`CurveIdentifier`](identifier::CurveIdentifier)
//! - **Risk**: [`CurveRiskSet`](risk::CurveRiskSet), one rebuilt curve per bumped quote
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arbor_core::prelude::*;
//! use arbor_curves::prelude::*;
//!
//! let base = Date::from_ymd(2024, 1, 15).unwrap();
//! let props = CurveProperties::new(PricingStructureType::RateCurve, base)
//!     .with_currency(Currency::USD)
//!     .with_index("LIBOR", Some(Period::months(3)));
//!
//! let factory = StandardInstrumentFactory::new();
//! let instruments = [("USD-Deposit-3M", 0.052), ("USD-Fra-3M-6M", 0.051), ("USD-IRSwap-2Y", 0.048)]
//!     .iter()
//!     .map(|(id, quote)| factory.create(id, *quote, base))
//!     .collect::<CurveResult<Vec<_>>>()
//!     .unwrap();
//!
//! let curve = RateCurve::bootstrap(props, instruments, &AlgorithmRegistry::standard()).unwrap();
//! let df = curve.discount_factor(1.0).unwrap();
//! let zero = curve.zero_rate(1.0, Compounding::Continuous).unwrap();
//! assert!((df - (-zero).exp()).abs() < 1e-12);
//! assert!(curve.repricing_report().unwrap().all_passed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

pub mod bootstrap;
pub mod curves;
pub mod document;
pub mod error;
pub mod factory;
pub mod identifier;
pub mod instruments;
pub mod interpolation;
pub mod properties;
pub mod repricing;
pub mod risk;
pub mod store;
pub mod structure;
pub mod term_curve;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{
        BootstrapFrame, BootstrapWorkingSet, DirectFrame, DuplicatePolicy, NewtonBootstrapper,
        SpreadFrame,
    };
    pub use crate::curves::{
        CommodityCurve, FxCurve, FxDerivedCurve, FxQuote, InflationCurve, InstrumentCurve,
        RateBasisCurve, RateCurve, RateSpreadCurve, XccySource, XccySpreadCurve,
    };
    pub use crate::document::{CurveDocument, QuotedInput, TermPoint};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::factory::{InstrumentFactory, StandardInstrumentFactory};
    pub use crate::identifier::CurveIdentifier;
    pub use crate::instruments::{
        BasisSwap, CommodityForward, Deposit, Fra, FxForward, InstrumentConventions,
        InstrumentKind, PriceableInstrument, SpreadDeposit, SpreadFra, SpreadSwap, Swap, XccyBasisSwap,
        ZeroCouponInflationSwap,
    };
    pub use crate::interpolation::{
        Algorithm, AlgorithmRegistry, ExtrapolationMethod, InterpolationMethod, ValueSpace,
    };
    pub use crate::properties::{CurveProperties, PricingStructureType};
    pub use crate::repricing::{RepricingCheck, RepricingReport};
    pub use crate::risk::{CurveRiskSet, CurveScenario};
    pub use crate::store::{resolve_rate_curve, CurveStore, InMemoryCurveStore};
    pub use crate::structure::PricingStructure;
    pub use crate::term_curve::{CurvePoint, CurveValueKind, TermCurve};
    pub use crate::traits::Curve;
}

pub use curves::{InstrumentCurve, RateCurve};
pub use error::{CurveError, CurveResult};
pub use structure::PricingStructure;
pub use traits::Curve;
