//! The curve family.
//!
//! | Curve | Pillar values | Built from |
//! |-------|---------------|------------|
//! | [`RateCurve`] | discount factors | deposits, FRAs, swaps, or supplied pillars |
//! | [`RateBasisCurve`] | zero spreads over a [`RateCurve`] | tenor basis swaps |
//! | [`RateSpreadCurve`] | zero spreads over a [`RateCurve`] | spread deposits, FRAs, swaps |
//! | [`XccySpreadCurve`] | zero spreads over a [`RateCurve`] | cross-currency basis swaps, FX forwards, or both |
//! | [`FxCurve`] | outright forwards | spot and forward points |
//! | [`FxDerivedCurve`] | outright forwards | two [`FxCurve`]s sharing a currency |
//! | [`InflationCurve`] | index ratios | zero-coupon inflation swaps |
//! | [`CommodityCurve`] | forward prices | commodity forwards |
//!
//! Derived curves hold their base curves behind `Arc`; a base must be
//! finalized, and share the derived curve's base date (and currency where
//! one applies), or construction fails with
//! [`CurveError::MissingDependency`].

mod commodity;
mod fx;
mod fx_derived;
mod inflation;
mod rate;
mod spread;
mod xccy;

pub use commodity::CommodityCurve;
pub use fx::{fx_spot_date, fx_spot_lag, fx_value_date, FxCurve, FxQuote};
pub use fx_derived::FxDerivedCurve;
pub use inflation::InflationCurve;
pub use rate::RateCurve;
pub use spread::{RateBasisCurve, RateSpreadCurve};
pub use xccy::{XccySource, XccySpreadCurve};

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{InstrumentKind, PriceableInstrument};
use crate::interpolation::Algorithm;
use crate::properties::CurveProperties;
use crate::repricing::RepricingReport;
use crate::term_curve::{CurveMetadata, CurvePoint, CurveValueKind, TermCurve};
use crate::traits::Curve;

/// A curve built from instruments that can be rebuilt from re-quoted ones.
pub trait InstrumentCurve: Curve {
    /// The curve's configuration.
    fn properties(&self) -> &CurveProperties;

    /// The curve's unique identifier.
    fn identifier(&self) -> &CurveIdentifier;

    /// The instruments in pillar order.
    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>];

    /// A new curve built the same way from `instruments`.
    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self>
    where
        Self: Sized;

    /// Residuals of the instruments off this curve.
    fn repricing_report(&self) -> CurveResult<RepricingReport>
    where
        Self: Sized,
    {
        RepricingReport::build(self.instruments(), self, self.properties().tolerance)
    }
}

/// An unfinalized curve carrying the properties' metadata and step dates.
pub(crate) fn working_curve(
    properties: &CurveProperties,
    kind: CurveValueKind,
    algorithm: Algorithm,
) -> CurveResult<TermCurve> {
    let base_date = properties.require_base_date()?;
    let metadata = CurveMetadata {
        name: properties.curve_name()?,
        currency: properties.currency,
        index: properties.index_name.clone(),
        algorithm: properties.algorithm_name().to_string(),
    };
    TermCurve::new(base_date, kind)
        .with_algorithm(algorithm)?
        .with_metadata(metadata)
        .with_step_dates(properties.step_dates.clone())
}

/// A working curve with a pillar at the base date.
pub(crate) fn anchored_curve(
    properties: &CurveProperties,
    kind: CurveValueKind,
    algorithm: Algorithm,
    anchor: f64,
) -> CurveResult<TermCurve> {
    let mut curve = working_curve(properties, kind, algorithm)?;
    let base = curve.base_date();
    curve.add_point(CurvePoint::at_date(base, base, anchor))?;
    Ok(curve)
}

/// Rejects instruments a curve type cannot be built from.
pub(crate) fn check_kinds(
    curve: &str,
    instruments: &[Arc<dyn PriceableInstrument>],
    accepted: &[InstrumentKind],
) -> CurveResult<()> {
    match instruments.iter().find(|i| !accepted.contains(&i.kind())) {
        Some(inst) => Err(CurveError::invalid_instrument(format!(
            "{curve} cannot be built from {} ({})",
            inst.id(),
            inst.kind()
        ))),
        None => Ok(()),
    }
}

/// Logs the repricing outcome of a completed build.
pub(crate) fn log_build(id: &CurveIdentifier, report: &RepricingReport) {
    if report.all_passed() {
        info!(
            curve = %id,
            instruments = report.len(),
            max_residual = report.max_abs_residual(),
            "curve built"
        );
    } else {
        warn!(
            curve = %id,
            failed = report.failed().len(),
            max_residual = report.max_abs_residual(),
            "curve built with repricing failures"
        );
    }
}

/// Checks that a base curve can back a derived one.
pub(crate) fn check_base(
    derived: &CurveProperties,
    base_id: &CurveIdentifier,
    base: &TermCurve,
    base_currency: Option<arbor_core::types::Currency>,
) -> CurveResult<()> {
    let reference = base_id.to_string();
    if let Some(wanted) = derived.reference_curve()? {
        if &wanted != base_id {
            return Err(CurveError::missing_dependency(
                wanted.to_string(),
                format!("supplied base curve is {reference}"),
            ));
        }
    }
    if !base.is_finalized() {
        return Err(CurveError::missing_dependency(reference, "base curve is not finalized"));
    }
    let base_date = derived.require_base_date()?;
    if base.base_date() != base_date {
        return Err(CurveError::missing_dependency(
            reference,
            format!("base date {} differs from {base_date}", base.base_date()),
        ));
    }
    if let (Some(ours), Some(theirs)) = (derived.currency, base_currency) {
        if ours != theirs {
            return Err(CurveError::missing_dependency(
                reference,
                format!("currency {theirs} differs from {ours}"),
            ));
        }
    }
    Ok(())
}
