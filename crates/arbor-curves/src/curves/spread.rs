//! Curves quoted as zero-rate spreads over a base discount curve.
//!
//! ```text
//! DF(t) = DF_base(t) × exp(-s(t) × t)
//! ```
//!
//! `s` is anchored at zero on the base date, linear between spread pillars
//! and flat beyond the last one.

use std::fmt;
use std::sync::Arc;

use arbor_core::Date;

use super::{anchored_curve, check_base, check_kinds, log_build, InstrumentCurve, RateCurve};
use crate::bootstrap::{spread_discount_factor, BootstrapWorkingSet, NewtonBootstrapper, SpreadFrame};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{references, InstrumentKind, PriceableInstrument};
use crate::interpolation::Algorithm;
use crate::properties::CurveProperties;
use crate::store::{resolve_rate_curve, CurveStore};
use crate::term_curve::{CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Spread pillars together with the base curve they sit on.
#[derive(Clone)]
pub(crate) struct SpreadOverBase {
    pub(crate) base: Arc<RateCurve>,
    pub(crate) spread: TermCurve,
}

impl SpreadOverBase {
    pub(crate) fn bootstrap(
        properties: &CurveProperties,
        base: Arc<RateCurve>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<(Self, Vec<Arc<dyn PriceableInstrument>>)> {
        Self::check(properties, &base)?;
        if let Some(stray) = instruments.iter().find(|inst| !references(inst.as_ref(), &base)) {
            return Err(CurveError::missing_dependency(
                base.identifier().to_string(),
                format!("{} is quoted against a different base curve", stray.id()),
            ));
        }
        let working = anchored_curve(properties, CurveValueKind::Spread, Algorithm::spread(), 0.0)?;
        let base_curve: Arc<dyn Curve> = base.clone();
        let output = NewtonBootstrapper::from_properties(properties).bootstrap(
            BootstrapWorkingSet::new(working, instruments)?,
            &SpreadFrame::new(base_curve),
        )?;
        Ok((
            Self {
                base,
                spread: output.curve,
            },
            output.instruments,
        ))
    }

    pub(crate) fn check(properties: &CurveProperties, base: &RateCurve) -> CurveResult<()> {
        check_base(
            properties,
            base.identifier(),
            base.term_curve(),
            base.properties().currency,
        )
    }

    pub(crate) fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        spread_discount_factor(self.base.as_ref(), &self.spread, t)
    }
}

macro_rules! spread_curve {
    ($(#[$doc:meta])* $name:ident, [$($kind:ident),+]) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            properties: CurveProperties,
            identifier: CurveIdentifier,
            inner: SpreadOverBase,
            instruments: Vec<Arc<dyn PriceableInstrument>>,
        }

        impl $name {
            /// Bootstraps spreads over a finalized base curve.
            pub fn bootstrap(
                properties: CurveProperties,
                base: Arc<RateCurve>,
                instruments: Vec<Arc<dyn PriceableInstrument>>,
            ) -> CurveResult<Self> {
                check_kinds(stringify!($name), &instruments, &[$(InstrumentKind::$kind),+])?;
                let identifier = properties.identifier()?;
                let (inner, instruments) = SpreadOverBase::bootstrap(&properties, base, instruments)?;
                let curve = Self {
                    properties,
                    identifier,
                    inner,
                    instruments,
                };
                log_build(&curve.identifier, &curve.repricing_report()?);
                Ok(curve)
            }

            /// Bootstraps over the base curve named by the
            /// `ReferenceCurveUniqueId` property.
            pub fn bootstrap_from_store(
                properties: CurveProperties,
                store: &dyn CurveStore,
                instruments: Vec<Arc<dyn PriceableInstrument>>,
            ) -> CurveResult<Self> {
                let base = resolve_rate_curve(store, &properties)?;
                Self::bootstrap(properties, base, instruments)
            }

            /// The base curve.
            #[must_use]
            pub fn base(&self) -> &Arc<RateCurve> {
                &self.inner.base
            }

            /// The spread pillars.
            #[must_use]
            pub fn spread_curve(&self) -> &TermCurve {
                &self.inner.spread
            }

            /// Zero-rate spread at time `t`.
            pub fn spread(&self, t: f64) -> CurveResult<f64> {
                self.inner.spread.value(t)
            }

            /// Zero rate to `date` under the configured compounding frequency.
            pub fn zero_rate_at(&self, date: Date) -> CurveResult<f64> {
                self.zero_rate(self.year_fraction(date), self.properties.compounding_frequency)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.identifier)
                    .field("base", self.inner.base.identifier())
                    .field("spread", &self.inner.spread)
                    .finish_non_exhaustive()
            }
        }

        impl Curve for $name {
            fn reference_date(&self) -> Date {
                self.inner.spread.base_date()
            }

            fn value(&self, t: f64) -> CurveResult<f64> {
                self.inner.discount_factor(t)
            }

            fn discount_factor(&self, t: f64) -> CurveResult<f64> {
                self.inner.discount_factor(t)
            }
        }

        impl InstrumentCurve for $name {
            fn properties(&self) -> &CurveProperties {
                &self.properties
            }

            fn identifier(&self) -> &CurveIdentifier {
                &self.identifier
            }

            fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
                &self.instruments
            }

            fn rebuild_with(
                &self,
                instruments: Vec<Arc<dyn PriceableInstrument>>,
            ) -> CurveResult<Self> {
                Self::bootstrap(self.properties.clone(), Arc::clone(&self.inner.base), instruments)
            }
        }
    };
}

spread_curve!(
    /// Projection curve of a second index, solved from tenor basis swaps
    /// against a base [`RateCurve`].
    RateBasisCurve,
    [BasisSwap]
);

spread_curve!(
    /// Curve solved from deposits, FRAs and swaps quoted as spreads over a
    /// base [`RateCurve`]'s implied rates.
    RateSpreadCurve,
    [SpreadDeposit, SpreadFra, SpreadSwap]
);
