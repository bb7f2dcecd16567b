//! Cross-currency adjusted discount curve.

use std::fmt;
use std::sync::Arc;

use arbor_core::calendars::BusinessDayConvention;
use arbor_core::types::{Currency, Frequency, Period};
use arbor_core::Date;
use tracing::debug;

use super::spread::SpreadOverBase;
use super::{check_base, check_kinds, log_build, FxCurve, InstrumentCurve, RateCurve};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{InstrumentKind, PriceableInstrument, XccyBasisSwap};
use crate::interpolation::Algorithm;
use crate::properties::CurveProperties;
use crate::store::{resolve_rate_curve, CurveStore};
use crate::term_curve::{CurveMetadata, CurvePoint, CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Where an [`XccySpreadCurve`]'s spreads came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XccySource {
    /// Solved from cross-currency basis swaps.
    Swaps,
    /// Implied by FX forwards and the quote currency's discount curve.
    FxImplied,
    /// Solved from cross-currency basis swaps, with the short end filled by
    /// swaps quoted off the FX-implied discount curve.
    Combined,
}

/// Tenors, in months, of the short-end swaps added by
/// [`XccySpreadCurve::bootstrap_with_fx`].
const SHORT_END_MONTHS: [i32; 5] = [1, 2, 3, 6, 9];

/// The cross-currency adjusted discount curve of a currency.
///
/// Expressed as zero-rate spreads over the currency's own [`RateCurve`].
/// Either solved from [`XccyBasisSwap`](crate::instruments::XccyBasisSwap)s,
/// or implied by covered interest parity from an [`FxCurve`] and the quote
/// currency's discount curve:
///
/// ```text
/// DF(t) = DF_quote(t) × (F(t) / F(t_0))^p
/// s(t)  = -ln(DF(t) / DF_base(t)) / t
/// ```
///
/// with `t_0` the trade date and `p = -1` when the curve's currency is the
/// pair's quote currency. The two can also be combined: the FX-implied
/// curve prices short-dated swaps that are bootstrapped together with the
/// quoted ones.
#[derive(Clone)]
pub struct XccySpreadCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    inner: SpreadOverBase,
    instruments: Vec<Arc<dyn PriceableInstrument>>,
    source: XccySource,
}

impl XccySpreadCurve {
    /// Solves spreads over `base` from cross-currency basis swaps.
    pub fn bootstrap(
        properties: CurveProperties,
        base: Arc<RateCurve>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        check_kinds("XccySpreadCurve", &instruments, &[InstrumentKind::XccyBasisSwap])?;
        let identifier = properties.identifier()?;
        let (inner, instruments) = SpreadOverBase::bootstrap(&properties, base, instruments)?;
        let curve = Self {
            properties,
            identifier,
            inner,
            instruments,
            source: XccySource::Swaps,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// Bootstraps over the base curve named by the `ReferenceCurveUniqueId`
    /// property.
    pub fn bootstrap_from_store(
        properties: CurveProperties,
        store: &dyn CurveStore,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        let base = resolve_rate_curve(store, &properties)?;
        Self::bootstrap(properties, base, instruments)
    }

    /// Implies spreads over `base` from FX forwards.
    ///
    /// `fx` must quote the curve's currency against the currency of
    /// `quote_curve`, in either order. Spread pillars sit at the FX pillars
    /// after the base date.
    pub fn from_fx(
        properties: CurveProperties,
        base: Arc<RateCurve>,
        quote_curve: Arc<RateCurve>,
        fx: Arc<FxCurve>,
    ) -> CurveResult<Self> {
        let identifier = properties.identifier()?;
        let base_date = properties.require_base_date()?;
        let (currency, implied) = fx_implied_curve(&properties, &base, &quote_curve, &fx)?;

        let mut points = vec![CurvePoint::at_date(base_date, base_date, 0.0)];
        for pillar in implied.points().iter().filter(|p| p.time > 0.0) {
            let spread = -(pillar.value / base.discount_factor(pillar.time)?).ln() / pillar.time;
            debug!(t = pillar.time, implied_df = pillar.value, spread, "fx-implied spread");
            points.push(CurvePoint {
                value: spread,
                ..pillar.clone()
            });
        }

        let metadata = CurveMetadata {
            name: identifier.curve_name.clone(),
            currency: Some(currency),
            index: properties.index_name.clone(),
            algorithm: "Spread".to_string(),
        };
        let spread = TermCurve::from_points(
            base_date,
            CurveValueKind::Spread,
            Algorithm::spread(),
            points,
        )?
        .with_metadata(metadata);

        let curve = Self {
            properties,
            identifier,
            inner: SpreadOverBase { base, spread },
            instruments: Vec::new(),
            source: XccySource::FxImplied,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// Solves spreads over `base` from cross-currency basis swaps together
    /// with 1M, 2M, 3M, 6M and 9M swaps quoted at their par spread off the
    /// FX-implied discount curve.
    ///
    /// The short-end swaps are named `<CCY>-XccySwap-<tenor>`, pay
    /// quarterly, project on `base` and are dropped when they would mature
    /// on or after the first quoted swap.
    pub fn bootstrap_with_fx(
        properties: CurveProperties,
        base: Arc<RateCurve>,
        quote_curve: Arc<RateCurve>,
        fx: Arc<FxCurve>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        check_kinds("XccySpreadCurve", &instruments, &[InstrumentKind::XccyBasisSwap])?;
        let base_date = properties.require_base_date()?;
        let (currency, implied) = fx_implied_curve(&properties, &base, &quote_curve, &fx)?;

        let first_quoted = instruments.iter().map(|inst| inst.risk_maturity_date()).min();
        let projection: Arc<dyn Curve> = base.clone();
        let mut combined: Vec<Arc<dyn PriceableInstrument>> =
            Vec::with_capacity(instruments.len() + SHORT_END_MONTHS.len());
        for months in SHORT_END_MONTHS {
            let maturity = fx.calendar().adjust(
                base_date.add_period(Period::months(months))?,
                BusinessDayConvention::ModifiedFollowing,
            );
            if first_quoted.is_some_and(|first| maturity >= first) {
                continue;
            }
            let swap = XccyBasisSwap::new(
                format!("{currency}-XccySwap-{months}M"),
                base_date,
                maturity,
                0.0,
                Frequency::Quarterly,
                Arc::clone(&projection),
            )?;
            let spread = swap.par_spread(&implied)?;
            debug!(instrument = swap.id(), spread, "fx-implied short-end swap");
            combined.push(swap.with_quote(spread));
        }
        combined.extend(instruments);

        let identifier = properties.identifier()?;
        let (inner, instruments) = SpreadOverBase::bootstrap(&properties, base, combined)?;
        let curve = Self {
            properties,
            identifier,
            inner,
            instruments,
            source: XccySource::Combined,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// How the spreads were obtained.
    #[must_use]
    pub fn source(&self) -> XccySource {
        self.source
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

impl fmt::Debug for XccySpreadCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XccySpreadCurve")
            .field("id", &self.identifier)
            .field("source", &self.source)
            .field("spread", &self.inner.spread)
            .finish_non_exhaustive()
    }
}

impl Curve for XccySpreadCurve {
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

impl InstrumentCurve for XccySpreadCurve {
    fn properties(&self) -> &CurveProperties {
        &self.properties
    }

    fn identifier(&self) -> &CurveIdentifier {
        &self.identifier
    }

    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
        &self.instruments
    }

    /// FX-implied curves have no instruments; rebuilding one with an empty
    /// list returns a copy. A combined curve re-solves its short-end swaps at
    /// their current quotes.
    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        if self.source == XccySource::FxImplied && instruments.is_empty() {
            return Ok(self.clone());
        }
        let mut curve = Self::bootstrap(
            self.properties.clone(),
            Arc::clone(&self.inner.base),
            instruments,
        )?;
        if self.source == XccySource::Combined {
            curve.source = XccySource::Combined;
        }
        Ok(curve)
    }
}

/// The curve's currency and its FX-implied discount curve, after checking
/// `base`, `quote_curve` and `fx` against `properties`.
fn fx_implied_curve(
    properties: &CurveProperties,
    base: &RateCurve,
    quote_curve: &RateCurve,
    fx: &FxCurve,
) -> CurveResult<(Currency, TermCurve)> {
    SpreadOverBase::check(properties, base)?;
    let base_date = properties.require_base_date()?;
    let currency = properties
        .currency
        .or(base.properties().currency)
        .ok_or_else(|| CurveError::invalid_config("Currency", "missing"))?;

    let (c1, c2) = fx.currency_pair();
    let quote_currency = if c1 == currency {
        c2
    } else if c2 == currency {
        c1
    } else {
        return Err(CurveError::missing_dependency(
            fx.identifier().to_string(),
            format!("FX pair {c1}/{c2} does not involve {currency}"),
        ));
    };
    let mut quote_properties = properties.clone().with_currency(quote_currency);
    quote_properties.reference_curve_unique_id = None;
    check_base(
        &quote_properties,
        quote_curve.identifier(),
        quote_curve.term_curve(),
        quote_curve.properties().currency,
    )?;
    if fx.reference_date() != base_date {
        return Err(CurveError::missing_dependency(
            fx.identifier().to_string(),
            format!("trade date {} differs from {base_date}", fx.reference_date()),
        ));
    }
    Ok((currency, fx.implied_discount_curve(currency, quote_curve)?))
}
