//! Instruments the bootstrapper calibrates to.
//!
//! Every instrument implements [`PriceableInstrument`]: it reports an
//! identifier, a risk/maturity date, its cash-flow dates and market quote,
//! can be re-quoted, and prices itself off a [`Curve`]. The bootstrapper
//! depends on nothing else.
//!
//! # Available Instruments
//!
//! | Instrument | Curve | Quote |
//! |------------|-------|-------|
//! | [`Deposit`], [`Fra`] | rate | simple rate |
//! | [`Swap`] | rate | fixed rate (single-curve float leg) |
//! | [`BasisSwap`] | rate basis | spread on the derived leg |
//! | [`SpreadDeposit`], [`SpreadFra`], [`SpreadSwap`] | rate spread | spread over the base rate |
//! | [`XccyBasisSwap`] | cross-currency spread | spread on the projected leg |
//! | [`FxForward`] | FX | forward points |
//! | [`ZeroCouponInflationSwap`] | inflation | fixed rate |
//! | [`CommodityForward`] | commodity | forward price |
//!
//! Instruments that depend on other curves hold them as `Arc<dyn Curve>`;
//! those curves must be finalized before the instrument is bootstrapped.

mod basis_swap;
mod commodity;
mod deposit;
mod fra;
mod fx_forward;
mod inflation;
mod spread;
mod swap;
mod xccy;

pub use basis_swap::BasisSwap;
pub use commodity::CommodityForward;
pub use deposit::Deposit;
pub use fra::Fra;
pub use fx_forward::FxForward;
pub use inflation::ZeroCouponInflationSwap;
pub use spread::{SpreadDeposit, SpreadFra, SpreadSwap};
pub use swap::Swap;
pub use xccy::XccyBasisSwap;

use std::fmt;
use std::sync::Arc;

use arbor_core::daycounts::DayCountConvention;
use arbor_core::types::Frequency;
use arbor_core::Date;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::traits::Curve;

/// Instrument type for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstrumentKind {
    /// Money market deposit.
    Deposit,
    /// Forward rate agreement.
    Fra,
    /// Fixed/float interest rate swap.
    Swap,
    /// Tenor basis swap.
    BasisSwap,
    /// Deposit quoted as a spread.
    SpreadDeposit,
    /// FRA quoted as a spread.
    SpreadFra,
    /// Swap quoted as a spread.
    SpreadSwap,
    /// Cross-currency basis swap.
    XccyBasisSwap,
    /// FX forward.
    FxForward,
    /// Zero-coupon inflation swap.
    ZeroCouponInflationSwap,
    /// Commodity forward or future.
    CommodityForward,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Conventions an instrument was built with beyond what its identifier
/// says; enough for an [`InstrumentFactory`](crate::factory::InstrumentFactory)
/// to recreate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentConventions {
    /// Fixed leg frequency of a swap, or the derived/projected leg of a
    /// basis swap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    /// Reference leg frequency of a tenor basis swap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_frequency: Option<Frequency>,
    /// Accrual day count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_count: Option<DayCountConvention>,
}

impl InstrumentConventions {
    /// True when nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Trait for instruments used in bootstrap.
///
/// `present_value` is zero when the curve reprices the instrument. A curve
/// has one pillar per instrument, placed at
/// [`risk_maturity_date`](PriceableInstrument::risk_maturity_date).
pub trait PriceableInstrument: Send + Sync {
    /// Unique identifier, e.g. `USD-Deposit-3M`.
    fn id(&self) -> &str;

    /// Instrument type.
    fn kind(&self) -> InstrumentKind;

    /// Date at which the instrument's pillar is placed.
    fn risk_maturity_date(&self) -> Date;

    /// Dates of the instrument's cash flows in order.
    fn cash_flow_dates(&self) -> Vec<Date>;

    /// The market quote.
    fn market_quote(&self) -> f64;

    /// A copy of the instrument with a different quote.
    fn with_quote(&self, quote: f64) -> Arc<dyn PriceableInstrument>;

    /// Present value per unit notional given a curve.
    fn present_value(&self, curve: &dyn Curve) -> CurveResult<f64>;

    /// The curve value at the maturity that zeroes the PV, when it can be
    /// written down without the curve's own pillar.
    ///
    /// Used for instruments that mature before the curve's first pillar.
    fn closed_form_value(&self, _curve: &dyn Curve) -> CurveResult<Option<f64>> {
        Ok(None)
    }

    /// Conventions needed to recreate the instrument from its identifier.
    fn conventions(&self) -> InstrumentConventions {
        InstrumentConventions::default()
    }

    /// The finalized curve the instrument prices against besides the one
    /// being built, for spread-quoted and basis instruments.
    fn reference_curve(&self) -> Option<&Arc<dyn Curve>> {
        None
    }
}

/// True when `instrument` references exactly the curve behind `base`.
pub(crate) fn references<C: Curve>(instrument: &dyn PriceableInstrument, base: &Arc<C>) -> bool {
    instrument.reference_curve().map_or(true, |curve| {
        Arc::as_ptr(curve).cast::<()>() == Arc::as_ptr(base).cast::<()>()
    })
}

/// Accrual end dates from `start` to `end` every `frequency`, stub at the end.
pub(crate) fn schedule(start: Date, end: Date, frequency: Frequency) -> CurveResult<Vec<Date>> {
    if end <= start {
        return Err(CurveError::invalid_instrument(format!(
            "end {end} is not after start {start}"
        )));
    }
    let months = frequency.months_per_period() as i32;
    let mut dates = Vec::new();
    if months > 0 {
        let mut k = 1;
        loop {
            let d = start.add_months(k * months)?;
            if d >= end {
                break;
            }
            dates.push(d);
            k += 1;
        }
    }
    dates.push(end);
    Ok(dates)
}

pub(crate) fn check_period(id: &str, start: Date, end: Date) -> CurveResult<()> {
    if end <= start {
        return Err(CurveError::invalid_instrument(format!(
            "{id}: end {end} is not after start {start}"
        )));
    }
    Ok(())
}

/// Σ τ_i DF(d_i) over a schedule starting at `start`.
pub(crate) fn annuity(
    curve: &dyn Curve,
    start: Date,
    dates: &[Date],
    day_count: DayCountConvention,
) -> CurveResult<f64> {
    let mut prev = start;
    let mut sum = 0.0;
    for d in dates {
        sum += day_count.year_fraction(prev, *d) * curve.discount_factor_at(*d)?;
        prev = *d;
    }
    Ok(sum)
}

/// `DF(start) - DF(end) * (1 + rate * tau)`.
pub(crate) fn money_market_pv(
    curve: &dyn Curve,
    start: Date,
    end: Date,
    rate: f64,
    tau: f64,
) -> CurveResult<f64> {
    Ok(curve.discount_factor_at(start)? - curve.discount_factor_at(end)? * (1.0 + rate * tau))
}

/// `DF(end) = DF(start) / (1 + rate * tau)`, when `DF(start)` is known.
pub(crate) fn money_market_closed_form(
    curve: &dyn Curve,
    start: Date,
    rate: f64,
    tau: f64,
) -> Option<f64> {
    let df_start = if start == curve.reference_date() {
        1.0
    } else {
        curve.discount_factor_at(start).ok()?
    };
    Some(df_start / (1.0 + rate * tau))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Flat continuously compounded curve.
    pub struct FlatRateCurve {
        pub date: Date,
        pub rate: f64,
    }

    impl Curve for FlatRateCurve {
        fn reference_date(&self) -> Date {
            self.date
        }

        fn value(&self, t: f64) -> CurveResult<f64> {
            self.discount_factor(t)
        }

        fn discount_factor(&self, t: f64) -> CurveResult<f64> {
            Ok((-self.rate * t).exp())
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }
}
