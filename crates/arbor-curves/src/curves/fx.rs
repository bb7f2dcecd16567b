//! FX forward curve and FX value-date conventions.

use std::fmt;
use std::sync::Arc;

use arbor_core::calendars::{BusinessDayConvention, Calendar};
use arbor_core::types::{Currency, Tenor};
use arbor_core::Date;
use serde::{Deserialize, Serialize};

use super::{log_build, working_curve, InstrumentCurve};
use crate::bootstrap::{BootstrapWorkingSet, DirectFrame, NewtonBootstrapper};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::{FxForward, PriceableInstrument};
use crate::interpolation::{Algorithm, AlgorithmRegistry, InterpolationMethod, ValueSpace};
use crate::properties::CurveProperties;
use crate::term_curve::{CurveMetadata, CurvePoint, CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Spot lag of a currency pair in business days.
///
/// A configured lag wins. Otherwise a pair against USD uses the other
/// currency's lag, and any other pair the longer of the two.
#[must_use]
pub fn fx_spot_lag(currency1: Currency, currency2: Currency, configured: Option<i32>) -> i32 {
    if let Some(lag) = configured {
        return lag;
    }
    match (currency1, currency2) {
        (Currency::USD, other) | (other, Currency::USD) => other.spot_lag(),
        (a, b) => a.spot_lag().max(b.spot_lag()),
    }
}

/// Spot date: `trade` advanced by `lag` days that are business days on
/// `calendar` (normally the joint calendar of the pair).
#[must_use]
pub fn fx_spot_date(trade: Date, lag: i32, calendar: &dyn Calendar) -> Date {
    calendar.add_business_days(trade, lag)
}

/// Value date of a quoted tenor.
///
/// | Tenor | Value date |
/// |-------|------------|
/// | ON | trade date |
/// | TN | next business day after trade |
/// | SP | spot |
/// | SN | next business day after spot |
/// | term | spot + period, modified following |
pub fn fx_value_date(
    tenor: Tenor,
    trade: Date,
    spot: Date,
    calendar: &dyn Calendar,
) -> CurveResult<Date> {
    Ok(match tenor {
        Tenor::Overnight => trade,
        Tenor::TomNext => calendar.next_business_day(trade),
        Tenor::Spot => spot,
        Tenor::SpotNext => calendar.next_business_day(spot),
        Tenor::Term(period) => calendar.adjust(
            spot.add_period(period)?,
            BusinessDayConvention::ModifiedFollowing,
        ),
    })
}

/// Forward points quoted for a tenor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxQuote {
    /// Quoted tenor.
    pub tenor: Tenor,
    /// Forward points in price units.
    pub points: f64,
}

impl FxQuote {
    /// Creates a quote.
    #[must_use]
    pub fn new(tenor: Tenor, points: f64) -> Self {
        Self { tenor, points }
    }
}

/// Outright FX forwards against value date.
///
/// The curve is anchored at the spot date with the spot rate and quotes
/// `Currency2` per unit of `Currency1`. Forwards after spot are
/// `S + points`; ON and TN settle before spot and are rolled back from it:
///
/// ```text
/// F_TN = S - p_TN
/// F_ON = S - p_TN - p_ON
/// ```
#[derive(Clone)]
pub struct FxCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    pair: (Currency, Currency),
    spot_rate: f64,
    spot_date: Date,
    algorithm: Algorithm,
    calendar: Arc<dyn Calendar>,
    curve: TermCurve,
    instruments: Vec<Arc<dyn PriceableInstrument>>,
}

impl FxCurve {
    /// Bootstraps from a spot rate and forward-point quotes.
    pub fn bootstrap(
        properties: CurveProperties,
        spot_rate: f64,
        quotes: &[FxQuote],
        calendar: Arc<dyn Calendar>,
        registry: &AlgorithmRegistry,
    ) -> CurveResult<Self> {
        if !(spot_rate.is_finite() && spot_rate > 0.0) {
            return Err(CurveError::invalid_value(format!("FX spot {spot_rate} is not positive")));
        }
        let pair = properties.require_currency_pair()?;
        let trade = properties.require_base_date()?;
        let lag = fx_spot_lag(pair.0, pair.1, properties.spot_lag);
        let spot_date = fx_spot_date(trade, lag, calendar.as_ref());
        let instruments =
            forwards_from_quotes(pair, trade, spot_date, spot_rate, quotes, calendar.as_ref())?;
        let algorithm = registry.get(properties.algorithm_name())?;
        Self::build(properties, pair, spot_rate, spot_date, algorithm, calendar, instruments)
    }

    fn build(
        properties: CurveProperties,
        pair: (Currency, Currency),
        spot_rate: f64,
        spot_date: Date,
        algorithm: Algorithm,
        calendar: Arc<dyn Calendar>,
        instruments: Vec<Arc<dyn PriceableInstrument>>,
    ) -> CurveResult<Self> {
        let identifier = properties.identifier()?;
        let mut working = working_curve(&properties, CurveValueKind::Forward, algorithm)?;
        working.add_point(CurvePoint::at_date(working.base_date(), spot_date, spot_rate))?;

        let output = NewtonBootstrapper::from_properties(&properties)
            .bootstrap(BootstrapWorkingSet::new(working, instruments)?, &DirectFrame)?;

        let curve = Self {
            properties,
            identifier,
            pair,
            spot_rate,
            spot_date,
            algorithm,
            calendar,
            curve: output.curve,
            instruments: output.instruments,
        };
        log_build(&curve.identifier, &curve.repricing_report()?);
        Ok(curve)
    }

    /// `(Currency1, Currency2)`.
    #[must_use]
    pub fn currency_pair(&self) -> (Currency, Currency) {
        self.pair
    }

    /// The spot rate.
    #[must_use]
    pub fn spot_rate(&self) -> f64 {
        self.spot_rate
    }

    /// The spot date.
    #[must_use]
    pub fn spot_date(&self) -> Date {
        self.spot_date
    }

    /// The calendar used for value dates.
    #[must_use]
    pub fn calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }

    /// The outright pillars.
    #[must_use]
    pub fn term_curve(&self) -> &TermCurve {
        &self.curve
    }

    /// Outright forward for `date`.
    pub fn forward(&self, date: Date) -> CurveResult<f64> {
        self.curve.value_at(date)
    }

    /// Forward points for `date` relative to spot.
    pub fn forward_points(&self, date: Date) -> CurveResult<f64> {
        Ok(self.forward(date)? - self.spot_rate)
    }

    /// Outright forward for a quoted tenor.
    pub fn forward_for_tenor(&self, tenor: Tenor) -> CurveResult<f64> {
        let date = fx_value_date(
            tenor,
            self.curve.base_date(),
            self.spot_date,
            self.calendar.as_ref(),
        )?;
        self.forward(date)
    }

    /// Discount curve of `Currency1` implied by covered interest parity
    /// from the `Currency2` discount curve.
    ///
    /// See [`implied_discount_curve`](Self::implied_discount_curve).
    pub fn basis_adjusted_discount_curve(&self, quote_curve: &dyn Curve) -> CurveResult<TermCurve> {
        self.implied_discount_curve(self.pair.0, quote_curve)
    }

    /// Discount curve of either currency of the pair implied by covered
    /// interest parity from the other currency's discount curve, at every
    /// pillar after the trade date:
    ///
    /// ```text
    /// DF(t) = DF_other(t) × (F(t) / F(t_0))^p
    /// ```
    ///
    /// `t_0` is the trade date, `p = 1` for `Currency1` and `-1` for
    /// `Currency2`.
    pub fn implied_discount_curve(
        &self,
        currency: Currency,
        other_curve: &dyn Curve,
    ) -> CurveResult<TermCurve> {
        let (power, other) = if currency == self.pair.0 {
            (1, self.pair.1)
        } else if currency == self.pair.1 {
            (-1, self.pair.0)
        } else {
            return Err(CurveError::missing_dependency(
                self.identifier.to_string(),
                format!("FX pair {}/{} does not involve {currency}", self.pair.0, self.pair.1),
            ));
        };
        let base = self.curve.base_date();
        if other_curve.reference_date() != base {
            return Err(CurveError::missing_dependency(
                format!("{other} discount curve"),
                format!(
                    "reference date {} differs from trade date {base}",
                    other_curve.reference_date()
                ),
            ));
        }
        let anchor = self.forward(base)?;
        let mut points = vec![CurvePoint::at_date(base, base, 1.0)];
        for pillar in self.curve.points().iter().filter(|p| p.time > 0.0) {
            points.push(CurvePoint {
                value: other_curve.discount_factor(pillar.time)? * (pillar.value / anchor).powi(power),
                ..pillar.clone()
            });
        }
        let metadata = CurveMetadata {
            name: format!("{}-{}-FxImplied", self.pair.0, self.pair.1),
            currency: Some(currency),
            index: None,
            algorithm: "LogLinearDiscount".to_string(),
        };
        Ok(TermCurve::from_points(
            base,
            CurveValueKind::DiscountFactor,
            Algorithm::new(InterpolationMethod::LogLinear, ValueSpace::Native),
            points,
        )?
        .with_metadata(metadata))
    }
}

/// The quotes behind forwards built by [`forwards_from_quotes`], with their
/// current market quotes.
fn quotes_from_forwards(instruments: &[Arc<dyn PriceableInstrument>]) -> CurveResult<Vec<FxQuote>> {
    instruments
        .iter()
        .map(|inst| {
            let tenor = inst
                .id()
                .rsplit_once("-FxForward-")
                .and_then(|(_, tenor)| tenor.parse::<Tenor>().ok())
                .ok_or_else(|| {
                    CurveError::invalid_instrument(format!(
                        "{}: not an FX forward of a quoted tenor",
                        inst.id()
                    ))
                })?;
            Ok(FxQuote::new(tenor, inst.market_quote()))
        })
        .collect()
}

/// One [`FxForward`] per quote.
fn forwards_from_quotes(
    pair: (Currency, Currency),
    trade: Date,
    spot_date: Date,
    spot_rate: f64,
    quotes: &[FxQuote],
    calendar: &dyn Calendar,
) -> CurveResult<Vec<Arc<dyn PriceableInstrument>>> {
    let tn_points = quotes
        .iter()
        .find(|q| q.tenor == Tenor::TomNext)
        .map(|q| q.points);

    let mut forwards: Vec<Arc<dyn PriceableInstrument>> = Vec::with_capacity(quotes.len());
    for quote in quotes {
        let id = format!("{}{}-FxForward-{}", pair.0, pair.1, quote.tenor);
        let value_date = fx_value_date(quote.tenor, trade, spot_date, calendar)?;
        if quote.tenor.is_pre_spot() && value_date >= spot_date {
            return Err(CurveError::invalid_instrument(format!(
                "{id}: value date {value_date} is not before spot {spot_date}"
            )));
        }
        let forward = match quote.tenor {
            Tenor::Spot => {
                return Err(CurveError::invalid_instrument(format!(
                    "{id}: spot is the curve anchor, not a forward"
                )));
            }
            Tenor::Overnight => {
                let tn = tn_points.ok_or_else(|| {
                    CurveError::invalid_instrument(format!("{id}: ON needs a TN quote"))
                })?;
                FxForward::pre_spot(id, value_date, spot_rate - tn - quote.points, quote.points)
            }
            Tenor::TomNext => {
                FxForward::pre_spot(id, value_date, spot_rate - quote.points, quote.points)
            }
            Tenor::SpotNext | Tenor::Term(_) => {
                FxForward::new(id, value_date, spot_rate, quote.points)
            }
        };
        forwards.push(Arc::new(forward));
    }
    Ok(forwards)
}

impl fmt::Debug for FxCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxCurve")
            .field("id", &self.identifier)
            .field("spot_rate", &self.spot_rate)
            .field("spot_date", &self.spot_date)
            .field("calendar", &self.calendar.name())
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

impl Curve for FxCurve {
    fn reference_date(&self) -> Date {
        self.curve.base_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.curve.value(t)
    }

    fn discount_factor(&self, _t: f64) -> CurveResult<f64> {
        Err(CurveError::invalid_value("an FX curve has no discount factors"))
    }
}

impl InstrumentCurve for FxCurve {
    fn properties(&self) -> &CurveProperties {
        &self.properties
    }

    fn identifier(&self) -> &CurveIdentifier {
        &self.identifier
    }

    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
        &self.instruments
    }

    /// Outrights are re-derived from the instruments' current points, so a
    /// re-quoted TN also moves the ON outright.
    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        let instruments = forwards_from_quotes(
            self.pair,
            self.curve.base_date(),
            self.spot_date,
            self.spot_rate,
            &quotes_from_forwards(&instruments)?,
            self.calendar.as_ref(),
        )?;
        Self::build(
            self.properties.clone(),
            self.pair,
            self.spot_rate,
            self.spot_date,
            self.algorithm,
            Arc::clone(&self.calendar),
            instruments,
        )
    }
}
