//! Cross FX curve from two FX curves sharing a currency.

use std::fmt;
use std::sync::Arc;

use arbor_core::types::Currency;
use arbor_core::Date;

use super::{FxCurve, InstrumentCurve};
use crate::error::{CurveError, CurveResult};
use crate::identifier::CurveIdentifier;
use crate::instruments::PriceableInstrument;
use crate::interpolation::{Algorithm, InterpolationMethod, ValueSpace};
use crate::properties::CurveProperties;
use crate::term_curve::{CurveMetadata, CurvePoint, CurveValueKind, TermCurve};
use crate::traits::Curve;

/// Cross-rate forwards `X/Y` from `X/Z` and `Z/Y` (in any quoting order).
///
/// ```text
/// F_XY(t) = (Z per X)(t) × (Y per Z)(t)
/// ```
///
/// Each leg is used directly or inverted depending on how it is quoted.
/// Values are computed on demand from the two legs.
#[derive(Clone)]
pub struct FxDerivedCurve {
    properties: CurveProperties,
    identifier: CurveIdentifier,
    pair: (Currency, Currency),
    shared: Currency,
    first: Arc<FxCurve>,
    second: Arc<FxCurve>,
}

impl FxDerivedCurve {
    /// Composes two FX curves.
    ///
    /// The target pair is `Currency1`/`Currency2` from the properties when
    /// both are set, otherwise the two non-shared currencies in leg order.
    pub fn new(
        properties: CurveProperties,
        first: Arc<FxCurve>,
        second: Arc<FxCurve>,
    ) -> CurveResult<Self> {
        let (a1, a2) = first.currency_pair();
        let (b1, b2) = second.currency_pair();
        let shared = [a1, a2]
            .into_iter()
            .find(|c| *c == b1 || *c == b2)
            .ok_or_else(|| {
                CurveError::missing_dependency(
                    second.identifier().to_string(),
                    format!("{b1}/{b2} shares no currency with {a1}/{a2}"),
                )
            })?;
        let x = if a1 == shared { a2 } else { a1 };
        let y = if b1 == shared { b2 } else { b1 };
        if x == y {
            return Err(CurveError::invalid_config(
                "Currency2",
                format!("{a1}/{a2} and {b1}/{b2} are the same pair"),
            ));
        }
        if first.reference_date() != second.reference_date() {
            return Err(CurveError::missing_dependency(
                second.identifier().to_string(),
                format!(
                    "trade date {} differs from {}",
                    second.reference_date(),
                    first.reference_date()
                ),
            ));
        }

        let pair = match (properties.currency1, properties.currency2) {
            (Some(c1), Some(c2)) if (c1, c2) == (x, y) || (c1, c2) == (y, x) => (c1, c2),
            (Some(c1), Some(c2)) => {
                return Err(CurveError::invalid_config(
                    "Currency1",
                    format!("{c1}/{c2} cannot be crossed from {a1}/{a2} and {b1}/{b2}"),
                ));
            }
            _ => (x, y),
        };
        let mut properties = properties;
        properties.currency1 = Some(pair.0);
        properties.currency2 = Some(pair.1);
        if properties.base_date.is_none() {
            properties.base_date = Some(first.reference_date());
        }
        let identifier = properties.identifier()?;

        Ok(Self {
            properties,
            identifier,
            pair,
            shared,
            first,
            second,
        })
    }

    /// `(Currency1, Currency2)` of the cross.
    #[must_use]
    pub fn currency_pair(&self) -> (Currency, Currency) {
        self.pair
    }

    /// The currency the two legs share.
    #[must_use]
    pub fn shared_currency(&self) -> Currency {
        self.shared
    }

    /// The two legs.
    #[must_use]
    pub fn legs(&self) -> (&Arc<FxCurve>, &Arc<FxCurve>) {
        (&self.first, &self.second)
    }

    /// Cross spot rate.
    #[must_use]
    pub fn spot_rate(&self) -> f64 {
        self.cross(|leg| Ok(leg.spot_rate())).unwrap_or(f64::NAN)
    }

    /// Cross outright forward for `date`.
    pub fn forward(&self, date: Date) -> CurveResult<f64> {
        self.value(self.year_fraction(date))
    }

    /// The cross at every pillar time of either leg, as a finalized curve.
    pub fn to_term_curve(&self) -> CurveResult<TermCurve> {
        let base = self.reference_date();
        let mut pillars: Vec<CurvePoint> = self
            .first
            .term_curve()
            .points()
            .iter()
            .chain(self.second.term_curve().points())
            .cloned()
            .collect();
        pillars.sort_by(|a, b| a.time.total_cmp(&b.time));
        pillars.dedup_by(|a, b| a.time == b.time);

        let mut points = Vec::with_capacity(pillars.len());
        for pillar in pillars {
            points.push(CurvePoint {
                value: self.value(pillar.time)?,
                instrument_id: None,
                ..pillar
            });
        }
        let metadata = CurveMetadata {
            name: self.identifier.curve_name.clone(),
            currency: Some(self.pair.0),
            index: None,
            algorithm: "LinearForward".to_string(),
        };
        Ok(TermCurve::from_points(
            base,
            CurveValueKind::Forward,
            Algorithm::new(InterpolationMethod::Linear, ValueSpace::Native),
            points,
        )?
        .with_metadata(metadata))
    }

    /// Value of one `from` in the other currency of `leg`.
    fn per(leg: &FxCurve, from: Currency, value: f64) -> f64 {
        if leg.currency_pair().0 == from {
            value
        } else {
            1.0 / value
        }
    }

    fn leg_with(&self, currency: Currency) -> &FxCurve {
        let (a1, a2) = self.first.currency_pair();
        if a1 == currency || a2 == currency {
            &self.first
        } else {
            &self.second
        }
    }

    /// Combines a per-leg quantity into the cross.
    fn cross(&self, quantity: impl Fn(&FxCurve) -> CurveResult<f64>) -> CurveResult<f64> {
        let (c1, c2) = self.pair;
        // c1 -> shared, then shared -> c2
        let leg1 = self.leg_with(c1);
        let leg2 = self.leg_with(c2);
        let c1_in_shared = Self::per(leg1, c1, quantity(leg1)?);
        let shared_in_c2 = Self::per(leg2, self.shared, quantity(leg2)?);
        Ok(c1_in_shared * shared_in_c2)
    }
}

impl fmt::Debug for FxDerivedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxDerivedCurve")
            .field("id", &self.identifier)
            .field("shared", &self.shared)
            .field("first", self.first.identifier())
            .field("second", self.second.identifier())
            .finish()
    }
}

impl Curve for FxDerivedCurve {
    fn reference_date(&self) -> Date {
        self.first.reference_date()
    }

    fn value(&self, t: f64) -> CurveResult<f64> {
        self.cross(|leg| leg.value(t))
    }

    fn discount_factor(&self, _t: f64) -> CurveResult<f64> {
        Err(CurveError::invalid_value("an FX curve has no discount factors"))
    }
}

/// Derived curves carry no instruments of their own; rebuilding returns a
/// copy over the same legs.
impl InstrumentCurve for FxDerivedCurve {
    fn properties(&self) -> &CurveProperties {
        &self.properties
    }

    fn identifier(&self) -> &CurveIdentifier {
        &self.identifier
    }

    fn instruments(&self) -> &[Arc<dyn PriceableInstrument>] {
        &[]
    }

    fn rebuild_with(&self, instruments: Vec<Arc<dyn PriceableInstrument>>) -> CurveResult<Self> {
        match instruments.first() {
            None => Ok(self.clone()),
            Some(inst) => Err(CurveError::invalid_instrument(format!(
                "{} cannot be rebuilt from {}; rebuild its legs",
                self.identifier,
                inst.id()
            ))),
        }
    }
}
