//! Instruments from identifiers.
//!
//! | Identifier | Instrument |
//! |------------|------------|
//! | `<CCY>-Deposit-<tenor>` (`ON` is one day) | [`Deposit`] from the base date |
//! | `<CCY>-Fra-<start>-<end>` | [`Fra`] between two tenors from the base date |
//! | `<CCY>-IRSwap-<tenor>` | [`Swap`] from the base date |
//! | `<CCY>-BasisSwap-<tenor>[-<index tenor>]` | [`BasisSwap`] against the reference curve |
//! | `<CCY>-SpreadDeposit-<tenor>` | [`SpreadDeposit`] over the reference curve |
//! | `<CCY>-SpreadFra-<start>-<end>` | [`SpreadFra`] over the reference curve |
//! | `<CCY>-SpreadSwap-<tenor>` | [`SpreadSwap`] over the reference curve |
//! | `<CCY>-XccySwap-<tenor>` | [`XccyBasisSwap`] projected on the reference curve |
//!
//! Conventions passed to [`InstrumentFactory::create_with`] override the
//! factory defaults, so an instrument recreated from its
//! [`conventions`](PriceableInstrument::conventions) prices like the original.

use std::fmt;
use std::sync::Arc;

use arbor_core::calendars::{BusinessDayConvention, Calendar};
use arbor_core::types::{Currency, Frequency, Period};
use arbor_core::Date;

use crate::error::{CurveError, CurveResult};
use crate::instruments::{
    BasisSwap, Deposit, Fra, InstrumentConventions, PriceableInstrument, SpreadDeposit, SpreadFra,
    SpreadSwap, Swap, XccyBasisSwap,
};
use crate::traits::Curve;

/// Turns an instrument identifier and quote into an instrument.
pub trait InstrumentFactory: Send + Sync {
    /// Creates the instrument `id` quoted at `quote`, starting on `base_date`,
    /// with the factory's default conventions.
    fn create(
        &self,
        id: &str,
        quote: f64,
        base_date: Date,
    ) -> CurveResult<Arc<dyn PriceableInstrument>> {
        self.create_with(id, quote, base_date, &InstrumentConventions::default(), None)
    }

    /// Creates the instrument `id` with explicit conventions, priced against
    /// `reference` when it is quoted over another curve.
    fn create_with(
        &self,
        id: &str,
        quote: f64,
        base_date: Date,
        conventions: &InstrumentConventions,
        reference: Option<&Arc<dyn Curve>>,
    ) -> CurveResult<Arc<dyn PriceableInstrument>>;
}

/// Factory for the rate instrument families.
///
/// End dates are rolled modified-following on the calendar when one is set.
#[derive(Clone)]
pub struct StandardInstrumentFactory {
    calendar: Option<Arc<dyn Calendar>>,
    swap_frequency: Frequency,
}

impl Default for StandardInstrumentFactory {
    fn default() -> Self {
        Self {
            calendar: None,
            swap_frequency: Frequency::SemiAnnual,
        }
    }
}

impl StandardInstrumentFactory {
    /// Creates a factory with unadjusted dates and semi-annual swaps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolls end dates on `calendar`.
    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Sets the fixed-leg frequency of swaps.
    #[must_use]
    pub fn with_swap_frequency(mut self, frequency: Frequency) -> Self {
        self.swap_frequency = frequency;
        self
    }

    fn date_after(&self, id: &str, base_date: Date, tenor: &str) -> CurveResult<Date> {
        let period = if tenor.eq_ignore_ascii_case("ON") {
            Period::days(1)
        } else {
            parse_period(id, tenor)?
        };
        let date = base_date.add_period(period)?;
        Ok(match &self.calendar {
            Some(calendar) => calendar.adjust(date, BusinessDayConvention::ModifiedFollowing),
            None => date,
        })
    }
}

fn parse_period(id: &str, tenor: &str) -> CurveResult<Period> {
    tenor
        .parse::<Period>()
        .map_err(|_| CurveError::invalid_instrument(format!("{id}: '{tenor}' is not a tenor")))
}

/// Payment frequency of a floating index with tenor `index`.
fn index_frequency(id: &str, index: &str) -> CurveResult<Frequency> {
    match parse_period(id, index)?.total_months() {
        Some(1) => Ok(Frequency::Monthly),
        Some(3) => Ok(Frequency::Quarterly),
        Some(6) => Ok(Frequency::SemiAnnual),
        Some(12) => Ok(Frequency::Annual),
        _ => Err(CurveError::invalid_instrument(format!(
            "{id}: no payment frequency for index tenor '{index}'"
        ))),
    }
}

impl fmt::Debug for StandardInstrumentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardInstrumentFactory")
            .field("calendar", &self.calendar.as_ref().map(|c| c.name().to_string()))
            .field("swap_frequency", &self.swap_frequency)
            .finish()
    }
}

impl InstrumentFactory for StandardInstrumentFactory {
    fn create_with(
        &self,
        id: &str,
        quote: f64,
        base_date: Date,
        conventions: &InstrumentConventions,
        reference: Option<&Arc<dyn Curve>>,
    ) -> CurveResult<Arc<dyn PriceableInstrument>> {
        let parts: Vec<&str> = id.split('-').collect();
        let unknown = || CurveError::invalid_instrument(format!("unrecognized instrument id '{id}'"));
        let (Some(ccy), Some(kind)) = (parts.first(), parts.get(1)) else {
            return Err(unknown());
        };
        ccy.parse::<Currency>().map_err(|_| unknown())?;

        let kind = kind.to_ascii_lowercase();
        let base = || {
            reference.cloned().ok_or_else(|| {
                CurveError::missing_dependency(id, "instrument is quoted against a reference curve")
            })
        };
        let swap_frequency = conventions.frequency.unwrap_or(self.swap_frequency);

        match (kind.as_str(), &parts[2..]) {
            ("deposit", [tenor]) => {
                let end = self.date_after(id, base_date, tenor)?;
                let mut deposit = Deposit::new(id, base_date, end, quote)?;
                if let Some(day_count) = conventions.day_count {
                    deposit = deposit.with_day_count(day_count);
                }
                Ok(Arc::new(deposit))
            }
            ("fra", [start, end]) => {
                let start = self.date_after(id, base_date, start)?;
                let end = self.date_after(id, base_date, end)?;
                let mut fra = Fra::new(id, start, end, quote)?;
                if let Some(day_count) = conventions.day_count {
                    fra = fra.with_day_count(day_count);
                }
                Ok(Arc::new(fra))
            }
            ("irswap", [tenor]) => {
                let maturity = self.date_after(id, base_date, tenor)?;
                let mut swap = Swap::new(id, base_date, maturity, quote, swap_frequency)?;
                if let Some(day_count) = conventions.day_count {
                    swap = swap.with_day_count(day_count);
                }
                Ok(Arc::new(swap))
            }
            ("basisswap", [tenor, index @ ..]) if index.len() <= 1 => {
                let maturity = self.date_after(id, base_date, tenor)?;
                let derived = match (conventions.frequency, index.first()) {
                    (Some(frequency), _) => frequency,
                    (None, Some(index)) => index_frequency(id, index)?,
                    (None, None) => Frequency::Quarterly,
                };
                let reference_frequency = conventions.base_frequency.unwrap_or(Frequency::Quarterly);
                let mut swap = BasisSwap::new(
                    id,
                    base_date,
                    maturity,
                    quote,
                    derived,
                    reference_frequency,
                    base()?,
                )?;
                if let Some(day_count) = conventions.day_count {
                    swap = swap.with_day_count(day_count);
                }
                Ok(Arc::new(swap))
            }
            ("spreaddeposit", [tenor]) => {
                let end = self.date_after(id, base_date, tenor)?;
                let mut deposit = SpreadDeposit::new(id, base_date, end, quote, base()?)?;
                if let Some(day_count) = conventions.day_count {
                    deposit = deposit.with_day_count(day_count);
                }
                Ok(Arc::new(deposit))
            }
            ("spreadfra", [start, end]) => {
                let start = self.date_after(id, base_date, start)?;
                let end = self.date_after(id, base_date, end)?;
                let mut fra = SpreadFra::new(id, start, end, quote, base()?)?;
                if let Some(day_count) = conventions.day_count {
                    fra = fra.with_day_count(day_count);
                }
                Ok(Arc::new(fra))
            }
            ("spreadswap", [tenor]) => {
                let maturity = self.date_after(id, base_date, tenor)?;
                let mut swap = SpreadSwap::new(id, base_date, maturity, quote, swap_frequency, base()?)?;
                if let Some(day_count) = conventions.day_count {
                    swap = swap.with_day_count(day_count);
                }
                Ok(Arc::new(swap))
            }
            ("xccyswap", [tenor]) => {
                let maturity = self.date_after(id, base_date, tenor)?;
                let frequency = conventions.frequency.unwrap_or(Frequency::Quarterly);
                let mut swap = XccyBasisSwap::new(id, base_date, maturity, quote, frequency, base()?)?;
                if let Some(day_count) = conventions.day_count {
                    swap = swap.with_day_count(day_count);
                }
                Ok(Arc::new(swap))
            }
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::test_support::FlatRateCurve;
    use crate::instruments::InstrumentKind;
    use arbor_core::calendars::WeekendCalendar;
    use arbor_core::daycounts::DayCountConvention;

    fn base() -> Date {
        Date::from_ymd(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_parses_each_family() {
        let factory = StandardInstrumentFactory::new();
        let dep = factory.create("USD-Deposit-3M", 0.05, base()).unwrap();
        assert_eq!(dep.kind(), InstrumentKind::Deposit);
        assert_eq!(dep.risk_maturity_date(), Date::from_ymd(2024, 4, 15).unwrap());
        assert_eq!(dep.id(), "USD-Deposit-3M");

        let on = factory.create("USD-Deposit-ON", 0.05, base()).unwrap();
        assert_eq!(on.risk_maturity_date(), Date::from_ymd(2024, 1, 16).unwrap());

        let fra = factory.create("USD-Fra-3M-6M", 0.051, base()).unwrap();
        assert_eq!(fra.kind(), InstrumentKind::Fra);
        assert_eq!(fra.risk_maturity_date(), Date::from_ymd(2024, 7, 15).unwrap());

        let swap = factory.create("USD-IRSwap-5Y", 0.04, base()).unwrap();
        assert_eq!(swap.kind(), InstrumentKind::Swap);
        assert_eq!(swap.market_quote(), 0.04);
    }

    #[test]
    fn test_calendar_rolls_end_date() {
        // 2024-06-15 is a Saturday
        let factory = StandardInstrumentFactory::new().with_calendar(Arc::new(WeekendCalendar));
        let dep = factory.create("EUR-Deposit-5M", 0.03, base()).unwrap();
        assert_eq!(dep.risk_maturity_date(), Date::from_ymd(2024, 6, 17).unwrap());
    }

    #[test]
    fn test_conventions_override_defaults() {
        let factory = StandardInstrumentFactory::new();
        let conventions = InstrumentConventions {
            frequency: Some(Frequency::Annual),
            day_count: Some(DayCountConvention::Act365Fixed),
            ..InstrumentConventions::default()
        };
        let swap = factory
            .create_with("EUR-IRSwap-3Y", 0.03, base(), &conventions, None)
            .unwrap();
        assert_eq!(swap.conventions(), conventions);
        assert_eq!(swap.cash_flow_dates().len(), 3);

        let default = factory.create("EUR-IRSwap-3Y", 0.03, base()).unwrap();
        assert_eq!(default.conventions().frequency, Some(Frequency::SemiAnnual));
        assert_eq!(default.cash_flow_dates().len(), 6);
    }

    #[test]
    fn test_reference_instruments() {
        let factory = StandardInstrumentFactory::new();
        let reference: Arc<dyn Curve> = Arc::new(FlatRateCurve { date: base(), rate: 0.03 });

        let basis = factory
            .create_with("AUD-BasisSwap-5Y-6M", 0.001, base(), &InstrumentConventions::default(), Some(&reference))
            .unwrap();
        assert_eq!(basis.kind(), InstrumentKind::BasisSwap);
        assert_eq!(basis.conventions().frequency, Some(Frequency::SemiAnnual));
        assert_eq!(basis.conventions().base_frequency, Some(Frequency::Quarterly));
        assert!(Arc::ptr_eq(basis.reference_curve().unwrap(), &reference));

        let cases = [
            ("USD-SpreadDeposit-3M", InstrumentKind::SpreadDeposit),
            ("USD-SpreadFra-3M-6M", InstrumentKind::SpreadFra),
            ("USD-SpreadSwap-2Y", InstrumentKind::SpreadSwap),
            ("EUR-XccySwap-1Y", InstrumentKind::XccyBasisSwap),
        ];
        for (id, kind) in cases {
            let inst = factory
                .create_with(id, 0.0005, base(), &InstrumentConventions::default(), Some(&reference))
                .unwrap();
            assert_eq!(inst.kind(), kind);
            assert_eq!(inst.market_quote(), 0.0005);
        }
    }

    #[test]
    fn test_reference_instruments_need_a_curve() {
        let factory = StandardInstrumentFactory::new();
        assert!(matches!(
            factory.create("USD-BasisSwap-2Y-3M", 0.001, base()),
            Err(CurveError::MissingDependency { .. })
        ));
        assert!(matches!(
            factory.create("EUR-XccySwap-1Y", 0.001, base()),
            Err(CurveError::MissingDependency { .. })
        ));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let factory = StandardInstrumentFactory::new();
        for id in ["USD-Bond-5Y", "XXX-Deposit-3M", "USD-Deposit", "USD-Fra-3M", "USD-BasisSwap-2Y-5W"] {
            assert!(matches!(
                factory.create(id, 0.01, base()),
                Err(CurveError::InvalidInstrument { .. })
            ));
        }
    }
}
