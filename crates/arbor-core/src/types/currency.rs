//! ISO 4217 currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// ISO 4217 currency codes used by the rate, FX and inflation curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Currency {
    /// United States Dollar
    #[default]
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
    /// New Zealand Dollar
    NZD,
    /// Swedish Krona
    SEK,
    /// Norwegian Krone
    NOK,
    /// Hong Kong Dollar
    HKD,
    /// Singapore Dollar
    SGD,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Currency; 12] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::CAD,
        Currency::AUD,
        Currency::NZD,
        Currency::SEK,
        Currency::NOK,
        Currency::HKD,
        Currency::SGD,
    ];

    /// Returns the ISO 4217 3-letter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::NZD => "NZD",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
        }
    }

    /// Conventional FX spot lag in business days against USD.
    #[must_use]
    pub fn spot_lag(&self) -> i32 {
        match self {
            Currency::CAD => 1,
            _ => 2,
        }
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or(CoreError::UnknownCurrency { code })
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for ccy in Currency::ALL {
            assert_eq!(ccy.code().parse::<Currency>().unwrap(), ccy);
        }
        assert_eq!("aud".parse::<Currency>().unwrap(), Currency::AUD);
        assert!("XXX".parse::<Currency>().is_err());
    }
}
